//! Read, configure and dump DL-210TH temperature/humidity data loggers.
//!
//! # Crate Structure
//!
//! - [`transport`]: device channel abstraction (hidraw, scripted replay)
//! - [`frame`]: command/response framing over a 64-byte HID report
//! - [`schema`]: fixed-layout record schemas and the device record types
//! - [`device`]: typed command layer and the measurement dump
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dl210::device::LoggerHandle;
//! use dl210::transport::HidrawDevice;
//!
//! let mut logger = LoggerHandle::open(HidrawDevice::open("/dev/hidraw0")?)?;
//! let dump = logger.dump_measurements()?;
//! for (at, m) in dump.timestamped()? {
//!     println!("{at} {:.2} {:.2}", m.temperature_celsius(), m.humidity_percent());
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use dl210_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use dl210_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use dl210_schema::*;
}

/// Re-export device types.
pub mod device {
    pub use dl210_device::*;
}

//! Byte channel abstraction for DL-210TH data loggers.
//!
//! The logger is a single-function USB HID device. Everything above this
//! layer talks to it through the [`DeviceChannel`] trait:
//! - [`HidrawDevice`] wraps a Linux `/dev/hidrawN` node (Unix only)
//! - [`ReplayChannel`] plays back scripted responses, for tests and captures
//!
//! Opening and enumerating devices beyond a plain node path is left to the
//! caller.

pub mod error;
#[cfg(unix)]
pub mod hidraw;
pub mod replay;
pub mod traits;

pub use error::{Result, TransportError};
#[cfg(unix)]
pub use hidraw::HidrawDevice;
pub use replay::ReplayChannel;
pub use traits::DeviceChannel;

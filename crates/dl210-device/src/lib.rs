//! Typed command layer and measurement dump for DL-210TH data loggers.
//!
//! Open a [`LoggerHandle`] over any [`DeviceChannel`](dl210_transport::DeviceChannel),
//! then call its typed operations. Every response is shape-checked before it
//! is decoded, and [`LoggerHandle::dump_measurements`] reassembles the stored
//! data into one ordered, gap-free sequence.

pub mod block;
pub mod config;
pub mod dump;
pub mod error;
pub mod logger;
pub mod retry;
pub mod shape;

pub use block::DataBlock;
pub use config::{DumpConfig, LoggerOptions, BLOCK_SIZE, DEFAULT_DUMP_ATTEMPTS, DEVICE_TYPE};
pub use dump::{classify_frame, fold_blocks, MeasurementDump, StreamFrame, STREAM_DONE};
pub use error::{DeviceError, Result};
pub use logger::LoggerHandle;
pub use retry::retry_bounded;

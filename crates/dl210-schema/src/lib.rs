//! Fixed-layout binary record schemas for DL-210TH data loggers.
//!
//! A [`Schema`] is a static, ordered list of [`Field`] descriptors. The same
//! generic routines decode, encode and default-construct every record the
//! logger knows about; no per-record parsing code exists.
//!
//! The concrete device layouts live in [`device`] and are protocol constants:
//! they must match the firmware bit for bit.

pub mod datetime;
pub mod device;
pub mod error;
pub mod field;
pub mod measurement;
pub mod record;

pub use datetime::{DateTime, DATETIME};
pub use device::{
    BasicConfig, DeviceRecord, LoggerConfig, Owner, SerialId, Status, TextField, BASIC_CONFIG,
    LOGGER_CONFIG, OWNER, SERIAL_ID, STATUS, TEXT_FIELD,
};
pub use error::{Result, SchemaError};
pub use field::{Field, FieldKind, Value};
pub use measurement::{Measurement, MEASUREMENT};
pub use record::{Record, Schema};

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::field::{Field, Value};
use crate::record::{Record, Schema};

/// The 7-byte date/time sub-record embedded in several device records.
pub static DATETIME: Schema = Schema::new(
    "DateTime",
    &[
        Field::u16("year"),
        Field::u8("month"),
        Field::u8("day"),
        Field::u8("hour"),
        Field::u8("minute"),
        Field::u8("second"),
    ],
);

/// A logger timestamp exactly as stored on the device.
///
/// No calendar validation happens on decode: month 13 or day 32 are kept
/// as-is and only rejected by [`to_naive`](DateTime::to_naive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Read from a record built on [`DATETIME`].
    pub fn from_record(record: &Record) -> Result<Self> {
        if !std::ptr::eq(record.schema(), &DATETIME) {
            return Err(SchemaError::WrongSchema {
                expected: DATETIME.name,
                found: record.schema().name,
            });
        }
        Ok(Self {
            year: record.u16("year")?,
            month: record.u8("month")?,
            day: record.u8("day")?,
            hour: record.u8("hour")?,
            minute: record.u8("minute")?,
            second: record.u8("second")?,
        })
    }

    /// Build a [`DATETIME`] record.
    pub fn to_record(&self) -> Result<Record> {
        DATETIME.record_with([
            ("year", Value::from(self.year)),
            ("month", Value::from(self.month)),
            ("day", Value::from(self.day)),
            ("hour", Value::from(self.hour)),
            ("minute", Value::from(self.minute)),
            ("second", Value::from(self.second)),
        ])
    }

    /// Interpret as a calendar timestamp.
    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or_else(|| SchemaError::InvalidDateTime(self.to_string()))
    }

    /// Convert from a calendar timestamp. Sub-second precision is dropped.
    pub fn from_naive(dt: &NaiveDateTime) -> Result<Self> {
        let year = u16::try_from(dt.year())
            .map_err(|_| SchemaError::InvalidDateTime(dt.to_string()))?;
        Ok(Self {
            year,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        })
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

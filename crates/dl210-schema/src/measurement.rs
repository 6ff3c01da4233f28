use bytes::Bytes;
use serde::Serialize;

use crate::error::{Result, SchemaError};
use crate::field::{Field, Value};
use crate::record::{Record, Schema};

/// One stored or live sample: temperature and relative humidity, both ×100.
pub static MEASUREMENT: Schema = Schema::new(
    "Measurement",
    &[Field::i16("temperature"), Field::i16("humidity")],
);

/// A temperature/humidity sample in hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Measurement {
    /// Degrees Celsius × 100.
    pub temperature: i16,
    /// Percent relative humidity × 100.
    pub humidity: i16,
}

impl Measurement {
    /// Wire width of one sample.
    pub const WIDTH: usize = 4;

    pub fn new(temperature: i16, humidity: i16) -> Self {
        Self {
            temperature,
            humidity,
        }
    }

    /// Decode exactly one sample.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::from_record(&MEASUREMENT.decode(buf)?)
    }

    /// Decode a run of back-to-back samples.
    ///
    /// A trailing partial sample is an error.
    pub fn decode_many(buf: &[u8]) -> Result<Vec<Self>> {
        let chunks = buf.chunks_exact(Self::WIDTH);
        if !chunks.remainder().is_empty() {
            return Err(SchemaError::RecordTooShort {
                schema: MEASUREMENT.name,
                expected: Self::WIDTH,
                actual: chunks.remainder().len(),
            });
        }
        chunks.map(Self::decode).collect()
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        if !std::ptr::eq(record.schema(), &MEASUREMENT) {
            return Err(SchemaError::WrongSchema {
                expected: MEASUREMENT.name,
                found: record.schema().name,
            });
        }
        Ok(Self {
            temperature: record.i16("temperature")?,
            humidity: record.i16("humidity")?,
        })
    }

    pub fn to_record(&self) -> Result<Record> {
        MEASUREMENT.record_with([
            ("temperature", Value::from(self.temperature)),
            ("humidity", Value::from(self.humidity)),
        ])
    }

    pub fn encode(&self) -> Result<Bytes> {
        self.to_record()?.encode()
    }

    pub fn temperature_celsius(&self) -> f64 {
        f64::from(self.temperature) / 100.0
    }

    pub fn humidity_percent(&self) -> f64 {
        f64::from(self.humidity) / 100.0
    }
}

use dl210_schema::Measurement;
use serde::Serialize;

use crate::error::{DeviceError, Result};

/// Width of the big-endian block number that leads every block frame.
pub const BLOCK_NUMBER_SIZE: usize = 2;

/// One numbered unit of stored measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBlock {
    /// 1-based block number.
    pub number: u16,
    pub measurements: Vec<Measurement>,
}

impl DataBlock {
    pub fn new(number: u16, measurements: Vec<Measurement>) -> Self {
        Self {
            number,
            measurements,
        }
    }

    /// Decode `[number_hi, number_lo, measurement...]`.
    ///
    /// Callers check the two-byte minimum first; a shorter payload is
    /// reported as a malformed block 0.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let number = block_number(payload).ok_or_else(|| DeviceError::MalformedBlock {
            block: 0,
            reason: format!("{} bytes cannot hold a block number", payload.len()),
        })?;

        let body = &payload[BLOCK_NUMBER_SIZE..];
        if body.len() % Measurement::WIDTH != 0 {
            return Err(DeviceError::MalformedBlock {
                block: number,
                reason: format!(
                    "{} measurement bytes is not a multiple of {}",
                    body.len(),
                    Measurement::WIDTH
                ),
            });
        }

        let measurements = Measurement::decode_many(body)?;
        Ok(Self::new(number, measurements))
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// The big-endian block number at the start of `payload`, if present.
pub fn block_number(payload: &[u8]) -> Option<u16> {
    match payload {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

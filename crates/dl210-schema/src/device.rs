//! Record layouts spoken by the DL-210TH firmware.
//!
//! Widths and field order are protocol constants. Fields named `unk*` or
//! `reserved*` carry bytes whose meaning is not known; they are kept so a
//! record read from the device can be written back unchanged.

use bytes::Bytes;
use serde::Serialize;

use crate::datetime::{DateTime, DATETIME};
use crate::error::{Result, SchemaError};
use crate::field::Field;
use crate::record::{Record, Schema};

/// Status record (command 48), after the echoed command byte. 59 bytes.
pub static STATUS: Schema = Schema::new(
    "Status",
    &[
        Field::bytes("device_type", 16),
        Field::record("time", &DATETIME),
        Field::u8("unknown1"),
        Field::bytes("firmware_version", 16),
        Field::bytes("serial_number", 16),
        Field::u8("unknown2"),
        Field::bytes("unset", 2),
    ],
);

/// Basic configuration (commands 3 and 4), after the `{0,0,4}` marker. 28 bytes.
pub static BASIC_CONFIG: Schema = Schema::new(
    "BasicConfig",
    &[
        Field::u8("unk1"),
        Field::u8("unk2"),
        Field::u16("data_count"),
        Field::u8("unk5"),
        Field::u8("unk6"),
        Field::u16("sample_rate"),
        Field::u8("unk8"),
        Field::u8("unk9"),
        Field::u8("unk10"),
        Field::u8("unk11"),
        Field::u8("unk12"),
        Field::u8("unk13"),
        Field::u8("unk14"),
        Field::u8("unk15"),
        Field::u8("unk16"),
        Field::u8("unk17"),
        Field::u8("unk18"),
        Field::u8("unk19"),
        Field::record("time", &DATETIME),
        Field::u8("unk27"),
    ],
);

/// Full logger configuration (commands 17 and 33). 59 bytes.
pub static LOGGER_CONFIG: Schema = Schema::new(
    "LoggerConfig",
    &[
        Field::u16("sample_rate"),
        Field::u16("start_delay"),
        Field::i16("temperature_high_alarm"),
        Field::i16("temperature_low_alarm"),
        Field::i16("humidity_high_alarm"),
        Field::i16("humidity_low_alarm"),
        Field::u8("led_interval"),
        Field::u8("start_mode"),
        Field::u8("stop_mode"),
        Field::u8("temperature_unit"),
        Field::bytes("reserved1", 14),
        Field::record("start_time", &DATETIME),
        Field::u32("capacity"),
        Field::record("stop_time", &DATETIME),
        Field::record("last_download", &DATETIME),
        Field::bytes("reserved2", 4),
    ],
);

/// Owner name and start time (command 34). 55 bytes.
pub static OWNER: Schema = Schema::new(
    "Owner",
    &[
        Field::bytes("owner", 48),
        Field::record("start_time", &DATETIME),
    ],
);

/// Serial id string (command 12). 16 bytes.
pub static SERIAL_ID: Schema = Schema::new("SerialId", &[Field::bytes("serial", 16)]);

/// Location and free-text fields (commands 35 through 39). 48 bytes.
pub static TEXT_FIELD: Schema = Schema::new("TextField", &[Field::bytes("text", 48)]);

/// A typed view over a record of one fixed schema.
pub trait DeviceRecord: Sized {
    /// The layout this record is decoded with.
    fn schema() -> &'static Schema;

    /// Wrap a record. Fails if it was built from another schema.
    fn from_record(record: Record) -> Result<Self>;

    /// The underlying record.
    fn record(&self) -> &Record;

    /// Decode from exactly `schema().width()` bytes.
    fn decode(buf: &[u8]) -> Result<Self> {
        Self::from_record(Self::schema().decode(buf)?)
    }

    /// Encode to the wire layout.
    fn encode(&self) -> Result<Bytes> {
        self.record().encode()
    }
}

fn check_schema(record: &Record, expected: &'static Schema) -> Result<()> {
    if std::ptr::eq(record.schema(), expected) {
        Ok(())
    } else {
        Err(SchemaError::WrongSchema {
            expected: expected.name,
            found: record.schema().name,
        })
    }
}

macro_rules! device_record {
    ($(#[$meta:meta])* $name:ident => $schema:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        #[serde(transparent)]
        pub struct $name(Record);

        impl DeviceRecord for $name {
            fn schema() -> &'static Schema {
                &$schema
            }

            fn from_record(record: Record) -> Result<Self> {
                check_schema(&record, &$schema)?;
                Ok(Self(record))
            }

            fn record(&self) -> &Record {
                &self.0
            }
        }

        impl $name {
            /// A record with every field zeroed.
            pub fn zeroed() -> Self {
                Self($schema.default_record())
            }

            /// Mutable access for building write requests.
            pub fn record_mut(&mut self) -> &mut Record {
                &mut self.0
            }

            pub fn into_record(self) -> Record {
                self.0
            }
        }
    };
}

device_record!(
    /// The status record, including the device identity.
    Status => STATUS
);

device_record!(
    /// The basic configuration, including the stored sample count and clock.
    BasicConfig => BASIC_CONFIG
);

device_record!(
    /// The full logger configuration.
    LoggerConfig => LOGGER_CONFIG
);

device_record!(Owner => OWNER);

device_record!(SerialId => SERIAL_ID);

device_record!(
    /// Location or one of the free-text fields.
    TextField => TEXT_FIELD
);

impl Status {
    /// Device model string, trimmed.
    pub fn device_type(&self) -> Result<String> {
        self.0.text("device_type")
    }

    pub fn firmware_version(&self) -> Result<String> {
        self.0.text("firmware_version")
    }

    pub fn serial_number(&self) -> Result<String> {
        self.0.text("serial_number")
    }

    /// The device clock at the time of the query.
    pub fn time(&self) -> Result<DateTime> {
        DateTime::from_record(self.0.record("time")?)
    }
}

impl BasicConfig {
    /// Number of measurements stored on the device.
    pub fn data_count(&self) -> Result<u16> {
        self.0.u16("data_count")
    }

    /// Seconds between stored measurements.
    pub fn sample_rate(&self) -> Result<u16> {
        self.0.u16("sample_rate")
    }

    /// Timestamp of the first stored measurement.
    pub fn time(&self) -> Result<DateTime> {
        DateTime::from_record(self.0.record("time")?)
    }

    pub fn set_time(&mut self, time: &DateTime) -> Result<()> {
        self.0.set("time", time.to_record()?)
    }

    pub fn set_sample_rate(&mut self, seconds: u16) -> Result<()> {
        self.0.set("sample_rate", seconds)
    }
}

impl LoggerConfig {
    pub fn sample_rate(&self) -> Result<u16> {
        self.0.u16("sample_rate")
    }

    /// Maximum number of measurements the logger can store.
    pub fn capacity(&self) -> Result<u32> {
        self.0.u32("capacity")
    }

    pub fn start_time(&self) -> Result<DateTime> {
        DateTime::from_record(self.0.record("start_time")?)
    }

    pub fn stop_time(&self) -> Result<DateTime> {
        DateTime::from_record(self.0.record("stop_time")?)
    }
}

impl Owner {
    pub fn owner(&self) -> Result<String> {
        self.0.text("owner")
    }

    pub fn start_time(&self) -> Result<DateTime> {
        DateTime::from_record(self.0.record("start_time")?)
    }
}

impl SerialId {
    pub fn serial(&self) -> Result<String> {
        self.0.text("serial")
    }
}

impl TextField {
    pub fn text(&self) -> Result<String> {
        self.0.text("text")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::field::FieldKind;

    fn all() -> [&'static Schema; 6] {
        [
            &STATUS,
            &BASIC_CONFIG,
            &LOGGER_CONFIG,
            &OWNER,
            &SERIAL_ID,
            &TEXT_FIELD,
        ]
    }

    #[test]
    fn protocol_widths() {
        assert_eq!(STATUS.width(), 59);
        assert_eq!(BASIC_CONFIG.width(), 28);
        assert_eq!(LOGGER_CONFIG.width(), 59);
        assert_eq!(OWNER.width(), 55);
        assert_eq!(SERIAL_ID.width(), 16);
        assert_eq!(TEXT_FIELD.width(), 48);
    }

    #[test]
    fn field_names_are_unique() {
        for schema in all() {
            let mut seen = HashSet::new();
            for field in schema.fields {
                assert!(seen.insert(field.name), "{}.{} repeats", schema.name, field.name);
            }
        }
    }

    #[test]
    fn logger_config_fits_one_command_frame() {
        // 3-byte command header + payload must fit a 64-byte report.
        assert!(LOGGER_CONFIG.width() + 3 <= 64);
    }

    #[test]
    fn every_schema_round_trips_defaults() {
        for schema in all() {
            let record = schema.default_record();
            let encoded = record.encode().unwrap();
            assert_eq!(encoded.len(), schema.width());
            let decoded = schema.decode(&encoded).unwrap();
            assert_eq!(decoded.encode().unwrap(), encoded);
        }
    }

    #[test]
    fn every_schema_round_trips_patterned_bytes() {
        for schema in all() {
            let raw: Vec<u8> = (0..schema.width()).map(|i| (i * 7 + 1) as u8).collect();
            let decoded = schema.decode(&raw).unwrap();
            assert_eq!(decoded.encode().unwrap().as_ref(), raw.as_slice());
        }
    }

    #[test]
    fn basic_config_offsets() {
        let mut raw = vec![0u8; 28];
        raw[2..4].copy_from_slice(&32u16.to_le_bytes());
        raw[6..8].copy_from_slice(&600u16.to_le_bytes());
        raw[20..27].copy_from_slice(&[0xE8, 0x07, 5, 1, 12, 0, 30]);

        let cfg = BasicConfig::decode(&raw).unwrap();
        assert_eq!(cfg.data_count().unwrap(), 32);
        assert_eq!(cfg.sample_rate().unwrap(), 600);
        assert_eq!(cfg.time().unwrap().to_string(), "2024-05-01 12:00:30");
    }

    #[test]
    fn status_fields() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"DL-210TH\0\0\0\0\0\0\0\0");
        raw.extend_from_slice(&[0xE8, 0x07, 1, 2, 3, 4, 5]);
        raw.push(0);
        raw.extend_from_slice(b"1.07\0\0\0\0\0\0\0\0\0\0\0\0");
        raw.extend_from_slice(b"A1234567\0\0\0\0\0\0\0\0");
        raw.push(0);
        raw.extend_from_slice(&[0, 0]);

        let status = Status::decode(&raw).unwrap();
        assert_eq!(status.device_type().unwrap(), "DL-210TH");
        assert_eq!(status.firmware_version().unwrap(), "1.07");
        assert_eq!(status.serial_number().unwrap(), "A1234567");
        assert_eq!(status.time().unwrap().day, 2);
    }

    #[test]
    fn set_time_rebuilds_write_payload() {
        let mut cfg = BasicConfig::zeroed();
        let when = DateTime {
            year: 2025,
            month: 6,
            day: 30,
            hour: 8,
            minute: 15,
            second: 0,
        };
        cfg.set_time(&when).unwrap();
        let encoded = cfg.encode().unwrap();
        assert_eq!(&encoded[20..27], &[0xE9, 0x07, 6, 30, 8, 15, 0]);
        assert_eq!(cfg.time().unwrap(), when);
    }

    #[test]
    fn oversize_owner_is_rejected() {
        let mut owner = Owner::zeroed();
        owner.record_mut().set("owner", "x".repeat(49).as_str()).unwrap();
        assert!(matches!(
            owner.encode(),
            Err(SchemaError::StringTooLong { max: 48, .. })
        ));
    }

    #[test]
    fn wrapper_rejects_foreign_schema() {
        let result = Status::from_record(BASIC_CONFIG.default_record());
        assert!(matches!(
            result,
            Err(SchemaError::WrongSchema {
                expected: "Status",
                found: "BasicConfig"
            })
        ));
    }

    #[test]
    fn logger_config_has_u32_capacity() {
        let (_, field) = LOGGER_CONFIG.field("capacity").unwrap();
        assert_eq!(field.kind, FieldKind::U32);
        let cfg = LoggerConfig::zeroed();
        assert_eq!(cfg.capacity().unwrap(), 0);
    }
}

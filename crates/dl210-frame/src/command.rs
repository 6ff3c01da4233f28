//! Command codes understood by the DL-210TH.

/// Stream every stored data block; answered by many frames.
pub const DUMP_START: u8 = 1;

/// Fetch one data block by number (big-endian u16 payload).
pub const FETCH_BLOCK: u8 = 2;

/// Write the basic configuration record.
pub const WRITE_BASIC_CONFIG: u8 = 3;

/// Read the basic configuration record.
pub const READ_BASIC_CONFIG: u8 = 4;

/// Read the live sensor values.
pub const READ_SENSORS: u8 = 6;

/// Read the serial id string.
pub const SERIAL_ID: u8 = 12;

/// Write the full logger configuration record.
pub const WRITE_LOGGER_CONFIG: u8 = 17;

/// Read the full logger configuration record.
pub const READ_LOGGER_CONFIG: u8 = 33;

/// Read the owner name and start time.
pub const OWNER: u8 = 34;

/// Read the location text.
pub const LOCATION: u8 = 35;

/// First free-text field. Fields run through [`TEXT_FIELD_LAST`].
pub const TEXT_FIELD_FIRST: u8 = 36;

/// Last free-text field.
pub const TEXT_FIELD_LAST: u8 = 39;

/// Read the status record (device type, clock, firmware, serial).
pub const STATUS: u8 = 48;

/// Returns a human-readable name for a command code.
pub fn command_name(code: u8) -> &'static str {
    match code {
        DUMP_START => "dump-start",
        FETCH_BLOCK => "fetch-block",
        WRITE_BASIC_CONFIG => "write-basic-config",
        READ_BASIC_CONFIG => "read-basic-config",
        READ_SENSORS => "read-sensors",
        SERIAL_ID => "serial-id",
        WRITE_LOGGER_CONFIG => "write-logger-config",
        READ_LOGGER_CONFIG => "read-logger-config",
        OWNER => "owner",
        LOCATION => "location",
        TEXT_FIELD_FIRST..=TEXT_FIELD_LAST => "text-field",
        STATUS => "status",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cover_known_codes() {
        assert_eq!(command_name(STATUS), "status");
        assert_eq!(command_name(FETCH_BLOCK), "fetch-block");
        assert_eq!(command_name(37), "text-field");
        assert_eq!(command_name(200), "unknown");
    }
}

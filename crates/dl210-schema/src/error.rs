/// Errors that can occur while decoding or encoding records.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A single field ran past the end of the buffer.
    #[error("field {field}: need {needed} bytes at offset {offset}, {available} available")]
    TooShort {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The buffer ended before every field of the record was decoded.
    #[error("{schema} record too short (expected {expected} bytes, got {actual})")]
    RecordTooShort {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Bytes remained after the last field of a top-level record.
    #[error("{schema} record too long (expected {expected} bytes, got {actual})")]
    RecordTooLong {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A string value does not fit its fixed-width field.
    #[error("string field {field} too long ({len} bytes, max {max})")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The schema has no field with this name.
    #[error("{schema} has no field named {field}")]
    UnknownField { schema: &'static str, field: String },

    /// A value of the wrong type was supplied or requested.
    #[error("field {field} holds {expected}, not {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// A record built from one schema was used where another was required.
    #[error("expected a {expected} record, got {found}")]
    WrongSchema {
        expected: &'static str,
        found: &'static str,
    },

    /// A decoded date/time does not name a real calendar instant.
    #[error("invalid date/time {0}")]
    InvalidDateTime(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

use dl210_schema::DateTime;

/// Errors that can occur in logger operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Frame-level error (envelope, transport).
    #[error("frame error: {0}")]
    Frame(#[from] dl210_frame::FrameError),

    /// Record decode/encode error.
    #[error("record error: {0}")]
    Schema(#[from] dl210_schema::SchemaError),

    /// A response had the wrong total length for its command.
    #[error("command {code} ({name}): expected {expected} response bytes, got {actual}")]
    UnexpectedResponseLength {
        code: u8,
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A response did not start with the marker its command requires.
    #[error("command {code} ({name}): expected response prefix {expected:02x?}, got {actual:02x?}")]
    UnexpectedResponsePrefix {
        code: u8,
        name: &'static str,
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// The connected device is not a supported logger model.
    #[error("unsupported device type {found:?} (expected {expected:?})")]
    UnsupportedDevice { expected: String, found: String },

    /// Stored data changed between the start and end of a dump.
    #[error(
        "data changed during dump (count {before_count} -> {after_count}, \
         time {before_time} -> {after_time})"
    )]
    DataChangedDuringDump {
        before_count: u16,
        after_count: u16,
        before_time: DateTime,
        after_time: DateTime,
    },

    /// The dump stream delivered the same block twice.
    #[error("block {0} received twice")]
    DuplicateBlock(u16),

    /// A data block frame or fetch response could not be decoded.
    #[error("malformed block {block}: {reason}")]
    MalformedBlock { block: u16, reason: String },

    /// A dump frame too short to hold a block number.
    #[error("dump frame too short ({len} payload bytes, need at least 2)")]
    ShortBlock { len: usize },

    /// A free-text slot outside 1 through 4 was requested.
    #[error("text field slot {0} out of range (1-4)")]
    TextSlotOutOfRange(u8),
}

impl DeviceError {
    /// Whether the operation may succeed if repeated from the start.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeviceError::DataChangedDuringDump { .. })
    }
}

pub type Result<T> = std::result::Result<T, DeviceError>;

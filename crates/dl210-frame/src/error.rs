use dl210_transport::TransportError;

/// Errors that can occur while framing commands or unframing responses.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The response is too short to hold the two-byte envelope.
    #[error("response too short ({len} bytes, need at least 2)")]
    FrameTooShort { len: usize },

    /// The response does not start with the magic byte.
    #[error("invalid first response byte 0x{found:02x} (expected 0x3f)")]
    BadMagicByte { found: u8 },

    /// The declared payload length runs past the end of the response.
    #[error("response length byte {declared} exceeds received {received} bytes")]
    LengthOverflow { declared: u8, received: usize },

    /// The command payload does not fit in a single frame.
    #[error("command payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The channel accepted only part of a command frame.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// The underlying channel failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;

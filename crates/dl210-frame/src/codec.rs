use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Magic byte leading every frame in both directions.
pub const MAGIC: u8 = 0x3F;

/// Largest frame the logger sends or accepts.
pub const MAX_FRAME_SIZE: usize = 64;

/// Command header: magic (1) + length (1) + command code (1) = 3 bytes.
pub const COMMAND_HEADER_SIZE: usize = 3;

/// Response header: magic (1) + length (1) = 2 bytes.
pub const RESPONSE_HEADER_SIZE: usize = 2;

/// Largest payload that fits next to the command header.
pub const MAX_COMMAND_PAYLOAD: usize = MAX_FRAME_SIZE - COMMAND_HEADER_SIZE;

/// Read timeout used by the logger's own software.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(1000);

/// Encode a command frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬──────────────┬──────────┬──────────────────┐
/// │ Magic  │ Length (1B)  │ Command  │ Payload          │
/// │ 0x3F   │ payload + 1  │ (1B)     │ (Length-1 bytes) │
/// └────────┴──────────────┴──────────┴──────────────────┘
/// ```
pub fn encode_command(code: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_COMMAND_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_COMMAND_PAYLOAD,
        });
    }
    dst.reserve(COMMAND_HEADER_SIZE + payload.len());
    dst.put_u8(MAGIC);
    dst.put_u8((payload.len() + 1) as u8);
    dst.put_u8(code);
    dst.put_slice(payload);
    Ok(())
}

/// Validate a response envelope and return its payload.
///
/// Wire format:
/// ```text
/// ┌────────┬────────────┬──────────────────┬───────────────┐
/// │ Magic  │ Length N   │ Payload          │ Report filler │
/// │ 0x3F   │ (1B)       │ (N bytes)        │ (ignored)     │
/// └────────┴────────────┴──────────────────┴───────────────┘
/// ```
///
/// Bytes after the declared payload are padding from the fixed-size HID
/// report and are discarded.
pub fn decode_response(src: &[u8]) -> Result<&[u8]> {
    if src.len() < RESPONSE_HEADER_SIZE {
        return Err(FrameError::FrameTooShort { len: src.len() });
    }
    if src[0] != MAGIC {
        return Err(FrameError::BadMagicByte { found: src[0] });
    }

    let declared = src[1];
    let end = RESPONSE_HEADER_SIZE + declared as usize;
    if end > src.len() {
        return Err(FrameError::LengthOverflow {
            declared,
            received: src.len(),
        });
    }

    Ok(&src[RESPONSE_HEADER_SIZE..end])
}

/// Configuration for the frame transport.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// How long a single response read may block. Default: 1000 ms.
    pub read_timeout: Duration,
    /// Size of the read buffer, i.e. the largest report accepted. Default: 64.
    pub max_frame_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

//! Command/response framing for the DL-210TH HID protocol.
//!
//! Every command written to the logger is framed as:
//! - the magic byte `0x3F`
//! - a length byte counting the command code plus payload
//! - the command code, then the payload
//!
//! Every response carries the same magic byte and a length byte, followed
//! by that many payload bytes. A frame never exceeds 64 bytes.

pub mod codec;
pub mod command;
pub mod error;
pub mod transport;

pub use codec::{
    decode_response, encode_command, FrameConfig, COMMAND_HEADER_SIZE, DEFAULT_READ_TIMEOUT,
    MAGIC, MAX_COMMAND_PAYLOAD, MAX_FRAME_SIZE, RESPONSE_HEADER_SIZE,
};
pub use command::command_name;
pub use error::{FrameError, Result};
pub use transport::FrameTransport;

use std::fmt;
use std::io;

use dl210_device::DeviceError;
use dl210_frame::FrameError;
use dl210_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: &io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match &err {
        TransportError::Open { source, .. } => {
            CliError::new(io_error(context, source).code, format!("{context}: {err}"))
        }
        TransportError::Io(source) => io_error(context, source),
        TransportError::NotADevice { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Transport(err) => transport_error(context, err),
        // A zero-length read is the device not answering within the timeout.
        FrameError::FrameTooShort { len: 0 } => {
            CliError::new(TIMEOUT, format!("{context}: no response from device"))
        }
        FrameError::ShortWrite { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        FrameError::FrameTooShort { .. }
        | FrameError::BadMagicByte { .. }
        | FrameError::LengthOverflow { .. }
        | FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::TextSlotOutOfRange(_) => CliError::new(USAGE, format!("{context}: {err}")),
        DeviceError::UnsupportedDevice { .. } | DeviceError::DataChangedDuringDump { .. } => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        DeviceError::Schema(_)
        | DeviceError::UnexpectedResponseLength { .. }
        | DeviceError::UnexpectedResponsePrefix { .. }
        | DeviceError::DuplicateBlock(_)
        | DeviceError::MalformedBlock { .. }
        | DeviceError::ShortBlock { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn permission_denied_on_open() {
        let err = TransportError::Open {
            path: PathBuf::from("/dev/hidraw0"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(transport_error("open", err).code, PERMISSION_DENIED);
    }

    #[test]
    fn open_failure_names_the_path() {
        let err = TransportError::Open {
            path: PathBuf::from("/dev/hidraw7"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let cli = transport_error("open failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
        assert!(cli.message.starts_with("open failed: failed to open /dev/hidraw7: "));
    }

    #[test]
    fn silent_device_is_timeout() {
        let err = DeviceError::Frame(FrameError::FrameTooShort { len: 0 });
        let cli = device_error("status", err);
        assert_eq!(cli.code, TIMEOUT);
        assert_eq!(cli.message, "status: no response from device");
    }

    #[test]
    fn protocol_mismatch_is_data_invalid() {
        let err = DeviceError::UnexpectedResponseLength {
            code: 4,
            name: "read-basic-config",
            expected: 31,
            actual: 12,
        };
        assert_eq!(device_error("config", err).code, DATA_INVALID);
        assert_eq!(
            frame_error("x", FrameError::BadMagicByte { found: 1 }).code,
            DATA_INVALID
        );
    }

    #[test]
    fn wrong_model_is_failure() {
        let err = DeviceError::UnsupportedDevice {
            expected: "DL-210TH".into(),
            found: "DL-100".into(),
        };
        let cli = device_error("open", err);
        assert_eq!(cli.code, FAILURE);
        assert!(cli.message.contains("DL-100"));
    }
}

use dl210_frame::command_name;

use crate::error::{DeviceError, Result};

/// The response shape a command must produce.
///
/// Checked before any decoding: an exact total length (when known) and a
/// required leading marker, either the echoed command code or a fixed
/// `{0, 0, code}` acknowledgement.
#[derive(Debug, Clone, Copy)]
pub struct Expect<'a> {
    len: Option<usize>,
    prefix: &'a [u8],
}

impl<'a> Expect<'a> {
    /// Exactly `len` bytes, starting with `prefix`.
    pub fn exact(len: usize, prefix: &'a [u8]) -> Self {
        Self {
            len: Some(len),
            prefix,
        }
    }

    /// Any length, starting with `prefix`.
    pub fn prefixed(prefix: &'a [u8]) -> Self {
        Self { len: None, prefix }
    }

    /// Validate `payload` and return the bytes after the prefix.
    pub fn check<'p>(&self, code: u8, payload: &'p [u8]) -> Result<&'p [u8]> {
        if let Some(len) = self.len {
            if payload.len() != len {
                return Err(DeviceError::UnexpectedResponseLength {
                    code,
                    name: command_name(code),
                    expected: len,
                    actual: payload.len(),
                });
            }
        }

        if !payload.starts_with(self.prefix) {
            let shown = payload.len().min(self.prefix.len());
            return Err(DeviceError::UnexpectedResponsePrefix {
                code,
                name: command_name(code),
                expected: self.prefix.to_vec(),
                actual: payload[..shown].to_vec(),
            });
        }

        Ok(&payload[self.prefix.len()..])
    }
}

/// The `{0, 0, code}` acknowledgement used by configuration commands.
pub fn ack(code: u8) -> [u8; 3] {
    [0, 0, code]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_shape_returns_body() {
        let body = Expect::exact(5, &[0, 0, 4])
            .check(4, &[0, 0, 4, 9, 8])
            .unwrap();
        assert_eq!(body, &[9, 8]);
    }

    #[test]
    fn wrong_length_names_command_and_sizes() {
        let err = Expect::exact(60, &[48]).check(48, &[48; 59]).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedResponseLength {
                code: 48,
                name: "status",
                expected: 60,
                actual: 59
            }
        ));
        assert_eq!(
            err.to_string(),
            "command 48 (status): expected 60 response bytes, got 59"
        );
    }

    #[test]
    fn wrong_prefix_reports_actual_bytes() {
        let err = Expect::exact(3, &ack(3)).check(3, &[0, 1, 3]).unwrap_err();
        match err {
            DeviceError::UnexpectedResponsePrefix {
                code,
                expected,
                actual,
                ..
            } => {
                assert_eq!(code, 3);
                assert_eq!(expected, vec![0, 0, 3]);
                assert_eq!(actual, vec![0, 1, 3]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn prefixed_accepts_any_length() {
        let body = Expect::prefixed(&[0, 7]).check(2, &[0, 7, 1, 2, 3, 4]).unwrap();
        assert_eq!(body.len(), 4);
        assert!(Expect::prefixed(&[0, 7]).check(2, &[0]).is_err());
    }
}

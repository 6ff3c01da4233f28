use bytes::{Bytes, BytesMut};
use dl210_transport::DeviceChannel;
use tracing::{debug, trace};

use crate::codec::{decode_response, encode_command, FrameConfig, RESPONSE_HEADER_SIZE};
use crate::command::command_name;
use crate::error::{FrameError, Result};

/// Sends command frames and reads response frames over a [`DeviceChannel`].
///
/// One request is outstanding at a time. `run_command` is the usual entry
/// point; `send_command` and `read_response` exist separately for the dump
/// stream, where a single command is answered by many frames.
pub struct FrameTransport<C> {
    inner: C,
    buf: BytesMut,
    config: FrameConfig,
}

impl<C: DeviceChannel> FrameTransport<C> {
    /// Create a new frame transport with default configuration.
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame transport with explicit configuration.
    pub fn with_config(inner: C, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.max_frame_size),
            config,
        }
    }

    /// Frame and write a command. Does not wait for a response.
    pub fn send_command(&mut self, code: u8, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_command(code, payload, &mut self.buf)?;

        let written = self.inner.write(&self.buf)?;
        if written != self.buf.len() {
            return Err(FrameError::ShortWrite {
                written,
                expected: self.buf.len(),
            });
        }

        debug!(
            code,
            command = command_name(code),
            payload_len = payload.len(),
            "sent command"
        );
        Ok(())
    }

    /// Read one raw response report, envelope included (blocking).
    ///
    /// Returns an empty buffer when the read timed out. The envelope is not
    /// checked here; see [`decode_response`].
    pub fn read_response(&mut self) -> Result<Bytes> {
        let mut report = vec![0u8; self.config.max_frame_size];
        let n = self.inner.read(&mut report, self.config.read_timeout)?;
        report.truncate(n);
        trace!(len = n, "read response report");
        Ok(Bytes::from(report))
    }

    /// Send a command, read one response and return its payload.
    pub fn run_command(&mut self, code: u8, payload: &[u8]) -> Result<Bytes> {
        self.send_command(code, payload)?;
        let report = self.read_response()?;
        let len = decode_response(&report)?.len();
        debug!(
            code,
            command = command_name(code),
            response_len = len,
            "received response"
        );
        Ok(report.slice(RESPONSE_HEADER_SIZE..RESPONSE_HEADER_SIZE + len))
    }

    /// Close the underlying channel.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close().map_err(Into::into)
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the transport and return the inner channel.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Current transport configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dl210_transport::{ReplayChannel, TransportError};

    use super::*;

    #[test]
    fn run_command_writes_frame_and_strips_envelope() {
        let chan = ReplayChannel::with_reads([vec![0x3F, 0x03, 0x00, 0x00, 0x03, 0xEE, 0xEE]]);
        let mut transport = FrameTransport::new(chan);

        let payload = transport.run_command(3, &[0xAA, 0xBB]).unwrap();
        assert_eq!(payload.as_ref(), &[0x00, 0x00, 0x03]);

        let chan = transport.into_inner();
        assert_eq!(chan.written().len(), 1);
        assert_eq!(chan.written()[0].as_ref(), &[0x3F, 0x03, 0x03, 0xAA, 0xBB]);
    }

    #[test]
    fn run_command_timeout_is_too_short() {
        let mut transport = FrameTransport::new(ReplayChannel::new());
        let err = transport.run_command(48, &[]).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooShort { len: 0 }));
    }

    #[test]
    fn run_command_rejects_bad_magic() {
        let chan = ReplayChannel::with_reads([vec![0x00, 0x01, 0x30]]);
        let mut transport = FrameTransport::new(chan);
        let err = transport.run_command(48, &[]).unwrap_err();
        assert!(matches!(err, FrameError::BadMagicByte { found: 0 }));
    }

    #[test]
    fn run_command_rejects_length_overflow() {
        let chan = ReplayChannel::with_reads([vec![0x3F, 0x10, 0x30]]);
        let mut transport = FrameTransport::new(chan);
        let err = transport.run_command(48, &[]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthOverflow {
                declared: 16,
                received: 3
            }
        ));
    }

    #[test]
    fn read_response_returns_raw_report() {
        let chan = ReplayChannel::with_reads([vec![0x3F, 0x03, 0x00, 0x00, 0x05]]);
        let mut transport = FrameTransport::new(chan);
        transport.send_command(1, &[]).unwrap();

        let raw = transport.read_response().unwrap();
        assert_eq!(raw.as_ref(), &[0x3F, 0x03, 0x00, 0x00, 0x05]);
        let empty = transport.read_response().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn read_is_capped_at_frame_size() {
        let chan = ReplayChannel::with_reads([vec![0x3F; 100]]);
        let mut transport = FrameTransport::with_config(
            chan,
            FrameConfig {
                read_timeout: Duration::from_millis(5),
                ..FrameConfig::default()
            },
        );
        assert_eq!(transport.read_response().unwrap().len(), 64);
    }

    #[test]
    fn oversized_payload_is_not_written() {
        let mut transport = FrameTransport::new(ReplayChannel::new());
        let err = transport.send_command(17, &[0u8; 62]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(transport.get_ref().written().is_empty());
    }

    #[test]
    fn closed_channel_surfaces_transport_error() {
        let mut transport = FrameTransport::new(ReplayChannel::new());
        transport.close().unwrap();
        let err = transport.send_command(48, &[]).unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Closed)));
    }

    struct HalfWriter;

    impl DeviceChannel for HalfWriter {
        fn write(&mut self, data: &[u8]) -> dl210_transport::Result<usize> {
            Ok(data.len() / 2)
        }

        fn read(&mut self, _buf: &mut [u8], _timeout: Duration) -> dl210_transport::Result<usize> {
            Ok(0)
        }

        fn close(&mut self) -> dl210_transport::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_write_is_an_error() {
        let mut transport = FrameTransport::new(HalfWriter);
        let err = transport.send_command(2, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ShortWrite {
                written: 2,
                expected: 5
            }
        ));
    }
}

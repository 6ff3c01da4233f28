use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::DeviceChannel;

/// A channel that replays a fixed script of device reports.
///
/// Every `read` pops the next scripted report; once the script is exhausted
/// reads behave like a timeout and return zero bytes. Every `write` is
/// recorded so callers can assert on the exact command frames sent.
#[derive(Debug, Default)]
pub struct ReplayChannel {
    reads: VecDeque<Bytes>,
    writes: Vec<Bytes>,
    closed: bool,
}

impl ReplayChannel {
    /// Create an empty replay channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a replay channel preloaded with reports.
    pub fn with_reads<I, B>(reads: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            reads: reads.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Queue one more report.
    pub fn push_read(&mut self, report: impl Into<Bytes>) {
        self.reads.push_back(report.into());
    }

    /// Queue a simulated timeout (a zero-length read).
    pub fn push_timeout(&mut self) {
        self.reads.push_back(Bytes::new());
    }

    /// Reports written so far, in order.
    pub fn written(&self) -> &[Bytes] {
        &self.writes
    }

    /// Scripted reports not yet consumed.
    pub fn remaining_reads(&self) -> usize {
        self.reads.len()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl DeviceChannel for ReplayChannel {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        trace!(len = data.len(), "replay write");
        self.writes.push(Bytes::copy_from_slice(data));
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let Some(report) = self.reads.pop_front() else {
            return Ok(0);
        };
        let n = report.len().min(buf.len());
        buf[..n].copy_from_slice(&report[..n]);
        trace!(len = n, "replay read");
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "replay"
    }
}

use std::time::Duration;

use crate::error::Result;

/// A duplex byte channel to a logger.
///
/// Each `write` sends one report and each `read` returns at most one report.
/// The protocol is strictly half-duplex: callers never have more than one
/// request outstanding on a channel.
pub trait DeviceChannel {
    /// Write one report. Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read one report into `buf`, waiting at most `timeout`.
    ///
    /// Returns `Ok(0)` when nothing arrived before the timeout expired.
    /// A timeout is not an error at this layer.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Release the underlying device. Further I/O fails with `Closed`.
    fn close(&mut self) -> Result<()>;

    /// Transport name for diagnostics.
    fn transport_name(&self) -> &'static str {
        "device-channel"
    }
}

impl<T: DeviceChannel + ?Sized> DeviceChannel for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).read(buf, timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

impl<T: DeviceChannel + ?Sized> DeviceChannel for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        (**self).read(buf, timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn transport_name(&self) -> &'static str {
        (**self).transport_name()
    }
}

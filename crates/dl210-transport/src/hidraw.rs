use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::DeviceChannel;

/// A logger reached through a Linux `hidraw` character device.
///
/// Reports are written and read without a report ID prefix, which is what
/// the DL-210TH firmware expects. Reads wait with `poll(2)` so the caller's
/// timeout applies even though the node is opened in blocking mode.
pub struct HidrawDevice {
    file: Option<File>,
    path: PathBuf,
}

impl HidrawDevice {
    /// Open a `hidraw` node for reading and writing.
    ///
    /// Regular files and directories are rejected; only character devices
    /// are accepted.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let metadata = std::fs::metadata(&path).map_err(|e| TransportError::Open {
            path: path.clone(),
            source: e,
        })?;
        if !metadata.file_type().is_char_device() {
            return Err(TransportError::NotADevice { path });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| TransportError::Open {
                path: path.clone(),
                source: e,
            })?;

        debug!(?path, "opened hidraw device");

        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// The device node this channel was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(TransportError::Closed)
    }
}

impl DeviceChannel for HidrawDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let file = self.file_mut()?;
        loop {
            match file.write(data) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let file = self.file_mut()?;
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        loop {
            let mut pfd = libc::pollfd {
                fd: file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };

            // SAFETY: `pfd` is a valid, writable pollfd and we pass a count of one.
            // The descriptor stays open for the duration of the call because
            // `file` is borrowed mutably.
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };

            if rc < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == ErrorKind::Interrupted {
                    continue;
                }
                return Err(TransportError::Io(err));
            }
            if rc == 0 {
                return Ok(0);
            }

            match file.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.file.take().is_some() {
            debug!(path = ?self.path, "closed hidraw device");
        }
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "hidraw"
    }
}

impl std::fmt::Debug for HidrawDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidrawDevice")
            .field("path", &self.path)
            .field("open", &self.file.is_some())
            .finish()
    }
}

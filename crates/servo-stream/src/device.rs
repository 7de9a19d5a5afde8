use crate::traits::{AngleSource, ReadChunk};
use crate::{Result, SourceError};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Non-blocking reader over a character device that emits ASCII angle
/// records, one per line.
///
/// The handle is exclusively owned; closing is idempotent and dropping the
/// channel releases the descriptor at most once.
pub struct DeviceChannel {
    path: PathBuf,
    chunk_bytes: usize,
    file: Option<File>,
}

impl DeviceChannel {
    /// Bind to a device path without touching it. I/O starts at `open`.
    pub fn new(path: impl AsRef<Path>, chunk_bytes: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            chunk_bytes,
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AngleSource for DeviceChannel {
    fn open(&mut self) -> Result<()> {
        // At most one descriptor per channel: drop any previous handle
        // before reopening.
        self.file = None;
        match OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&self.path)
        {
            Ok(file) => {
                info!("Successfully opened {}", self.path.display());
                self.file = Some(file);
                Ok(())
            }
            Err(e) => {
                error!("Failed to open {}: {}", self.path.display(), e);
                Err(SourceError::Open {
                    path: self.path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn read_chunk(&mut self) -> Result<ReadChunk> {
        let file = self.file.as_mut().ok_or(SourceError::NotOpen)?;
        let mut buf = vec![0u8; self.chunk_bytes];
        match file.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(ReadChunk::Data(buf))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(ReadChunk::WouldBlock),
            Err(e) => Err(SourceError::Io(e.to_string())),
        }
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("Closed {}", self.path.display());
        }
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

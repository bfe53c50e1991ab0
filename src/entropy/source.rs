//! Blocking entropy source abstraction.
//!
//! The trait lets the seed store read from a device or a regular file
//! without caring which one it has.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known blocking entropy device.
pub const DEFAULT_ENTROPY_DEVICE: &str = "/dev/random";

/// Largest piece handed to a sink by [`EntropySource::stream_exact`].
pub const STREAM_CHUNK_BYTES: usize = 16 * 1024;

/// Errors that can occur while reading entropy.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The source could not be opened.
    #[error("failed to open entropy source {}: {source}", .path.display())]
    OpenFailed {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A read returned an error other than an interruption.
    #[error("failed to read entropy source {}: {source}", .path.display())]
    ReadFailed {
        /// Source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The source hit end-of-file before the requested length.
    #[error("short read from {}: got {got} of {want} bytes", .path.display())]
    ShortRead {
        /// Source path.
        path: PathBuf,
        /// Bytes read before end-of-file.
        got: u64,
        /// Bytes requested.
        want: u64,
    },
}

/// Trait for sources of raw unpredictable bytes.
pub trait EntropySource {
    /// Fills `dest` completely or fails.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Reads exactly `len` bytes, handing them to `sink` in pieces of at
    /// most [`STREAM_CHUNK_BYTES`].
    ///
    /// Memory use does not depend on `len`. A short read reports the
    /// total consumed so far, after `sink` has already seen those bytes.
    fn stream_exact(&mut self, len: u64, sink: &mut dyn FnMut(&[u8])) -> Result<(), EntropyError> {
        let mut buf = [0u8; STREAM_CHUNK_BYTES];
        let mut done: u64 = 0;

        while done < len {
            let want = (len - done).min(STREAM_CHUNK_BYTES as u64) as usize;
            let chunk = &mut buf[..want];
            self.fill(chunk).map_err(|e| match e {
                EntropyError::ShortRead { path, got, .. } => EntropyError::ShortRead {
                    path,
                    got: done + got,
                    want: len,
                },
                other => other,
            })?;
            sink(chunk);
            done += want as u64;
        }

        Ok(())
    }
}

/// A byte source backed by a path: an entropy device or a seed file.
#[derive(Debug)]
pub struct DeviceSource {
    path: PathBuf,
    file: File,
}

impl DeviceSource {
    /// Opens `path` for reading. The file is never written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EntropyError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| EntropyError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(path = %path.display(), "Opened entropy source");
        Ok(Self { path, file })
    }
}

impl EntropySource for DeviceSource {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        let mut filled = 0;

        // Devices may return partial reads; keep going until EOF.
        while filled < dest.len() {
            match self.file.read(&mut dest[filled..]) {
                Ok(0) => {
                    return Err(EntropyError::ShortRead {
                        path: self.path.clone(),
                        got: filled as u64,
                        want: dest.len() as u64,
                    });
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(EntropyError::ReadFailed {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}

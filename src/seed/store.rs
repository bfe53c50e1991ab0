//! Seed selection, loading and persistence.

use super::artifact::{ArtifactKind, SeedArtifact};
use crate::entropy::DeviceSource;
use crate::generator::{GenError, Generator, ReseedError, MIN_SEED_BYTES};
use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Seed file name inside the user's home directory.
pub const SEED_FILE_NAME: &str = ".rand.seed";

/// Mode for a freshly created seed directory (owner rwx, group r-x).
const SEED_DIR_MODE: u32 = 0o750;

/// Mode for the seed file itself.
const SEED_FILE_MODE: u32 = 0o600;

/// Returns `$HOME/.rand.seed`, if a home directory can be determined.
pub fn default_seed_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(SEED_FILE_NAME))
}

/// Why generator state could not be saved.
#[derive(Debug, Error)]
pub enum SaveCause {
    /// The generator had nothing to export.
    #[error(transparent)]
    Export(#[from] GenError),
    /// Writing the seed file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors from loading or saving seed state.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The selected source could not be opened, read in full, or mixed in.
    #[error("failed to load {want} seed bytes from {}: {source}", .path.display())]
    LoadFailed {
        /// Selected source.
        path: PathBuf,
        /// Bytes the selection asked for.
        want: u64,
        /// What went wrong.
        #[source]
        source: ReseedError,
    },
    /// The seed file could not be rewritten.
    #[error("failed to save seed state to {}: {source}", .path.display())]
    SaveFailed {
        /// Seed file path.
        path: PathBuf,
        /// What went wrong.
        #[source]
        source: SaveCause,
    },
}

/// Why the primary seed file was passed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedAnomaly {
    /// Missing, or not both readable and writable. Nothing is deleted.
    Inaccessible,
    /// Not a regular file; deletion was attempted.
    NotRegularFile {
        /// What was found instead.
        kind: ArtifactKind,
        /// Whether the deletion succeeded.
        removed: bool,
    },
    /// Shorter than the minimum; deletion was attempted.
    TooSmall {
        /// Size found on disk.
        byte_length: u64,
        /// Whether the deletion succeeded.
        removed: bool,
    },
}

impl std::fmt::Display for SeedAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedAnomaly::Inaccessible => {
                write!(f, "seed file missing or not both readable and writable")
            }
            SeedAnomaly::NotRegularFile { kind, .. } => {
                write!(f, "seed path is {kind}, expected a regular file")
            }
            SeedAnomaly::TooSmall { byte_length, .. } => {
                write!(
                    f,
                    "seed file is too small ({byte_length} bytes, need {MIN_SEED_BYTES})"
                )
            }
        }
    }
}

/// The byte source chosen to seed the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSelection {
    /// Path to read seed material from.
    pub path: PathBuf,
    /// Number of bytes to read. A seed file may be larger than memory.
    pub read_size: u64,
    /// Set when the primary seed was rejected in favour of the fallback.
    pub anomaly: Option<SeedAnomaly>,
}

impl SeedSelection {
    /// True when the fallback device was selected.
    pub fn is_fallback(&self) -> bool {
        self.anomaly.is_some()
    }
}

/// The persistent seed file and its fallback entropy device.
#[derive(Debug, Clone)]
pub struct SeedStore {
    seed_path: PathBuf,
    fallback_path: PathBuf,
}

impl SeedStore {
    /// Creates a store for `seed_path`, falling back to `fallback_path`.
    pub fn new(seed_path: impl Into<PathBuf>, fallback_path: impl Into<PathBuf>) -> Self {
        Self {
            seed_path: seed_path.into(),
            fallback_path: fallback_path.into(),
        }
    }

    /// Returns the durable seed file path.
    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    /// Returns the fallback entropy device path.
    pub fn fallback_path(&self) -> &Path {
        &self.fallback_path
    }

    /// Chooses the seed source. Never fails.
    ///
    /// A trustworthy seed file is read in full, so a larger file carries
    /// more entropy forward. Otherwise [`MIN_SEED_BYTES`] are read from the
    /// fallback device.
    pub fn select_seed(&self) -> SeedSelection {
        let artifact = SeedArtifact::inspect(&self.seed_path);

        let anomaly = if !artifact.is_read_write() {
            SeedAnomaly::Inaccessible
        } else if artifact.kind() != ArtifactKind::RegularFile {
            SeedAnomaly::NotRegularFile {
                kind: artifact.kind(),
                removed: remove_artifact(&self.seed_path),
            }
        } else if !artifact.is_large_enough() {
            SeedAnomaly::TooSmall {
                byte_length: artifact.byte_length(),
                removed: remove_artifact(&self.seed_path),
            }
        } else {
            let read_size = artifact.byte_length();
            tracing::info!(
                path = %self.seed_path.display(),
                read_size,
                "Using persistent seed file"
            );
            return SeedSelection {
                path: self.seed_path.clone(),
                read_size,
                anomaly: None,
            };
        };

        tracing::warn!(
            seed = %self.seed_path.display(),
            fallback = %self.fallback_path.display(),
            "{anomaly}; falling back to entropy device"
        );

        SeedSelection {
            path: self.fallback_path.clone(),
            read_size: MIN_SEED_BYTES as u64,
            anomaly: Some(anomaly),
        }
    }

    /// Streams exactly `selection.read_size` bytes into `generator`.
    ///
    /// Any failure here is fatal to the run: without seed material the
    /// generator must not produce output.
    pub fn load_seed<G: Generator + ?Sized>(
        &self,
        selection: &SeedSelection,
        generator: &mut G,
    ) -> Result<u64, SeedError> {
        let fail = |source: ReseedError| SeedError::LoadFailed {
            path: selection.path.clone(),
            want: selection.read_size,
            source,
        };

        let mut source = DeviceSource::open(&selection.path).map_err(|e| fail(e.into()))?;
        generator
            .reseed_from(&mut source, selection.read_size)
            .map_err(fail)?;

        tracing::info!(
            bytes = selection.read_size,
            path = %selection.path.display(),
            "Loaded seed material"
        );
        Ok(selection.read_size)
    }

    /// Writes the generator's exported state to the seed file.
    ///
    /// The parent directory is repaired first when missing. A failure is
    /// returned to the caller, which should log it and carry on: output
    /// has already been delivered and only the next run suffers.
    pub fn persist_seed<G: Generator + ?Sized>(&self, generator: &mut G) -> Result<usize, SeedError> {
        let fail = |source: SaveCause| SeedError::SaveFailed {
            path: self.seed_path.clone(),
            source,
        };

        ensure_parent_dir(&self.seed_path);

        let state = generator.export_state().map_err(|e| fail(e.into()))?;
        write_seed_file(&self.seed_path, &state).map_err(|e| fail(e.into()))?;

        tracing::info!(
            bytes = state.len(),
            path = %self.seed_path.display(),
            "Wrote seed state"
        );
        Ok(state.len())
    }
}

/// Deletes a rejected seed artifact. Returns whether it is gone.
fn remove_artifact(path: &Path) -> bool {
    let is_dir = fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    // Never recursive: a non-empty directory stays put.
    let result = if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed rejected seed artifact");
            true
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove rejected seed artifact"
            );
            false
        }
    }
}

/// Creates the seed file's parent directory if it does not exist.
fn ensure_parent_dir(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };

    match fs::read_dir(parent) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            match DirBuilder::new().mode(SEED_DIR_MODE).create(parent) {
                Ok(()) => {
                    tracing::info!(dir = %parent.display(), "Created seed directory");
                }
                Err(e) => {
                    tracing::warn!(
                        dir = %parent.display(),
                        error = %e,
                        "Failed to create seed directory"
                    );
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                dir = %parent.display(),
                error = %e,
                "Failed to open seed directory"
            );
        }
    }
}

fn write_seed_file(path: &Path, state: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(SEED_FILE_MODE)
        .open(path)?;
    file.write_all(state)?;
    file.sync_all()?;

    // An existing file keeps its old mode on open; tighten it.
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(SEED_FILE_MODE)) {
        tracing::debug!(path = %path.display(), error = %e, "Failed to restrict seed file mode");
    }
    Ok(())
}

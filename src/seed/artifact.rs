//! On-disk seed artifact inspection.

use crate::generator::MIN_SEED_BYTES;
use nix::unistd::AccessFlags;
use std::fs;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

/// What kind of filesystem object a seed path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A plain file.
    RegularFile,
    /// A character or block device.
    Device,
    /// Nothing exists at the path.
    Missing,
    /// A directory, symlink, socket, FIFO, or an unreadable entry.
    Invalid,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::RegularFile => "regular file",
            ArtifactKind::Device => "device",
            ArtifactKind::Missing => "missing",
            ArtifactKind::Invalid => "not a regular file",
        };
        f.write_str(name)
    }
}

/// What the calling process may do with a seed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessBits {
    /// The effective user may read.
    pub readable: bool,
    /// The effective user may write.
    pub writable: bool,
}

impl AccessBits {
    /// Asks the kernel, via `access(2)`, for the caller's rights on `path`.
    ///
    /// Ownership, group membership and root's override all count, exactly
    /// as they would for a later `open`. A missing path has no rights.
    pub fn for_caller(path: &Path) -> Self {
        Self {
            readable: nix::unistd::access(path, AccessFlags::R_OK).is_ok(),
            writable: nix::unistd::access(path, AccessFlags::W_OK).is_ok(),
        }
    }
}

/// A snapshot of one seed path on disk.
///
/// The kind comes from `lstat` (a symlink is never a regular file);
/// the access bits come from `access(2)`, which follows symlinks.
#[derive(Debug, Clone)]
pub struct SeedArtifact {
    path: PathBuf,
    byte_length: u64,
    kind: ArtifactKind,
    access: AccessBits,
}

impl SeedArtifact {
    /// Inspects `path` without modifying it.
    pub fn inspect(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let (kind, byte_length) = match fs::symlink_metadata(&path) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let kind = if file_type.is_file() {
                    ArtifactKind::RegularFile
                } else if file_type.is_char_device() || file_type.is_block_device() {
                    ArtifactKind::Device
                } else {
                    ArtifactKind::Invalid
                };
                (kind, meta.len())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => (ArtifactKind::Missing, 0),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "lstat on seed path failed");
                (ArtifactKind::Invalid, 0)
            }
        };

        let access = AccessBits::for_caller(&path);

        Self {
            path,
            byte_length,
            kind,
            access,
        }
    }

    /// Returns the inspected path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the size in bytes reported by `lstat`.
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// Returns the kind of object at the path.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Returns the caller's access rights.
    pub fn access(&self) -> AccessBits {
        self.access
    }

    /// True when the seed can be both read now and rewritten later.
    pub fn is_read_write(&self) -> bool {
        self.access.readable && self.access.writable
    }

    /// True when the artifact holds at least [`MIN_SEED_BYTES`].
    pub fn is_large_enough(&self) -> bool {
        self.byte_length >= MIN_SEED_BYTES as u64
    }
}

//! Request and runtime configuration.
//!
//! [`RequestArgs`] is built once from the command line and never changes
//! afterwards. [`FileConfig`] is the optional TOML file; [`RunConfig`] is
//! the merged result the binary hands to the core.

use crate::entropy::DEFAULT_ENTROPY_DEVICE;
use crate::generator::HashAlgorithm;
use crate::seed::default_seed_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest number of bytes a single request may ask for.
pub const MAX_BYTES: usize = 1024;

/// How drawn bytes are written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Bytes as-is, no trailing newline.
    #[default]
    Raw,
    /// Lowercase hex, two digits per byte, followed by a newline.
    Hex,
}

/// A validated request. Fields are read-only once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestArgs {
    byte_count: usize,
    format: OutputFormat,
    verbose: bool,
}

impl RequestArgs {
    /// Validates `byte_count` against `1..=MAX_BYTES`.
    pub fn new(byte_count: usize, format: OutputFormat, verbose: bool) -> Result<Self, ConfigError> {
        if byte_count == 0 || byte_count > MAX_BYTES {
            return Err(ConfigError::InvalidByteCount(byte_count));
        }
        Ok(Self {
            byte_count,
            format,
            verbose,
        })
    }

    /// Number of bytes to draw.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// Output encoding.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether progress diagnostics were requested.
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Byte count outside `1..=MAX_BYTES`.
    #[error("'bytes' must be between 1 and 1024, got {0}")]
    InvalidByteCount(usize),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for [`FileConfig`].
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    /// No seed path was given and `$HOME` is unknown.
    #[error("no home directory found; pass --seed-file or set seed.path")]
    NoHomeDirectory,
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[seed]` table.
    #[serde(default)]
    pub seed: SeedConfig,
    /// `[entropy]` table.
    #[serde(default)]
    pub entropy: EntropyConfig,
    /// `[generator]` table.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Seed file settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedConfig {
    /// Seed file location; `$HOME/.rand.seed` when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Fallback entropy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyConfig {
    /// Blocking entropy device read when the seed file is unusable.
    pub device: PathBuf,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_ENTROPY_DEVICE),
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratorConfig {
    /// Hash used to mix seed material into the generator key.
    #[serde(default)]
    pub hash: HashAlgorithm,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        content.parse()
    }
}

impl std::str::FromStr for FileConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Everything the binary needs for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The validated request.
    pub request: RequestArgs,
    /// Durable seed file.
    pub seed_path: PathBuf,
    /// Fallback entropy device.
    pub entropy_device: PathBuf,
    /// Reseed mixing hash.
    pub hash: HashAlgorithm,
}

impl RunConfig {
    /// Merges a file config with command-line overrides. Overrides win.
    pub fn resolve(
        request: RequestArgs,
        file: FileConfig,
        seed_override: Option<PathBuf>,
        device_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let seed_path = match seed_override.or(file.seed.path) {
            Some(path) => path,
            None => default_seed_path().ok_or(ConfigError::NoHomeDirectory)?,
        };

        Ok(Self {
            request,
            seed_path,
            entropy_device: device_override.unwrap_or(file.entropy.device),
            hash: file.generator.hash,
        })
    }
}

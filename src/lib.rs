//! Seeded Random Byte Library
//!
//! Produces cryptographically strong random bytes from a generator whose
//! state is carried between runs in a seed file. Each run loads the seed
//! file (or the system entropy device when the file cannot be trusted),
//! draws the requested bytes, and writes fresh state back for next time.
//!
//! # Architecture
//!
//! ```text
//! entropy ─┐
//!          ├→ seed (select, load, persist) → lifecycle → output
//! generator┘
//! ```
//!
//! # Design Principles
//!
//! - **Fail-closed**: no output unless real seed material was loaded
//! - **Best-effort housekeeping**: deleting bad seeds, creating the seed
//!   directory and saving state never fail the run
//! - **Uses standard primitives**: ChaCha20 output, BLAKE3/SHA-256 mixing
//! - **No locking**: concurrent runs may race on the seed file
//!
//! # Example
//!
//! ```no_run
//! use seeded_rand::{
//!     config::{OutputFormat, RequestArgs},
//!     generator::{ChaChaGenerator, HashAlgorithm},
//!     lifecycle::SeedLifecycle,
//!     output::write_output,
//!     seed::{default_seed_path, SeedStore},
//! };
//!
//! let request = RequestArgs::new(16, OutputFormat::Hex, false).unwrap();
//! let store = SeedStore::new(default_seed_path().unwrap(), "/dev/random");
//! let generator = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
//! let mut lifecycle = SeedLifecycle::new(store, generator);
//!
//! let mut stdout = std::io::stdout();
//! lifecycle
//!     .run(&request, |bytes| write_output(&mut stdout, bytes, request.format()))
//!     .unwrap();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod entropy;
pub mod generator;
pub mod lifecycle;
pub mod output;
pub mod seed;

// Re-export commonly used types at crate root
pub use config::{OutputFormat, RequestArgs, RunConfig};
pub use entropy::{DeviceSource, EntropySource};
pub use generator::{
    ChaChaGenerator, Generator, HashAlgorithm, OutputBuffer, ReseedError, MIN_SEED_BYTES,
};
pub use lifecycle::{LifecycleError, LifecycleState, SeedLifecycle};
pub use seed::{SeedSelection, SeedStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Persistent seed custody.
//!
//! This module decides whether the seed file on disk can be trusted,
//! falls back to the entropy device when it cannot, loads the chosen
//! material into a generator, and writes the generator's state back out
//! for the next run.
//!
//! # Selection Rules
//!
//! The seed file is used only when it is:
//! - readable and writable by the caller, as `access(2)` reports it
//!   (otherwise the next run could not be refreshed)
//! - a regular file (the entropy device is exempt)
//! - at least [`MIN_SEED_BYTES`](crate::generator::MIN_SEED_BYTES) long
//!
//! A file that fails the last two checks is deleted best-effort. All
//! housekeeping failures are logged and never abort the run.

mod artifact;
mod store;

pub use artifact::{AccessBits, ArtifactKind, SeedArtifact};
pub use store::{
    default_seed_path, SaveCause, SeedAnomaly, SeedError, SeedSelection, SeedStore,
    SEED_FILE_NAME,
};

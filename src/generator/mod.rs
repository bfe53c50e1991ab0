//! Cryptographic byte generator capability.
//!
//! The lifecycle manager only sees the [`Generator`] trait: seed material
//! goes in through `reseed` (or `reseed_from` when it is streamed from a
//! file), output comes out through `draw`, and the state to persist comes
//! out through `export_state`. [`ChaChaGenerator`]
//! is the production implementation.

mod buffer;
mod chacha;
mod mixing;

pub use buffer::OutputBuffer;
pub use chacha::{ChaChaGenerator, SEED_FILE_BYTES};
pub use mixing::HashAlgorithm;

use crate::entropy::{EntropyError, EntropySource};
use thiserror::Error;

/// Minimum seed material, in bytes, before a generator may produce output.
pub const MIN_SEED_BYTES: usize = 32;

/// Errors reported by a generator.
#[derive(Debug, Error)]
pub enum GenError {
    /// Not all of the supplied material was mixed in. Empty material
    /// always fails this way.
    #[error("reseed consumed {consumed} of {supplied} bytes")]
    ReseedFailed {
        /// Bytes actually mixed in.
        consumed: usize,
        /// Bytes offered.
        supplied: usize,
    },
    /// Output was requested before enough seed material arrived.
    #[error("draw of {requested} bytes failed: {seeded} of {required} seed bytes loaded")]
    DrawFailed {
        /// Bytes asked for.
        requested: usize,
        /// Seed bytes loaded so far.
        seeded: usize,
        /// Seed bytes needed before drawing.
        required: usize,
    },
    /// There is no state worth saving yet.
    #[error("generator state cannot be exported before it is seeded")]
    Unseeded,
}

/// Errors from a streamed reseed.
#[derive(Debug, Error)]
pub enum ReseedError {
    /// The material could not be read in full.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    /// The generator rejected the material.
    #[error(transparent)]
    Generator(#[from] GenError),
}

/// Seed-in, bytes-out, state-out capability.
pub trait Generator {
    /// Mixes `material` into the internal state.
    fn reseed(&mut self, material: &[u8]) -> Result<(), GenError>;

    /// Mixes exactly `len` bytes read from `source` into the internal state.
    ///
    /// State changes only after all `len` bytes have arrived. This default
    /// buffers the material and calls [`Generator::reseed`]; generators
    /// with an incremental mixer should stream instead.
    fn reseed_from(&mut self, source: &mut dyn EntropySource, len: u64) -> Result<(), ReseedError> {
        let mut material = Vec::new();
        source.stream_exact(len, &mut |chunk: &[u8]| material.extend_from_slice(chunk))?;
        self.reseed(&material)?;
        Ok(())
    }

    /// Produces exactly `count` bytes, or nothing at all.
    fn draw(&mut self, count: usize) -> Result<OutputBuffer, GenError>;

    /// Serializes state into the canonical seed-file representation.
    fn export_state(&mut self) -> Result<Vec<u8>, GenError>;
}

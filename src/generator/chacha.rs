//! ChaCha20-based generator with hash-mixed reseeding.
//!
//! # Reseeding Model
//!
//! Reseeding hashes together:
//! - A domain separator and reseed counter
//! - The previous key material (retained across reseeds)
//! - The new seed material
//!
//! The hash output becomes the new ChaCha20 key. Every draw ratchets the
//! key forward, so a captured state does not reveal earlier output.
//!
//! The initial key comes from the operating system. That material keeps
//! two runs from agreeing even when both load the same stale seed file,
//! but it does not count toward the seeding requirement: output is only
//! produced after [`MIN_SEED_BYTES`] of explicit seed material arrive.

use super::mixing::Mixer;
use super::{GenError, Generator, HashAlgorithm, OutputBuffer, ReseedError, MIN_SEED_BYTES};
use crate::entropy::EntropySource;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

/// Domain separator for reseed mixing.
const RESEED_DOMAIN: &[u8] = b"seeded-rand-reseed-v1";

/// Domain separator for the post-draw key ratchet.
const RATCHET_DOMAIN: &[u8] = b"seeded-rand-ratchet-v1";

/// Length of the exported seed file.
pub const SEED_FILE_BYTES: usize = 1024;

/// A reseedable generator backed by ChaCha20.
pub struct ChaChaGenerator {
    /// The underlying ChaCha20 CSPRNG.
    inner: ChaCha20Rng,
    /// Retained key material for mixing during reseed.
    key_material: [u8; 32],
    /// Hash used for reseed and ratchet mixing.
    algorithm: HashAlgorithm,
    /// Explicit seed bytes mixed in so far.
    seeded_bytes: usize,
    /// Total reseeds performed.
    reseed_count: u64,
    /// Bytes generated since last reseed.
    bytes_since_reseed: u64,
}

impl ChaChaGenerator {
    /// Creates a generator keyed from the OS entropy source.
    ///
    /// The generator still refuses to draw until it has been reseeded.
    pub fn from_os_entropy(algorithm: HashAlgorithm) -> Self {
        let mut key_material = [0u8; 32];
        OsRng.fill_bytes(&mut key_material);
        Self::with_key(key_material, algorithm)
    }

    /// Creates a generator from a known key (for testing only).
    #[cfg(test)]
    pub(crate) fn from_seed_for_testing(key: [u8; 32], algorithm: HashAlgorithm) -> Self {
        Self::with_key(key, algorithm)
    }

    fn with_key(key_material: [u8; 32], algorithm: HashAlgorithm) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(key_material),
            key_material,
            algorithm,
            seeded_bytes: 0,
            reseed_count: 0,
            bytes_since_reseed: 0,
        }
    }

    /// Returns the number of reseeds performed.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_count
    }

    /// Returns bytes generated since last reseed.
    pub fn bytes_since_reseed(&self) -> u64 {
        self.bytes_since_reseed
    }

    /// Returns the explicit seed bytes mixed in so far.
    pub fn seeded_bytes(&self) -> usize {
        self.seeded_bytes
    }

    /// Returns true once enough seed material has been loaded to draw.
    pub fn is_seeded(&self) -> bool {
        self.seeded_bytes >= MIN_SEED_BYTES
    }

    /// Replaces the key with `key` and restarts the stream.
    fn rekey(&mut self, key: [u8; 32]) {
        self.key_material = key;
        self.inner = ChaCha20Rng::from_seed(key);
    }

    /// Starts a reseed hash: H(domain || counter || old_key || ...).
    fn reseed_mixer(&self) -> Mixer {
        let mut mixer = self.algorithm.mixer();
        mixer.update(RESEED_DOMAIN);
        mixer.update(&self.reseed_count.to_le_bytes());
        mixer.update(&self.key_material);
        mixer
    }

    /// Installs a finished reseed key and accounts for `material_len` bytes.
    fn complete_reseed(&mut self, mixer: Mixer, material_len: u64) {
        self.rekey(mixer.finalize());
        let added = usize::try_from(material_len).unwrap_or(usize::MAX);
        self.seeded_bytes = self.seeded_bytes.saturating_add(added);
        self.reseed_count += 1;
        self.bytes_since_reseed = 0;

        tracing::debug!(
            reseed_count = self.reseed_count,
            material_bytes = material_len,
            seeded_bytes = self.seeded_bytes,
            algorithm = ?self.algorithm,
            "Generator reseeded"
        );
    }

    /// Ratchets the key forward using fresh stream output.
    fn ratchet(&mut self) {
        let mut next = [0u8; 32];
        self.inner.fill_bytes(&mut next);
        let key = self
            .algorithm
            .mix(&[RATCHET_DOMAIN, &self.key_material, &next]);
        self.rekey(key);
    }
}

impl Generator for ChaChaGenerator {
    fn reseed(&mut self, material: &[u8]) -> Result<(), GenError> {
        if material.is_empty() {
            return Err(GenError::ReseedFailed {
                consumed: 0,
                supplied: 0,
            });
        }

        let mut mixer = self.reseed_mixer();
        mixer.update(material);
        self.complete_reseed(mixer, material.len() as u64);
        Ok(())
    }

    fn reseed_from(&mut self, source: &mut dyn EntropySource, len: u64) -> Result<(), ReseedError> {
        if len == 0 {
            return Err(GenError::ReseedFailed {
                consumed: 0,
                supplied: 0,
            }
            .into());
        }

        // Nothing is installed until the whole stream has been hashed.
        let mut mixer = self.reseed_mixer();
        source.stream_exact(len, &mut |chunk: &[u8]| mixer.update(chunk))?;
        self.complete_reseed(mixer, len);
        Ok(())
    }

    fn draw(&mut self, count: usize) -> Result<OutputBuffer, GenError> {
        if !self.is_seeded() {
            return Err(GenError::DrawFailed {
                requested: count,
                seeded: self.seeded_bytes,
                required: MIN_SEED_BYTES,
            });
        }

        let mut bytes = vec![0u8; count];
        self.inner.fill_bytes(&mut bytes);
        self.bytes_since_reseed += count as u64;
        self.ratchet();

        tracing::trace!(count, "Drew generator output");
        Ok(OutputBuffer::from_filled(bytes))
    }

    fn export_state(&mut self) -> Result<Vec<u8>, GenError> {
        if !self.is_seeded() {
            return Err(GenError::Unseeded);
        }
        Ok(self.draw(SEED_FILE_BYTES)?.into_vec())
    }
}

impl std::fmt::Debug for ChaChaGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaChaGenerator")
            .field("algorithm", &self.algorithm)
            .field("seeded_bytes", &self.seeded_bytes)
            .field("reseed_count", &self.reseed_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{EntropyError, STREAM_CHUNK_BYTES};
    use std::path::PathBuf;

    /// In-memory byte source that runs dry at the end of its slice.
    struct SliceSource<'a>(&'a [u8]);

    impl EntropySource for SliceSource<'_> {
        fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
            if dest.len() > self.0.len() {
                return Err(EntropyError::ShortRead {
                    path: PathBuf::from("<memory>"),
                    got: self.0.len() as u64,
                    want: dest.len() as u64,
                });
            }
            let (head, tail) = self.0.split_at(dest.len());
            dest.copy_from_slice(head);
            self.0 = tail;
            Ok(())
        }
    }

    fn seeded(key: [u8; 32]) -> ChaChaGenerator {
        let mut rng = ChaChaGenerator::from_seed_for_testing(key, HashAlgorithm::Blake3);
        rng.reseed(&[0x5Au8; MIN_SEED_BYTES]).unwrap();
        rng
    }

    #[test]
    fn test_reseed_increments_count() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
        assert_eq!(rng.reseed_count(), 0);

        rng.reseed(&[0x42u8; 32]).unwrap();

        assert_eq!(rng.reseed_count(), 1);
        assert_eq!(rng.seeded_bytes(), 32);
    }

    #[test]
    fn test_draw_before_seeding_fails() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);

        assert!(matches!(
            rng.draw(16),
            Err(GenError::DrawFailed {
                requested: 16,
                seeded: 0,
                required: MIN_SEED_BYTES
            })
        ));
    }

    #[test]
    fn test_partial_seed_still_refuses_draw() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
        rng.reseed(&[0x11u8; 16]).unwrap();
        assert!(rng.draw(1).is_err());

        rng.reseed(&[0x22u8; 16]).unwrap();
        assert!(rng.draw(1).is_ok());
    }

    #[test]
    fn test_draw_returns_exact_count() {
        let mut rng = seeded([0x01; 32]);
        for count in [1, 31, 64, 1024] {
            assert_eq!(rng.draw(count).unwrap().len(), count);
        }
    }

    #[test]
    fn test_bytes_since_reseed_tracking() {
        let mut rng = seeded([0x01; 32]);
        rng.draw(100).unwrap();
        assert_eq!(rng.bytes_since_reseed(), 100);

        rng.reseed(&[0x33; 32]).unwrap();
        assert_eq!(rng.bytes_since_reseed(), 0);
    }

    #[test]
    fn test_consecutive_draws_differ() {
        let mut rng = seeded([0x01; 32]);
        let first = rng.draw(32).unwrap();
        let second = rng.draw(32).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_reseed_changes_output() {
        let mut rng1 = seeded([0x01; 32]);
        let mut rng2 = seeded([0x01; 32]);

        // Before reseed: same output
        assert_eq!(rng1.draw(32).unwrap(), rng2.draw(32).unwrap());

        // Reseed rng1 only
        rng1.reseed(&[0xAB; 32]).unwrap();

        // After reseed: different output
        assert_ne!(rng1.draw(32).unwrap(), rng2.draw(32).unwrap());
    }

    #[test]
    fn test_different_material_different_result() {
        let mut rng1 = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);
        let mut rng2 = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);

        rng1.reseed(&[0xAA; 32]).unwrap();
        rng2.reseed(&[0xBB; 32]).unwrap();

        assert_ne!(rng1.draw(32).unwrap(), rng2.draw(32).unwrap());
    }

    #[test]
    fn test_reseed_history_affects_output() {
        // Same total material, split across two reseeds, must not collide
        let mut rng1 = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);
        let mut rng2 = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);

        rng1.reseed(&[0xAA; 32]).unwrap();
        rng1.reseed(&[0xAA; 32]).unwrap();

        rng2.reseed(&[0xAA; 64]).unwrap();

        assert_eq!(rng1.seeded_bytes(), rng2.seeded_bytes());
        assert_ne!(rng1.draw(32).unwrap(), rng2.draw(32).unwrap());
    }

    #[test]
    fn test_empty_reseed_fails_and_changes_nothing() {
        let mut rng = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);
        let mut untouched = ChaChaGenerator::from_seed_for_testing([0x01; 32], HashAlgorithm::Blake3);

        assert!(matches!(
            rng.reseed(&[]),
            Err(GenError::ReseedFailed {
                consumed: 0,
                supplied: 0
            })
        ));
        assert_eq!(rng.reseed_count(), 0);
        assert_eq!(rng.seeded_bytes(), 0);

        rng.reseed(&[0x42; 32]).unwrap();
        untouched.reseed(&[0x42; 32]).unwrap();
        assert_eq!(rng.draw(32).unwrap(), untouched.draw(32).unwrap());
    }

    #[test]
    fn test_empty_stream_reseed_fails() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
        let mut source = SliceSource(&[]);

        assert!(matches!(
            rng.reseed_from(&mut source, 0),
            Err(ReseedError::Generator(GenError::ReseedFailed { .. }))
        ));
        assert_eq!(rng.reseed_count(), 0);
    }

    #[test]
    fn test_streamed_reseed_matches_buffered() {
        let material: Vec<u8> = (0..(STREAM_CHUNK_BYTES * 2 + 17))
            .map(|i| (i * 7 % 256) as u8)
            .collect();

        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
            let mut buffered = ChaChaGenerator::from_seed_for_testing([0x03; 32], algorithm);
            let mut streamed = ChaChaGenerator::from_seed_for_testing([0x03; 32], algorithm);

            buffered.reseed(&material).unwrap();
            streamed
                .reseed_from(&mut SliceSource(&material), material.len() as u64)
                .unwrap();

            assert_eq!(streamed.seeded_bytes(), material.len());
            assert_eq!(buffered.draw(64).unwrap(), streamed.draw(64).unwrap());
        }
    }

    #[test]
    fn test_short_stream_leaves_generator_unseeded() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
        let material = [0x55u8; 40];

        let err = rng
            .reseed_from(&mut SliceSource(&material), 64)
            .unwrap_err();

        assert!(matches!(
            err,
            ReseedError::Entropy(EntropyError::ShortRead { got: 40, want: 64, .. })
        ));
        assert_eq!(rng.reseed_count(), 0);
        assert!(!rng.is_seeded());
    }

    #[test]
    fn test_hash_algorithm_changes_output() {
        let mut blake = ChaChaGenerator::from_seed_for_testing([0x07; 32], HashAlgorithm::Blake3);
        let mut sha = ChaChaGenerator::from_seed_for_testing([0x07; 32], HashAlgorithm::Sha256);

        blake.reseed(&[0x99; 32]).unwrap();
        sha.reseed(&[0x99; 32]).unwrap();

        assert_ne!(blake.draw(32).unwrap(), sha.draw(32).unwrap());
    }

    #[test]
    fn test_os_keyed_generators_diverge_on_same_seed() {
        let mut rng1 = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);
        let mut rng2 = ChaChaGenerator::from_os_entropy(HashAlgorithm::Blake3);

        rng1.reseed(&[0x42; 64]).unwrap();
        rng2.reseed(&[0x42; 64]).unwrap();

        assert_ne!(rng1.draw(32).unwrap(), rng2.draw(32).unwrap());
    }

    #[test]
    fn test_export_state_length() {
        let mut rng = seeded([0x01; 32]);
        assert_eq!(rng.export_state().unwrap().len(), SEED_FILE_BYTES);
    }

    #[test]
    fn test_export_requires_seeding() {
        let mut rng = ChaChaGenerator::from_os_entropy(HashAlgorithm::Sha256);
        assert!(matches!(rng.export_state(), Err(GenError::Unseeded)));
    }
}

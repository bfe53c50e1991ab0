//! Hash-based state mixing.

use blake3::Hasher as Blake3Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Supported hash algorithms for reseed mixing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 - fast, secure, recommended default.
    #[default]
    Blake3,
    /// SHA-256 - widely deployed, conservative choice.
    Sha256,
}

impl HashAlgorithm {
    /// Starts an incremental hash.
    pub(crate) fn mixer(self) -> Mixer {
        match self {
            HashAlgorithm::Blake3 => Mixer::Blake3(Box::new(Blake3Hasher::new())),
            HashAlgorithm::Sha256 => Mixer::Sha256(Sha256::new()),
        }
    }

    /// Hashes the concatenation of `parts` into 32 bytes of key material.
    pub(crate) fn mix(self, parts: &[&[u8]]) -> [u8; 32] {
        let mut mixer = self.mixer();
        for part in parts {
            mixer.update(part);
        }
        mixer.finalize()
    }
}

/// An in-progress hash. Feeding data in pieces gives the same key as
/// feeding it all at once.
pub(crate) enum Mixer {
    Blake3(Box<Blake3Hasher>),
    Sha256(Sha256),
}

impl Mixer {
    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Mixer::Blake3(hasher) => {
                hasher.update(data);
            }
            Mixer::Sha256(hasher) => hasher.update(data),
        }
    }

    pub(crate) fn finalize(self) -> [u8; 32] {
        match self {
            Mixer::Blake3(hasher) => *hasher.finalize().as_bytes(),
            Mixer::Sha256(hasher) => {
                let result = hasher.finalize();
                let mut data = [0u8; 32];
                data.copy_from_slice(&result);
                data
            }
        }
    }
}

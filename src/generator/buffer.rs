//! Fixed-size output buffer.

/// Bytes produced by a single draw.
///
/// The length is fixed at construction and the contents are written
/// exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    bytes: Box<[u8]>,
}

impl OutputBuffer {
    /// Wraps an already filled byte vector.
    pub(crate) fn from_filled(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Returns the drawn bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the number of bytes drawn.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the buffer holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex encoding, two digits per byte.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Consumes the buffer, returning the bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into_vec()
    }
}

impl std::fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBuffer")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

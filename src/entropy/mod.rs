//! Raw entropy input.
//!
//! This module provides a small abstraction over blocking byte sources:
//! the system entropy device and, through the same interface, a seed file
//! on disk. Reads block until the requested length is available; an
//! exhausted device is allowed to stall the caller.

mod source;

pub use source::{
    DeviceSource, EntropyError, EntropySource, DEFAULT_ENTROPY_DEVICE, STREAM_CHUNK_BYTES,
};

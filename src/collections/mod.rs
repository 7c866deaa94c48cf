//! Fixed-capacity containers shared by the ingestion components.

/// Overwrite-oldest ring buffer.
pub mod ring;

pub use ring::RingBuffer;

//! A network abstraction layer for embedded systems
//!
//! The ingestion layer never owns a socket. It talks to the firmware's transport
//! through the small set of traits below: a connector that opens connections,
//! a link status probe, and a connection that can report how many bytes are
//! ready, read them, write a request and close.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Protocol-specific client implementations
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Available, Close, Connect, Connection, Link, Read, Write};
}

// Core synchronous traits
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    ///
    /// Returns `Ok(0)` once the peer has closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// Non-blocking probe of the receive side.
pub trait Available {
    /// Number of bytes that can be read right now without blocking.
    fn available(&mut self) -> usize;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close + Available {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote` (`host:port`)
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Status of the underlying network link (WiFi association, etc.).
pub trait Link {
    /// `false` while the device has no usable network.
    fn is_connected(&self) -> bool;
}

//! HTTP/1.1 client for streaming JSON responses on embedded systems.
//!
//! The client never holds a response in memory. It writes a GET request from
//! a fixed-size buffer, reads the status line, skips the headers line by line
//! and hands the body to a [`json::Scanner`](crate::json::Scanner) byte by
//! byte. Chunked bodies are decoded on the way. Waiting on the socket is a
//! capped busy-wait described by a [`RetryPolicy`], so a dead peer costs at
//! most [`RetryPolicy::budget_ms`] per wait.
//!
//! # Usage
//!
//! [`get_json`] runs a whole exchange against any [`Connect`](crate::network::Connect)
//! implementation:
//!
//! ```rust,no_run
//! use libatmoscan::json::{Handler, Path, RawValue};
//! use libatmoscan::network::application::http::{get_json, RetryPolicy};
//! # use libatmoscan::network::{Available, Close, Connect, Connection, Read, Write};
//! # use libatmoscan::system::Delay;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl Available for MockConnection { fn available(&mut self) -> usize { 0 } }
//! # impl Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<MockConnection, ()> { Ok(MockConnection) }
//! # }
//! # struct NoDelay;
//! # impl Delay for NoDelay { fn delay_ms(&mut self, _ms: u32) {} }
//!
//! struct Status(bool);
//! impl Handler for Status {
//!     fn key_value(&mut self, path: &Path<'_>, value: RawValue<'_>) {
//!         if path.key == "status" {
//!             self.0 = value.as_str() == "OK";
//!         }
//!     }
//! }
//!
//! let mut status = Status(false);
//! let result = get_json(
//!     &mut MockNetwork,
//!     &mut NoDelay,
//!     "api.timezonedb.com:80",
//!     "/v2/get-time-zone?format=json",
//!     "ATMOSCAN",
//!     &RetryPolicy::default(),
//!     &mut status,
//! );
//! ```

/// HTTP client implementation and supporting types.
///
/// Contains the main [`Client`](client::Client) struct, request building and
/// the response streaming helpers.
pub mod client;

/// Chunked transfer decoding.
pub mod chunked;

pub use chunked::ChunkDecoder;
pub use client::{Client, Header, Request, RetryPolicy, get_json};

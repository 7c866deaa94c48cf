//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) clients built on the core network traits.
//! Every data source the device reads (traffic feed, geolocation, timezone
//! and place-name services) is a plain HTTP GET answered with JSON, so the
//! only protocol here is [`http`].
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connection`](crate::network::Connection)
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Streaming**: Bodies are consumed as they arrive, never buffered whole

/// HTTP client implementation.
///
/// Provides a small HTTP/1.1 client that streams JSON bodies into a
/// [`Handler`](crate::json::Handler).
pub mod http;

//! # libatmoscan - bounded-memory data ingestion for connected sensor devices
//!
//! A `no_std` library for devices with tens of kilobytes of RAM that still need
//! to read live HTTP feeds. Nothing here buffers a whole response or grows a
//! collection: JSON bodies are consumed one byte at a time into fixed-capacity
//! structures, and every capacity is a const generic.
//!
//! ## Features
//!
//! ### Streaming JSON
//! - **[`json::Scanner`]**: byte-at-a-time scanner emitting structural events
//! - **[`json::Handler`]**: consumer contract with key/parent context per value
//! - **[`json::FieldRule`]**: static `(parent, key) → setter` field tables
//!
//! ### Feed consumers
//! - **[`tracking::TrafficTable`]**: fixed table of tracked aircraft with
//!   per-entity position trails, capacity guards and stale-record rollback
//! - **[`geo`]**: coordinate fix, timezone and place-name lookups driven by a
//!   resumable three-step acquisition state machine
//!
//! ### Support
//! - **[`collections::RingBuffer`]**: overwrite-oldest circular buffer
//! - **[`chart::LogChart`]**: rolling linear/log chart samples
//! - **[`system::ErrorLog`]**: rolling user-visible error log
//! - **[`network`]**: transport traits and a streaming HTTP/1.1 client
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libatmoscan = "0.1.0"
//! ```
//!
//! ### Consuming a feed
//!
//! ```rust
//! use libatmoscan::json::Scanner;
//! use libatmoscan::tracking::TrafficTable;
//!
//! let body = br#"{"acList":[
//!     {"Id":4195,"Call":"SWR123","Alt":5000,"Dst":6.23,"Cos":[47.1,8.5,0,4800,47.2,8.6,0,5000]},
//!     {"Id":4196,"Call":"EZY45","PosStale":true,"Trt":2}
//! ]}"#;
//!
//! let mut scanner: Scanner = Scanner::new();
//! let mut table: TrafficTable = TrafficTable::new();
//! scanner.feed_slice(body, &mut table).unwrap();
//!
//! assert_eq!(table.record_count(), 1); // the stale one was rolled back
//! assert_eq!(table.record_at(0).unwrap().label.as_str(), "SWR123");
//! assert_eq!(table.trail_at(0).unwrap().points[0].altitude, 5000); // newest first
//! ```
//!
//! ### Acquiring a location
//!
//! ```rust,no_run
//! use libatmoscan::config::Config;
//! use libatmoscan::geo::{Acquisition, GeoContext, HttpLookup};
//! use libatmoscan::system::{ErrorLog, Schedule};
//! # use libatmoscan::geo::{AccessPoint, WifiScan};
//! # use libatmoscan::network::{Available, Close, Connect, Connection, Link, Read, Write};
//! # use libatmoscan::system::{Clock, Delay};
//! # struct Socket;
//! # impl Connection for Socket {}
//! # impl Available for Socket { fn available(&mut self) -> usize { 0 } }
//! # impl Read for Socket {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Socket {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for Socket {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Wifi;
//! # impl Connect for Wifi {
//! #     type Connection = Socket;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Socket, ()> { Ok(Socket) }
//! # }
//! # impl Link for Wifi { fn is_connected(&self) -> bool { true } }
//! # impl WifiScan for Wifi {
//! #     fn scan(&mut self, _out: &mut heapless::Vec<AccessPoint, 8>) {}
//! # }
//! # struct Sleep;
//! # impl Delay for Sleep { fn delay_ms(&mut self, _ms: u32) {} }
//! # struct Rtc;
//! # impl Clock for Rtc { fn now_ms(&self) -> u64 { 0 } }
//!
//! let config = Config::default();
//! let mut acquisition = Acquisition::from_config(&config);
//! let mut service = HttpLookup::new(Wifi, Sleep, Wifi, config);
//! let mut location = GeoContext::new();
//! let mut errors: ErrorLog = ErrorLog::new();
//!
//! // Called by the cooperative scheduler:
//! match acquisition.tick(&mut service, &mut location, &mut errors, &Rtc) {
//!     Schedule::After(ms) => { /* run again in `ms` */ }
//!     Schedule::Disable => { /* location, timezone and place are known */ }
//! }
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, Xtensa, etc.)
//! - Linux-based devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` library
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting of error types for embedded debugging

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_debug_implementations)]
#![doc(html_root_url = "https://docs.rs/libatmoscan/")]

/// Network abstraction layer: transport traits and the streaming HTTP client.
pub mod network;

/// System seams to the cooperative scheduler, plus the rolling error log.
pub mod system;

/// Fixed-capacity containers.
pub mod collections;

/// Single-pass JSON event stream.
pub mod json;

/// Traffic feed ingestion into a bounded entity table.
pub mod tracking;

/// Location, timezone and place-name acquisition.
pub mod geo;

/// Rolling chart sample store.
pub mod chart;

/// Capacities and runtime settings.
pub mod config;

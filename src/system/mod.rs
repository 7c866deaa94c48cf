//! System services the ingestion layer borrows from the firmware.
//!
//! The device runs a single cooperative scheduler. Units of work are invoked
//! periodically, must return promptly and tell the scheduler when they want
//! to run again. This module holds the small seams to that environment:
//!
//! - **[`Clock`]**: monotonic milliseconds that stamp failures and due times
//! - **[`Delay`]**: a blocking sleep used by the capped busy-wait on sockets
//! - **[`Schedule`]**: what a unit of work asks of the scheduler on return
//! - **[`errlog`]**: the bounded, user-visible error log
//!
//! # Usage
//!
//! ```rust
//! use libatmoscan::system::{Clock, Schedule};
//!
//! struct Uptime(u64);
//! impl Clock for Uptime {
//!     fn now_ms(&self) -> u64 { self.0 }
//! }
//!
//! fn tick(clock: &impl Clock) -> Schedule {
//!     if clock.now_ms() < 5_000 { Schedule::After(1_000) } else { Schedule::Disable }
//! }
//!
//! assert_eq!(tick(&Uptime(0)), Schedule::After(1_000));
//! assert_eq!(tick(&Uptime(9_000)), Schedule::Disable);
//! ```

/// Rolling log of short failure messages.
pub mod errlog;

pub use errlog::{ErrorLog, LogEntry};

/// Monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

/// Blocking sleep.
pub trait Delay {
    /// Sleeps for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Request returned to the cooperative scheduler after a unit of work ran.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Schedule {
    /// Run again after this many milliseconds.
    After(u32),
    /// Stop scheduling this unit until something re-enables it.
    Disable,
}

impl Schedule {
    /// The delay requested, `None` when disabled.
    pub fn delay_ms(&self) -> Option<u32> {
        match self {
            Schedule::After(ms) => Some(*ms),
            Schedule::Disable => None,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Schedule {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Schedule::After(ms) => defmt::write!(f, "After({=u32}ms)", ms),
            Schedule::Disable => defmt::write!(f, "Disable"),
        }
    }
}

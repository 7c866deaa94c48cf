//! Bounded log of recent failures, shown on the device's error screen.
//!
//! Holds the last `N` messages; older ones are overwritten. Messages are cut
//! to [`MESSAGE_LEN`] bytes. Every recorded message is also forwarded to the
//! `log` facade at warn level.

use heapless::String;

use crate::collections::RingBuffer;
use crate::config::ERROR_LOG_DEPTH;
use crate::json::set_truncated;

/// Longest message kept, in bytes.
pub const MESSAGE_LEN: usize = 48;

/// One logged failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Clock reading when the failure was recorded.
    pub at_ms: u64,
    pub message: String<MESSAGE_LEN>,
}

#[derive(Debug, Default)]
pub struct ErrorLog<const N: usize = ERROR_LOG_DEPTH> {
    entries: RingBuffer<LogEntry, N>,
}

impl<const N: usize> ErrorLog<N> {
    pub const fn new() -> Self {
        Self {
            entries: RingBuffer::new(),
        }
    }

    /// Appends `message`, evicting the oldest entry when full.
    pub fn record(&mut self, at_ms: u64, message: &str) {
        log::warn!("{}", message);
        let mut entry = LogEntry {
            at_ms,
            message: String::new(),
        };
        set_truncated(&mut entry.message, message);
        self.entries.add(entry);
    }

    /// Entry `offset` places back from the newest (`0` is the newest).
    pub fn entry(&self, offset: usize) -> Option<&LogEntry> {
        self.entries.peek(offset).ok()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        (0..self.entries.count()).filter_map(move |offset| self.entry(offset))
    }

    /// Newest message, if any.
    pub fn latest(&self) -> Option<&str> {
        self.entry(0).map(|entry| entry.message.as_str())
    }

    pub fn count(&self) -> usize {
        self.entries.count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Fixed-capacity circular buffer with overwrite-oldest semantics.
//!
//! [`RingBuffer`] backs the rolling chart sample store and the rolling error
//! log. Capacity is a const generic: the buffer never grows, and once it holds
//! `N` items every [`add`](RingBuffer::add) silently evicts the oldest one.
//!
//! ```rust
//! use libatmoscan::collections::ring::RingBuffer;
//!
//! let mut ring: RingBuffer<i32, 3> = RingBuffer::new();
//! for sample in 1..=4 {
//!     ring.add(sample);
//! }
//!
//! assert_eq!(ring.count(), 3);
//! assert_eq!(ring.peek(0), Ok(&4)); // newest
//! assert_eq!(ring.pull(), Ok(2)); // 1 was evicted
//! ```

use heapless::Deque;

/// Errors returned by checked ring buffer accessors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// [`RingBuffer::pull`] was called on an empty buffer.
    Empty,
    /// [`RingBuffer::peek`] offset was not below [`RingBuffer::count`].
    IndexOutOfRange,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Empty => defmt::write!(f, "Empty"),
            Error::IndexOutOfRange => defmt::write!(f, "IndexOutOfRange"),
        }
    }
}

/// Bounded FIFO that overwrites its oldest element when full.
///
/// Not synchronised: the buffer is owned by a single component and touched
/// only from the cooperative scheduler thread.
pub struct RingBuffer<T, const N: usize> {
    items: Deque<T, N>,
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Inserts `item` as the newest element, evicting the oldest one first
    /// when the buffer already holds `N` items.
    ///
    /// Returns the evicted element, if any.
    pub fn add(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.is_full() {
            self.items.pop_front()
        } else {
            None
        };
        // Cannot fail: a slot was freed above when the deque was full.
        let _ = self.items.push_back(item);
        evicted
    }

    /// Removes and returns the oldest element.
    pub fn pull(&mut self) -> Result<T, Error> {
        self.items.pop_front().ok_or(Error::Empty)
    }

    /// Borrows the element `offset` positions back from the newest one
    /// (`0` is the newest, `count() - 1` the oldest).
    pub fn peek(&self, offset: usize) -> Result<&T, Error> {
        let count = self.items.len();
        if offset >= count {
            return Err(Error::IndexOutOfRange);
        }
        let index = count - 1 - offset;
        let (front, back) = self.items.as_slices();
        if index < front.len() {
            Ok(&front[index])
        } else {
            Ok(&back[index - front.len()])
        }
    }

    /// Number of stored elements.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Fixed capacity `N`.
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: core::fmt::Debug, const N: usize> core::fmt::Debug for RingBuffer<T, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (front, back) = self.items.as_slices();
        f.debug_list().entries(front.iter().chain(back.iter())).finish()
    }
}

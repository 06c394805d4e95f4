//! Fixed-capacity ring buffer with a runtime-selected observation window
//!
//! ## Overview
//!
//! Windowed statistics need the last *n* samples, where *n*, the observation
//! window, is picked at configuration time (or per sampling session), while
//! the storage itself must be sized at compile time for embedded targets. The
//! buffer therefore carries a const-generic capacity `N` and a logical window
//! `window <= N`; only the first `window` slots participate in the ring.
//!
//! When the window is full, a push evicts the oldest sample:
//!
//! ```text
//! WindowBuffer<8> with window = 3, after pushing 1 2 3 4:
//! ┌─────┬─────┬─────┬─────┬ ─ ─ ┐
//! │  4  │  2  │  3  │  -  │ ...
//! └─────┴─────┴─────┴─────┴ ─ ─ ┘
//!    ↑                 unused slots
//!    write_pos = 1; logical order is 2, 3, 4
//! ```
//!
//! All operations are O(1) except iteration; nothing allocates.
//!
//! ## Usage
//!
//! ```rust
//! use sensorkit_core::buffer::WindowBuffer;
//!
//! // Window defaults to the full capacity
//! let mut buf = WindowBuffer::<3>::new();
//! for v in [10.0, 20.0, 30.0, 40.0] {
//!     buf.push(v);
//! }
//! assert_eq!(buf.last(), Some(40.0));
//! assert_eq!(buf.first(), Some(20.0));
//! ```

/// Ring buffer over the most recent `window` samples
///
/// Invariants:
/// - `1 <= window <= N`
/// - `len <= window`
/// - `write_pos < window`
/// - iteration yields samples oldest to newest
#[derive(Debug, Clone)]
pub struct WindowBuffer<const N: usize> {
    data: [f32; N],
    write_pos: usize,
    len: usize,
    window: usize,
}

impl<const N: usize> WindowBuffer<N> {
    /// Create an empty buffer with the window set to the full capacity `N`
    pub const fn new() -> Self {
        Self {
            data: [0.0; N],
            write_pos: 0,
            len: 0,
            window: N,
        }
    }

    /// Current observation window length
    pub fn window(&self) -> usize {
        self.window
    }

    /// Compile-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Change the observation window length
    ///
    /// The caller must have validated `1 <= window <= N`. Changing the window
    /// discards buffered samples, since the old ring layout is meaningless
    /// under the new length; setting the same length again is a no-op.
    pub(crate) fn set_window(&mut self, window: usize) {
        debug_assert!(window >= 1 && window <= N);
        if window != self.window {
            self.window = window;
            self.clear();
        }
    }

    /// Append a sample, evicting the oldest when the window is full
    pub fn push(&mut self, value: f32) {
        self.data[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.window;
        if self.len < self.window {
            self.len += 1;
        }
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no sample has been acquired yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once the window has been filled
    pub fn is_full(&self) -> bool {
        self.len == self.window
    }

    /// Most recent sample
    pub fn last(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let idx = (self.write_pos + self.window - 1) % self.window;
        Some(self.data[idx])
    }

    /// Second most recent sample
    pub fn previous(&self) -> Option<f32> {
        if self.len < 2 {
            return None;
        }
        let idx = (self.write_pos + self.window - 2) % self.window;
        Some(self.data[idx])
    }

    /// Oldest buffered sample
    pub fn first(&self) -> Option<f32> {
        self.get(0)
    }

    /// Sample by logical index (0 = oldest, `len - 1` = newest)
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len {
            return None;
        }
        let actual = if self.len < self.window {
            // Ring has not wrapped yet, data starts at slot 0
            index
        } else {
            (self.write_pos + index) % self.window
        };
        Some(self.data[actual])
    }

    /// Iterate over buffered samples, oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Drop all buffered samples
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<const N: usize> Default for WindowBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer() {
        let buf: WindowBuffer<5> = WindowBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.last(), None);
        assert_eq!(buf.previous(), None);
        assert_eq!(buf.first(), None);
    }

    #[test]
    fn single_sample() {
        let mut buf = WindowBuffer::<5>::new();
        buf.push(42.0);
        assert_eq!(buf.last(), Some(42.0));
        assert_eq!(buf.previous(), None);
        assert_eq!(buf.first(), Some(42.0));
    }

    #[test]
    fn eviction_keeps_most_recent_window() {
        let mut buf = WindowBuffer::<8>::new();
        buf.set_window(3);
        for i in 0..5 {
            buf.push(i as f32);
        }
        assert_eq!(buf.len(), 3);
        assert!(buf.is_full());

        let values: heapless::Vec<f32, 8> = buf.iter().collect();
        assert_eq!(&values[..], &[2.0, 3.0, 4.0]);
        assert_eq!(buf.last(), Some(4.0));
        assert_eq!(buf.previous(), Some(3.0));
        assert_eq!(buf.first(), Some(2.0));
    }

    #[test]
    fn window_change_discards_samples() {
        let mut buf = WindowBuffer::<8>::new();
        buf.push(1.0);
        buf.push(2.0);
        buf.set_window(4);
        assert!(buf.is_empty());

        // Same window again keeps contents
        buf.push(3.0);
        buf.set_window(4);
        assert_eq!(buf.last(), Some(3.0));
    }

    #[test]
    fn iteration_order_before_wraparound() {
        let mut buf = WindowBuffer::<4>::new();
        for i in 0..3 {
            buf.push(i as f32);
        }
        let values: heapless::Vec<f32, 4> = buf.iter().collect();
        assert_eq!(&values[..], &[0.0, 1.0, 2.0]);
    }
}

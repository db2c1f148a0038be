//! Models search windows as regions of the buffer.

use std::{fmt, ops::Range};

/// A half-open region of the buffer.
///
/// Windows are derived per marker occurrence during a scan and bound how far
/// past the marker a rule pattern may match. They are never stored.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window {
    /// The index of the first byte in the region.
    start: usize,
    /// The index one past the last byte in the region.
    end: usize,
}

impl Window {
    /// Creates a new window.
    pub fn new(start: usize, end: usize) -> Window {
        if start < end {
            Window { start, end }
        } else {
            Window {
                start: end,
                end: start,
            }
        }
    }

    /// Creates a window from a start offset and a length.
    pub fn from_start_len(start: usize, len: usize) -> Window {
        Window {
            start,
            end: start.saturating_add(len),
        }
    }

    /// Limits the window to the first `len` bytes of the buffer.
    pub fn clamped_to(self, len: usize) -> Window {
        Window {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    /// The start of the window.
    pub fn start(self) -> usize {
        self.start
    }

    /// The end of the window.
    pub fn end(self) -> usize {
        self.end
    }

    /// The size of the window in bytes.
    pub fn len(self) -> usize {
        self.end - self.start
    }

    /// Determines if the window is empty.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Determines if the window contains the given offset.
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the window as an index range into the buffer.
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({:#x}..{:#x})", self.start, self.end)
    }
}

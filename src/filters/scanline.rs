//! Scanline buffers shared by the streaming selection filters.
//!
//! - [`ScanlineRing`]: a fixed set of equally sized rows with a rotating
//!   start index. Logical row `i` is the `i`-th row of the current window;
//!   [`ScanlineRing::rotate`] slides the window down by one row, recycling
//!   the old first row as the new last one.
//! - [`OffsetBuffer`]: a contiguous buffer addressed by a signed logical
//!   index range such as `[-radius, width + radius)`.

use std::ops::{Index, IndexMut};

// ============================================================================
// Scanline Ring
// ============================================================================

/// Sliding window of scanlines over a mask.
#[derive(Debug, Clone)]
pub struct ScanlineRing {
    data: Vec<u8>,
    stride: usize,
    rows: usize,
    start: usize,
}

impl ScanlineRing {
    /// `rows` scanlines of `stride` bytes, zero filled.
    pub fn new(rows: usize, stride: usize) -> Self {
        Self::filled(rows, stride, 0)
    }

    pub fn filled(rows: usize, stride: usize, value: u8) -> Self {
        Self {
            data: vec![value; rows * stride],
            stride,
            rows,
            start: 0,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    fn physical(&self, i: usize) -> usize {
        debug_assert!(i < self.rows);
        (self.start + i) % self.rows
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u8] {
        let p = self.physical(i) * self.stride;
        &self.data[p..p + self.stride]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [u8] {
        let p = self.physical(i) * self.stride;
        &mut self.data[p..p + self.stride]
    }

    /// Logical row `i + 1` becomes row `i`; the old row 0 becomes the last.
    #[inline]
    pub fn rotate(&mut self) {
        self.start = (self.start + 1) % self.rows;
    }

    /// Copy the whole of row `src` over row `dst`.
    pub fn copy_row(&mut self, src: usize, dst: usize) {
        self.copy_span(src, dst, 0..self.stride);
    }

    /// Copy bytes `span` of row `src` over the same bytes of row `dst`.
    pub fn copy_span(&mut self, src: usize, dst: usize, span: std::ops::Range<usize>) {
        if src == dst {
            return;
        }
        let s = self.physical(src) * self.stride;
        let d = self.physical(dst) * self.stride;
        self.data
            .copy_within(s + span.start..s + span.end, d + span.start);
    }

    pub fn fill_row(&mut self, i: usize, value: u8) {
        self.row_mut(i).fill(value);
    }
}

// ============================================================================
// Offset Buffer
// ============================================================================

/// Buffer indexed over the logical range `[first, first + len)`.
#[derive(Debug, Clone)]
pub struct OffsetBuffer<T> {
    data: Vec<T>,
    first: isize,
}

impl<T: Clone> OffsetBuffer<T> {
    /// Buffer covering `[first, end)`, every entry set to `value`.
    pub fn new(first: isize, end: isize, value: T) -> Self {
        let len = (end - first).max(0) as usize;
        Self {
            data: vec![value; len],
            first,
        }
    }
}

impl<T> OffsetBuffer<T> {
    #[inline]
    pub fn first(&self) -> isize {
        self.first
    }

    #[inline]
    pub fn end(&self) -> isize {
        self.first + self.data.len() as isize
    }
}

impl<T> Index<isize> for OffsetBuffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: isize) -> &T {
        &self.data[(i - self.first) as usize]
    }
}

impl<T> IndexMut<isize> for OffsetBuffer<T> {
    #[inline]
    fn index_mut(&mut self, i: isize) -> &mut T {
        &mut self.data[(i - self.first) as usize]
    }
}

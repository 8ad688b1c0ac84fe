//! The 8-bit selection mask the filters operate on.
//!
//! A mask is an infinite plane of opacity samples: a finite, growable block
//! of stored samples plus a default pixel standing in for everything
//! outside it. Filters only talk to masks through [`PixelSelection`], the
//! scanline-oriented read/write contract; [`SelectionMask`] is the
//! in-memory implementation backed by an `ndarray::Array2<u8>`.
//!
//! ## Values
//! - `0` - unselected
//! - `255` - fully selected
//! - anything between - partial (anti-aliased or feathered) selection

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::error::{Result, SelectionError};

/// Fully selected sample value.
pub const MAX_SELECTED: u8 = 255;
/// Unselected sample value.
pub const MIN_SELECTED: u8 = 0;

// ============================================================================
// Default Bounds
// ============================================================================

/// The image rectangle a mask belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefaultBounds {
    bounds: Rect,
}

impl DefaultBounds {
    pub fn new(bounds: Rect) -> Self {
        Self { bounds }
    }

    /// Full image rectangle.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Rectangle edge-locked operations must treat as the whole image.
    pub fn image_border_rect(&self) -> Rect {
        self.bounds
    }
}

// ============================================================================
// Pixel Access Contract
// ============================================================================

/// Scanline access to a single-channel 8-bit mask.
///
/// Reads outside stored data yield [`PixelSelection::default_pixel`];
/// writes extend storage as needed.
pub trait PixelSelection {
    /// Copy `width * rows` samples starting at (x, y) into `buf`, row-major.
    fn read_bytes(&self, buf: &mut [u8], x: i32, y: i32, width: i32, rows: i32);

    /// Store `width * rows` samples from `buf` starting at (x, y).
    fn write_bytes(&mut self, buf: &[u8], x: i32, y: i32, width: i32, rows: i32);

    /// Value of every sample outside stored data.
    fn default_pixel(&self) -> u8;

    /// Tight extent of the selected area. When the default pixel itself is
    /// selected, the image bounds united with the samples that differ from
    /// it.
    fn selected_exact_rect(&self) -> Rect;

    fn default_bounds(&self) -> DefaultBounds;

    /// Complement the whole plane: stored samples and the default pixel.
    fn invert(&mut self);

    /// Drop stored samples outside `rect`; they revert to the default pixel.
    fn crop(&mut self, rect: Rect);

    fn read_row(&self, buf: &mut [u8], x: i32, y: i32, width: i32) {
        self.read_bytes(buf, x, y, width, 1);
    }

    fn write_row(&mut self, buf: &[u8], x: i32, y: i32, width: i32) {
        self.write_bytes(buf, x, y, width, 1);
    }
}

// ============================================================================
// In-memory Mask
// ============================================================================

/// Growable in-memory selection mask.
///
/// Storage covers `extent`; `data` has shape (extent.height, extent.width).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMask {
    extent: Rect,
    data: Array2<u8>,
    default_pixel: u8,
    default_bounds: DefaultBounds,
}

impl SelectionMask {
    /// Empty (fully unselected) mask for an image covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self::with_default_pixel(MIN_SELECTED, bounds)
    }

    pub fn with_default_pixel(default_pixel: u8, bounds: Rect) -> Self {
        Self {
            extent: Rect::default(),
            data: Array2::zeros((0, 0)),
            default_pixel,
            default_bounds: DefaultBounds::new(bounds),
        }
    }

    /// Mask whose stored samples are `array` (height, width) placed at the
    /// origin; the image bounds are the array bounds.
    pub fn from_array(array: Array2<u8>) -> Self {
        let (height, width) = array.dim();
        let extent = Rect::new(0, 0, width as i32, height as i32);
        Self {
            extent,
            data: array,
            default_pixel: MIN_SELECTED,
            default_bounds: DefaultBounds::new(extent),
        }
    }

    /// Mask from a flat row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width.checked_mul(height).ok_or(SelectionError::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if data.len() != expected {
            return Err(SelectionError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let array = Array2::from_shape_vec((height, width), data).map_err(|_| {
            SelectionError::SizeMismatch {
                expected,
                actual: 0,
            }
        })?;
        Ok(Self::from_array(array))
    }

    /// Empty mask sharing `other`'s default pixel and image bounds.
    pub fn like(other: &dyn PixelSelection) -> Self {
        Self::with_default_pixel(other.default_pixel(), other.default_bounds().bounds())
    }

    /// Region covered by stored samples.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        if self.extent.contains_point(x, y) {
            self.data[[(y - self.extent.y) as usize, (x - self.extent.x) as usize]]
        } else {
            self.default_pixel
        }
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, value: u8) {
        self.write_bytes(&[value], x, y, 1, 1);
    }

    /// Copy `rect` out as a (height, width) array.
    pub fn to_array(&self, rect: Rect) -> Array2<u8> {
        if rect.is_empty() {
            return Array2::zeros((0, 0));
        }
        let mut buf = vec![0u8; (rect.width * rect.height) as usize];
        self.read_bytes(&mut buf, rect.x, rect.y, rect.width, rect.height);
        Array2::from_shape_vec((rect.height as usize, rect.width as usize), buf)
            .unwrap_or_else(|_| Array2::zeros((0, 0)))
    }

    /// Tight box of the stored samples that differ from the default pixel.
    fn non_default_rect(&self) -> Rect {
        let (height, width) = self.data.dim();
        let mut min_x = width;
        let mut min_y = height;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for ((y, x), &v) in self.data.indexed_iter() {
            if v != self.default_pixel {
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        if !found {
            return Rect::default();
        }
        Rect::new(
            self.extent.x + min_x as i32,
            self.extent.y + min_y as i32,
            (max_x - min_x + 1) as i32,
            (max_y - min_y + 1) as i32,
        )
    }

    /// Grow storage so it covers `rect`, filling new samples with the
    /// default pixel.
    fn ensure_extent(&mut self, rect: Rect) {
        if rect.is_empty() || self.extent.contains_rect(&rect) {
            return;
        }
        let extent = self.extent.united(&rect);
        let mut data = Array2::from_elem(
            (extent.height as usize, extent.width as usize),
            self.default_pixel,
        );
        if !self.extent.is_empty() {
            let oy = (self.extent.y - extent.y) as usize;
            let ox = (self.extent.x - extent.x) as usize;
            let (h, w) = self.data.dim();
            data.slice_mut(s![oy..oy + h, ox..ox + w]).assign(&self.data);
        }
        log::trace!("selection storage grown from {:?} to {:?}", self.extent, extent);
        self.extent = extent;
        self.data = data;
    }
}

impl PixelSelection for SelectionMask {
    fn read_bytes(&self, buf: &mut [u8], x: i32, y: i32, width: i32, rows: i32) {
        if width <= 0 || rows <= 0 {
            return;
        }
        let w = width as usize;
        let row_span = Rect::new(x, 0, width, 1);
        for r in 0..rows {
            let dst = &mut buf[r as usize * w..(r as usize + 1) * w];
            let yy = y + r;
            if yy < self.extent.y || yy > self.extent.bottom() || self.extent.is_empty() {
                dst.fill(self.default_pixel);
                continue;
            }
            let overlap = row_span.intersected(&Rect::new(self.extent.x, 0, self.extent.width, 1));
            if overlap.is_empty() {
                dst.fill(self.default_pixel);
                continue;
            }
            let lead = (overlap.x - x) as usize;
            let len = overlap.width as usize;
            dst[..lead].fill(self.default_pixel);
            dst[lead + len..].fill(self.default_pixel);

            let sy = (yy - self.extent.y) as usize;
            let sx = (overlap.x - self.extent.x) as usize;
            let src = self.data.slice(s![sy, sx..sx + len]);
            for (d, s) in dst[lead..lead + len].iter_mut().zip(src.iter()) {
                *d = *s;
            }
        }
    }

    fn write_bytes(&mut self, buf: &[u8], x: i32, y: i32, width: i32, rows: i32) {
        if width <= 0 || rows <= 0 {
            return;
        }
        self.ensure_extent(Rect::new(x, y, width, rows));
        let w = width as usize;
        let ox = (x - self.extent.x) as usize;
        for r in 0..rows as usize {
            let oy = (y - self.extent.y) as usize + r;
            let mut dst = self.data.slice_mut(s![oy, ox..ox + w]);
            for (d, s) in dst.iter_mut().zip(buf[r * w..(r + 1) * w].iter()) {
                *d = *s;
            }
        }
    }

    fn default_pixel(&self) -> u8 {
        self.default_pixel
    }

    fn selected_exact_rect(&self) -> Rect {
        let stored = self.non_default_rect();
        if self.default_pixel == MIN_SELECTED {
            stored
        } else {
            self.default_bounds.bounds().united(&stored)
        }
    }

    fn default_bounds(&self) -> DefaultBounds {
        self.default_bounds
    }

    fn invert(&mut self) {
        self.data.mapv_inplace(|v| MAX_SELECTED - v);
        self.default_pixel = MAX_SELECTED - self.default_pixel;
    }

    fn crop(&mut self, rect: Rect) {
        let kept = self.extent.intersected(&rect);
        if kept.is_empty() {
            self.extent = Rect::default();
            self.data = Array2::zeros((0, 0));
            return;
        }
        let oy = (kept.y - self.extent.y) as usize;
        let ox = (kept.x - self.extent.x) as usize;
        self.data = self
            .data
            .slice(s![oy..oy + kept.height as usize, ox..ox + kept.width as usize])
            .to_owned();
        self.extent = kept;
    }
}

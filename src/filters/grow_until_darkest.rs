//! Grow the selection until it reaches darker or more opaque pixels of a
//! reference image.
//!
//! The selection is first grown normally by the radius. A copy of the
//! original selection is then grown adaptively, pixel by pixel, through two
//! raster sweeps:
//! - forward (top-left to bottom-right), looking at neighbours above and to
//!   the left
//! - backward (bottom-right to top-left), looking at neighbours below and to
//!   the right
//!
//! A pixel joins the adaptive mask when the normally grown selection covers
//! it and a selected neighbour lets it in: the pixel is at least as opaque
//! as the neighbour and, unless the neighbour is fully transparent, no
//! brighter. The two sweeps only see already visited neighbours, so the
//! growth is a causal approximation of a flood fill.
//!
//! Finally the adaptive mask gates the normally grown selection, which
//! keeps its soft edges.

use super::grow::GrowSelectionFilter;
use super::scanline::ScanlineRing;
use super::SelectionFilter;
use crate::selection::{
    DefaultBounds, PixelSelection, ReferenceDevice, Rect, SelectionMask, MAX_SELECTED, MIN_SELECTED,
};

/// Grow by `radius`, stopping at darker or more opaque reference pixels.
pub struct GrowUntilDarkestPixelSelectionFilter<'a> {
    radius: i32,
    reference: &'a dyn ReferenceDevice,
}

impl<'a> GrowUntilDarkestPixelSelectionFilter<'a> {
    pub fn new(radius: i32, reference: &'a dyn ReferenceDevice) -> Self {
        Self { radius, reference }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Whether a selected neighbour whose reference pixel is `neighbor` lets
    /// in a pixel of the given opacity and intensity.
    #[inline]
    fn admits(&self, neighbor: &[u8], opacity: u8, intensity: u8) -> bool {
        let neighbor_opacity = self.reference.opacity_u8(neighbor);
        if opacity < neighbor_opacity {
            return false;
        }
        // A fully transparent neighbour imposes no intensity barrier.
        neighbor_opacity == MIN_SELECTED || intensity <= self.reference.intensity8(neighbor)
    }

    /// One raster sweep of the adaptive mask over `rect`.
    ///
    /// Two scanlines of the adaptive mask and of the reference are kept:
    /// row 0 is the previously visited row, row 1 the current one.
    fn sweep(&self, adaptive: &mut SelectionMask, grown: &dyn PixelSelection, rect: Rect, forward: bool) {
        let width = rect.width as usize;
        let pixel_size = self.reference.pixel_size();
        let step: isize = if forward { 1 } else { -1 };

        let mut mask_lines = ScanlineRing::new(2, width);
        let mut reference_lines = ScanlineRing::new(2, width * pixel_size);
        let mut grown_line = vec![0u8; width];

        for k in 0..rect.height {
            // Rows go back where they were read, including the first row of
            // the backward sweep, which must not land on the top row.
            let y = if forward { rect.top() + k } else { rect.bottom() - k };

            mask_lines.rotate();
            reference_lines.rotate();
            adaptive.read_row(mask_lines.row_mut(1), rect.x, y, rect.width);
            self.reference.read_bytes(reference_lines.row_mut(1), rect.x, y, rect.width);
            grown.read_row(&mut grown_line, rect.x, y, rect.width);

            for i in 0..width {
                let x = if forward { i } else { width - 1 - i };
                if mask_lines.row(1)[x] != MIN_SELECTED || grown_line[x] == MIN_SELECTED {
                    continue;
                }
                let pixel = &reference_lines.row(1)[x * pixel_size..(x + 1) * pixel_size];
                let opacity = self.reference.opacity_u8(pixel);
                let intensity = self.reference.intensity8(pixel);

                let selected = causal_neighbors(x, width, step, k > 0).any(|(row, nx)| {
                    mask_lines.row(row)[nx] != MIN_SELECTED
                        && self.admits(
                            &reference_lines.row(row)[nx * pixel_size..(nx + 1) * pixel_size],
                            opacity,
                            intensity,
                        )
                });
                if selected {
                    mask_lines.row_mut(1)[x] = MAX_SELECTED;
                }
            }

            adaptive.write_row(mask_lines.row(1), rect.x, y, rect.width);
        }
    }
}

impl std::fmt::Debug for GrowUntilDarkestPixelSelectionFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowUntilDarkestPixelSelectionFilter")
            .field("radius", &self.radius)
            .field("pixel_size", &self.reference.pixel_size())
            .finish()
    }
}

/// Neighbours visited before column `x` of the current row in a sweep, as
/// (scanline, column): the previous row (scanline 0) at x - 1, x, x + 1
/// and the previous pixel of the current row (scanline 1).
///
/// `step` is 1 for the forward sweep and -1 for the backward sweep.
fn causal_neighbors(x: usize, width: usize, step: isize, has_previous_row: bool) -> impl Iterator<Item = (usize, usize)> {
    let (x, w) = (x as isize, width as isize);
    [(0, x - 1), (0, x), (0, x + 1)]
        .into_iter()
        .filter(move |_| has_previous_row)
        .chain(std::iter::once((1, x - step)))
        .filter(move |&(_, nx)| nx >= 0 && nx < w)
        .map(|(row, nx)| (row, nx as usize))
}

impl SelectionFilter for GrowUntilDarkestPixelSelectionFilter<'_> {
    fn name(&self) -> &'static str {
        "Grow Selection Until Darkest Pixel"
    }

    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect.adjusted(-self.radius, -self.radius, self.radius, self.radius)
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        if self.radius <= 0 {
            log::warn!("{}: non-positive radius, skipped", self.name());
            return;
        }
        if rect.is_empty() {
            return;
        }
        log::debug!("{} ({}) over {:?}", self.name(), self.radius, rect);

        let width = rect.width as usize;
        let mut line = vec![0u8; width];

        // Adaptive mask starts as a copy of the selection.
        let mut adaptive = SelectionMask::like(&*selection);
        for y in rect.top()..=rect.bottom() {
            selection.read_row(&mut line, rect.x, y, rect.width);
            adaptive.write_row(&line, rect.x, y, rect.width);
        }

        GrowSelectionFilter::new(self.radius, self.radius).process(selection, rect);

        self.sweep(&mut adaptive, &*selection, rect, true);
        self.sweep(&mut adaptive, &*selection, rect, false);

        // The adaptive mask gates the normally grown selection.
        let mut gate = vec![0u8; width];
        for y in rect.top()..=rect.bottom() {
            selection.read_row(&mut line, rect.x, y, rect.width);
            adaptive.read_row(&mut gate, rect.x, y, rect.width);
            for (v, &g) in line.iter_mut().zip(gate.iter()) {
                if g == MIN_SELECTED {
                    *v = MIN_SELECTED;
                }
            }
            selection.write_row(&line, rect.x, y, rect.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::PaintDevice;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Reference device that records every read it serves.
    struct ReadRecorder {
        inner: PaintDevice,
        reads: Cell<usize>,
        widest: Cell<usize>,
    }

    impl ReferenceDevice for ReadRecorder {
        fn pixel_size(&self) -> usize {
            self.inner.pixel_size()
        }

        fn read_bytes(&self, buf: &mut [u8], x: i32, y: i32, width: i32) {
            self.reads.set(self.reads.get() + 1);
            self.widest.set(self.widest.get().max(buf.len()));
            self.inner.read_bytes(buf, x, y, width);
        }

        fn opacity_u8(&self, pixel: &[u8]) -> u8 {
            self.inner.opacity_u8(pixel)
        }

        fn intensity8(&self, pixel: &[u8]) -> u8 {
            self.inner.intensity8(pixel)
        }
    }

    /// Bright gray image with a dark vertical line at column 8.
    fn valley() -> PaintDevice {
        let data = (0..16 * 16)
            .map(|i| if i % 16 == 8 { 20 } else { 200 })
            .collect();
        PaintDevice::from_vec(16, 16, 1, data).unwrap()
    }

    fn seed() -> SelectionMask {
        let mut mask = SelectionMask::new(Rect::new(0, 0, 16, 16));
        mask.write_bytes(&[255u8; 12], 2, 6, 3, 4);
        mask
    }

    #[test]
    fn test_growth_stops_after_darkest_pixel() {
        let reference = valley();
        let mut mask = seed();
        let rect = Rect::new(0, 0, 16, 16);

        GrowUntilDarkestPixelSelectionFilter::new(12, &reference).process(&mut mask, rect);

        let result = mask.to_array(rect);
        for ((_, x), &v) in result.indexed_iter() {
            if x <= 8 {
                assert_eq!(v, 255);
            } else {
                assert_eq!(v, 0);
            }
        }
    }

    #[test]
    fn test_reference_is_read_one_scanline_at_a_time() {
        let reference = ReadRecorder {
            inner: valley(),
            reads: Cell::new(0),
            widest: Cell::new(0),
        };
        let mut mask = seed();
        let rect = Rect::new(0, 0, 16, 16);

        GrowUntilDarkestPixelSelectionFilter::new(12, &reference).process(&mut mask, rect);

        // One row per sweep, two sweeps.
        assert_eq!(reference.reads.get(), 32);
        assert_eq!(reference.widest.get(), 16);
        let result = mask.to_array(rect);
        assert_eq!(result[[0, 8]], 255);
        assert_eq!(result[[15, 9]], 0);
    }

    #[test]
    fn test_backward_sweep_keeps_rows_in_place() {
        // Uniform reference: the seed in the bottom row floods the rect.
        let reference = PaintDevice::from_vec(6, 6, 1, vec![100; 36]).unwrap();
        let rect = Rect::new(0, 0, 6, 6);
        let mut mask = SelectionMask::new(rect);
        mask.set_pixel(5, 5, 255);

        GrowUntilDarkestPixelSelectionFilter::new(2, &reference).process(&mut mask, rect);

        let result = mask.to_array(rect);
        for ((y, x), &v) in result.indexed_iter() {
            let expected = if x >= 3 && y >= 3 && !(x == 3 && y == 3) { 255 } else { 0 };
            assert_eq!(v, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_result_within_normal_grow() {
        let reference = valley();
        let rect = Rect::new(0, 0, 16, 16);

        let mut mask = SelectionMask::new(rect);
        mask.write_bytes(&[255u8, 128, 255, 60], 11, 3, 2, 2);
        let mut grown = mask.clone();

        GrowUntilDarkestPixelSelectionFilter::new(3, &reference).process(&mut mask, rect);
        GrowSelectionFilter::new(3, 3).process(&mut grown, rect);

        let result = mask.to_array(rect);
        let bound = grown.to_array(rect);
        for (r, b) in result.iter().zip(bound.iter()) {
            assert!(r == b || *r == 0);
        }
        // Reaches the dark line on the left, not past it.
        assert_eq!(result[[3, 8]], 255);
        assert_eq!(result[[3, 7]], 0);
    }

    #[test]
    fn test_transparent_neighbor_imposes_no_intensity_barrier() {
        // Transparent bright pixels next to an opaque brighter row.
        let mut data = vec![0u8; 4 * 2 * 2];
        for x in 0..4 {
            data[x * 2] = 250;
            data[x * 2 + 1] = 0;
            data[8 + x * 2] = 255;
            data[8 + x * 2 + 1] = 255;
        }
        let reference = PaintDevice::from_vec(4, 2, 2, data).unwrap();
        let rect = Rect::new(0, 0, 4, 2);
        let mut mask = SelectionMask::new(rect);
        mask.write_bytes(&[255u8, 255, 255, 255], 0, 0, 4, 1);

        GrowUntilDarkestPixelSelectionFilter::new(2, &reference).process(&mut mask, rect);

        assert!(mask.to_array(rect).iter().all(|&v| v == 255));
    }

    #[test]
    fn test_zero_radius_is_noop() {
        let reference = valley();
        let mut mask = seed();
        let rect = Rect::new(0, 0, 16, 16);
        let before = mask.to_array(rect);

        GrowUntilDarkestPixelSelectionFilter::new(0, &reference).process(&mut mask, rect);

        assert_eq!(mask.to_array(rect), before);
    }
}

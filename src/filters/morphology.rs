//! Binary morphology filters: Erode, Dilate, Smooth.
//!
//! These filters stream three rows (above, current, below) through a
//! [`ScanlineRing`] and compute each output sample from a fixed radius-1
//! neighbourhood:
//! - **Erode**: minimum of the plus-shaped 5-neighbourhood
//! - **Dilate**: maximum of the plus-shaped 5-neighbourhood
//! - **Smooth**: truncated mean of the 3×3 block
//!
//! Edges replicate: the row above the first and below the last are copies
//! of those rows, and every row carries one duplicated column on each side.

use super::scanline::ScanlineRing;
use super::SelectionFilter;
use crate::selection::{DefaultBounds, PixelSelection, Rect};

/// Fixed structuring-element radius of the binary filters.
const RADIUS: i32 = 1;

/// Read row `y` of `rect` into `row[1..=width]` and replicate the edge
/// samples into the padding columns.
fn load_padded_row(selection: &dyn PixelSelection, row: &mut [u8], rect: Rect, y: i32) {
    let width = rect.width as usize;
    selection.read_row(&mut row[1..=width], rect.x, y, rect.width);
    row[0] = row[1];
    row[width + 1] = row[width];
}

/// Stream `rect` through a 3-row window and write `kernel(top, middle,
/// bottom, x)` for every column. Rows are padded by one column, so output
/// column `x` is centred on padded index `x + 1`.
fn process_3x3<F>(selection: &mut dyn PixelSelection, rect: Rect, kernel: F)
where
    F: Fn(&[u8], &[u8], &[u8], usize) -> u8,
{
    if rect.is_empty() {
        return;
    }
    let width = rect.width as usize;
    let height = rect.height;

    let mut buf = ScanlineRing::new(3, width + 2);
    let mut out = vec![0u8; width];

    // load top of image
    load_padded_row(selection, buf.row_mut(0), rect, rect.y);
    buf.copy_row(0, 1);

    for y in 0..height {
        if y + 1 < height {
            load_padded_row(selection, buf.row_mut(2), rect, rect.y + y + 1);
        } else {
            buf.copy_row(1, 2);
        }

        let (top, middle, bottom) = (buf.row(0), buf.row(1), buf.row(2));
        for (x, o) in out.iter_mut().enumerate() {
            *o = kernel(top, middle, bottom, x);
        }

        selection.write_row(&out, rect.x, rect.y + y, rect.width);
        buf.rotate();
    }
}

// ============================================================================
// Erode
// ============================================================================

/// Shrink the selection by one pixel (plus-shaped minimum).
#[derive(Debug, Clone, Copy, Default)]
pub struct ErodeSelectionFilter;

impl SelectionFilter for ErodeSelectionFilter {
    fn name(&self) -> &'static str {
        "Erode Selection"
    }

    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect.adjusted(-RADIUS, -RADIUS, RADIUS, RADIUS)
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        log::debug!("{} over {:?}", self.name(), rect);
        process_3x3(selection, rect, |top, middle, bottom, x| {
            top[x + 1]
                .min(middle[x])
                .min(middle[x + 1])
                .min(middle[x + 2])
                .min(bottom[x + 1])
        });
    }
}

// ============================================================================
// Dilate
// ============================================================================

/// Grow the selection by one pixel (plus-shaped maximum).
#[derive(Debug, Clone, Copy, Default)]
pub struct DilateSelectionFilter;

impl SelectionFilter for DilateSelectionFilter {
    fn name(&self) -> &'static str {
        "Dilate Selection"
    }

    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect.adjusted(-RADIUS, -RADIUS, RADIUS, RADIUS)
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        log::debug!("{} over {:?}", self.name(), rect);
        process_3x3(selection, rect, |top, middle, bottom, x| {
            top[x + 1]
                .max(middle[x])
                .max(middle[x + 1])
                .max(middle[x + 2])
                .max(bottom[x + 1])
        });
    }
}

// ============================================================================
// Smooth
// ============================================================================

/// 3×3 box average of the mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothSelectionFilter;

impl SelectionFilter for SmoothSelectionFilter {
    fn name(&self) -> &'static str {
        "Smooth Selection"
    }

    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect.adjusted(-RADIUS, -RADIUS, RADIUS, RADIUS)
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        log::debug!("{} over {:?}", self.name(), rect);
        process_3x3(selection, rect, |top, middle, bottom, x| {
            let sum: u32 = [top, middle, bottom]
                .iter()
                .map(|row| row[x] as u32 + row[x + 1] as u32 + row[x + 2] as u32)
                .sum();
            (sum / 9) as u8
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMask;
    use ndarray::{array, Array2};
    use pretty_assertions::assert_eq;

    fn run(filter: &dyn SelectionFilter, input: Array2<u8>) -> Array2<u8> {
        let mut mask = SelectionMask::from_array(input);
        let rect = mask.default_bounds().bounds();
        filter.process(&mut mask, rect);
        mask.to_array(rect)
    }

    #[test]
    fn test_dilate_grows_plus_shape() {
        let mut img = Array2::<u8>::zeros((5, 5));
        img[[2, 2]] = 255;

        let result = run(&DilateSelectionFilter, img);

        let expected: Array2<u8> = array![
            [0, 0, 0, 0, 0],
            [0, 0, 255, 0, 0],
            [0, 255, 255, 255, 0],
            [0, 0, 255, 0, 0],
            [0, 0, 0, 0, 0],
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_erode_shrinks_plus_shape() {
        let mut img = Array2::from_elem((5, 5), 255u8);
        img[[2, 2]] = 0;

        let result = run(&ErodeSelectionFilter, img);

        assert_eq!(result[[2, 1]], 0);
        assert_eq!(result[[2, 3]], 0);
        assert_eq!(result[[1, 2]], 0);
        assert_eq!(result[[3, 2]], 0);
        assert_eq!(result[[1, 1]], 255);
        assert_eq!(result[[0, 0]], 255);
    }

    #[test]
    fn test_erode_replicates_edges() {
        // Selected everywhere: replicated edges keep the border selected.
        let result = run(&ErodeSelectionFilter, Array2::from_elem((3, 4), 255u8));
        assert!(result.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_smooth_averages_block() {
        let mut img = Array2::<u8>::zeros((3, 3));
        img[[1, 1]] = 90;

        let result = run(&SmoothSelectionFilter, img);

        assert!(result.iter().all(|&v| v == 10));
    }

    #[test]
    fn test_smooth_flat_regions_unchanged() {
        let full = run(&SmoothSelectionFilter, Array2::from_elem((4, 6), 255u8));
        assert!(full.iter().all(|&v| v == 255));
        let empty = run(&SmoothSelectionFilter, Array2::<u8>::zeros((4, 6)));
        assert!(empty.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_change_rect_expands_by_one() {
        let bounds = DefaultBounds::new(Rect::new(0, 0, 100, 100));
        let rect = Rect::new(10, 10, 5, 5);
        assert_eq!(ErodeSelectionFilter.change_rect(rect, &bounds), Rect::new(9, 9, 7, 7));
        assert_eq!(DilateSelectionFilter.change_rect(rect, &bounds), Rect::new(9, 9, 7, 7));
        assert_eq!(SmoothSelectionFilter.change_rect(rect, &bounds), Rect::new(9, 9, 7, 7));
    }
}

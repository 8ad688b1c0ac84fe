//! Radius morphology filters: Grow and Shrink.
//!
//! Both filters apply an elliptical structuring element of
//! (x_radius, y_radius), built by [`compute_border`]:
//! - **Grow**: maximum over the element (dilation)
//! - **Shrink**: minimum over the element (erosion)
//!
//! A per-column cache of running extrema over the vertical window centred
//! on the current row is updated in O(y_radius) per column and row, and the
//! horizontal scan reuses the previous column's winner while it stays in
//! reach.
//!
//! Much of Grow mirrors Shrink; fix bugs in both.

use ndarray::Array2;

use super::border_table::compute_border;
use super::scanline::{OffsetBuffer, ScanlineRing};
use super::SelectionFilter;
use crate::selection::{DefaultBounds, PixelSelection, Rect, MAX_SELECTED, MIN_SELECTED};

// ============================================================================
// Column Extrema
// ============================================================================

/// What columns left and right of the processed rect contribute.
#[derive(Debug, Clone, Copy)]
enum OutsideColumns {
    /// Alias the nearest edge column.
    Replicate,
    /// A constant value.
    Constant(u8),
}

/// Running extremum per column: `get(x, j)` is the extremum of rows
/// `y - j ..= y + j` at column `x` for the current row `y`.
struct ColumnExtrema {
    data: Array2<u8>,
    width: isize,
    outside: OutsideColumns,
}

impl ColumnExtrema {
    fn new(width: usize, y_radius: usize, outside: OutsideColumns) -> Self {
        Self {
            data: Array2::zeros((width, y_radius + 1)),
            width: width as isize,
            outside,
        }
    }

    #[inline]
    fn get(&self, x: isize, j: i32) -> u8 {
        if x >= 0 && x < self.width {
            return self.data[[x as usize, j as usize]];
        }
        match self.outside {
            OutsideColumns::Replicate => {
                let x = x.clamp(0, self.width - 1);
                self.data[[x as usize, j as usize]]
            }
            OutsideColumns::Constant(v) => v,
        }
    }

    /// Seed the cache for the row above the rect: entry `j` accumulates
    /// rows `0..=j` of `buf`.
    fn seed(&mut self, buf: &ScanlineRing, combine: fn(u8, u8) -> u8) {
        let y_radius = buf.rows() - 1;
        for (x, &v) in buf.row(0).iter().take(self.width as usize).enumerate() {
            self.data[[x, 0]] = v;
        }
        for j in 1..=y_radius {
            let row = buf.row(j);
            for x in 0..self.width as usize {
                self.data[[x, j]] = combine(row[x], self.data[[x, j - 1]]);
            }
        }
    }

    /// Advance by one row. `buf` row `k` holds image row `y + k`.
    fn update(&mut self, buf: &ScanlineRing, combine: fn(u8, u8) -> u8) {
        let y_radius = buf.rows() - 1;
        for i in (1..=y_radius).rev() {
            let above = buf.row(i - 1);
            let below = buf.row(i);
            for x in 0..self.width as usize {
                self.data[[x, i]] = combine(combine(self.data[[x, i - 1]], above[x]), below[x]);
            }
        }
        for (x, &v) in buf.row(0).iter().take(self.width as usize).enumerate() {
            self.data[[x, 0]] = v;
        }
    }
}

// ============================================================================
// Grow
// ============================================================================

/// Dilate the selection by an elliptical (x_radius, y_radius) element.
#[derive(Debug, Clone, Copy)]
pub struct GrowSelectionFilter {
    x_radius: i32,
    y_radius: i32,
}

impl GrowSelectionFilter {
    pub fn new(x_radius: i32, y_radius: i32) -> Self {
        Self { x_radius, y_radius }
    }

    pub fn x_radius(&self) -> i32 {
        self.x_radius
    }

    pub fn y_radius(&self) -> i32 {
        self.y_radius
    }
}

impl SelectionFilter for GrowSelectionFilter {
    fn name(&self) -> &'static str {
        "Grow Selection"
    }

    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect.adjusted(-self.x_radius, -self.y_radius, self.x_radius, self.y_radius)
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        if self.x_radius <= 0 || self.y_radius <= 0 {
            log::warn!("{}: non-positive radius, skipped", self.name());
            return;
        }
        if rect.is_empty() {
            return;
        }
        log::debug!(
            "{} ({}, {}) over {:?}",
            self.name(),
            self.x_radius,
            self.y_radius,
            rect
        );

        let width = rect.width as usize;
        let height = rect.height;
        let xr = self.x_radius as isize;
        let yr = self.y_radius as usize;

        // caches the region's pixel data; row 0 is the row above the rect
        let mut buf = ScanlineRing::new(yr + 1, width);
        let mut max = ColumnExtrema::new(width, yr, OutsideColumns::Replicate);
        let mut out = vec![0u8; width];
        let circ = compute_border(self.x_radius, self.y_radius);

        // load top of image
        for i in 0..(yr as i32).min(height) {
            selection.read_row(buf.row_mut(i as usize + 1), rect.x, rect.y + i, rect.width);
        }
        max.seed(&buf, u8::max);

        for y in 0..height {
            buf.rotate();
            if y < height - self.y_radius {
                selection.read_row(buf.row_mut(yr), rect.x, rect.y + y + self.y_radius, rect.width);
            } else {
                buf.fill_row(yr, MIN_SELECTED);
            }
            max.update(&buf, u8::max);

            render_max_row(&max, &circ, xr, &mut out);
            selection.write_row(&out, rect.x, rect.y + y, rect.width);
        }
    }
}

/// Maximum over the structuring element for every column of the row.
fn render_max_row(max: &ColumnExtrema, circ: &OffsetBuffer<i32>, xr: isize, out: &mut [u8]) {
    let mut last_max = max.get(0, circ[-1]);
    let mut last_index: isize = 1;

    for (x, o) in out.iter_mut().enumerate() {
        let x = x as isize;
        last_index -= 1;
        if last_index >= 0 {
            // the previous winner is still in reach
            if last_max == MAX_SELECTED {
                *o = MAX_SELECTED;
            } else {
                last_max = 0;
                for i in (0..=xr).rev() {
                    let v = max.get(x + i, circ[i]);
                    if last_max < v {
                        last_max = v;
                        last_index = i;
                    }
                }
                *o = last_max;
            }
        } else {
            last_index = xr;
            last_max = max.get(x + xr, circ[xr]);
            for i in (-xr..xr).rev() {
                let v = max.get(x + i, circ[i]);
                if last_max < v {
                    last_max = v;
                    last_index = i;
                }
            }
            *o = last_max;
        }
    }
}

// ============================================================================
// Shrink
// ============================================================================

/// Erode the selection by an elliptical (x_radius, y_radius) element.
///
/// With `edge_lock` the pixels outside the processed rect are treated as
/// copies of the edge pixels (so an image-wide selection keeps its edges);
/// without it they count as unselected.
#[derive(Debug, Clone, Copy)]
pub struct ShrinkSelectionFilter {
    x_radius: i32,
    y_radius: i32,
    edge_lock: bool,
}

impl ShrinkSelectionFilter {
    pub fn new(x_radius: i32, y_radius: i32, edge_lock: bool) -> Self {
        Self {
            x_radius,
            y_radius,
            edge_lock,
        }
    }

    pub fn edge_lock(&self) -> bool {
        self.edge_lock
    }
}

impl SelectionFilter for ShrinkSelectionFilter {
    fn name(&self) -> &'static str {
        "Shrink Selection"
    }

    /// Edge lock may propagate edge pixels arbitrarily far, so it needs the
    /// whole image. Without it, zero fill needs nothing beyond `rect`.
    fn change_rect(&self, rect: Rect, default_bounds: &DefaultBounds) -> Rect {
        if self.edge_lock {
            default_bounds.image_border_rect()
        } else {
            rect
        }
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        if self.x_radius <= 0 || self.y_radius <= 0 {
            log::warn!("{}: non-positive radius, skipped", self.name());
            return;
        }
        if rect.is_empty() {
            return;
        }
        log::debug!(
            "{} ({}, {}, edge lock {}) over {:?}",
            self.name(),
            self.x_radius,
            self.y_radius,
            self.edge_lock,
            rect
        );

        let width = rect.width as usize;
        let height = rect.height;
        let xr = self.x_radius as isize;
        let yr = self.y_radius as usize;

        let outside = if self.edge_lock {
            OutsideColumns::Replicate
        } else {
            OutsideColumns::Constant(MIN_SELECTED)
        };

        // caches the region's pixels; row 0 is the row above the rect
        let mut buf = ScanlineRing::new(yr + 1, width);
        let mut min = ColumnExtrema::new(width, yr, outside);
        let mut out = vec![0u8; width];
        let circ = compute_border(self.x_radius, self.y_radius);

        // load top of image
        for i in 0..(yr as i32).min(height) {
            selection.read_row(buf.row_mut(i as usize + 1), rect.x, rect.y + i, rect.width);
        }
        if self.edge_lock {
            buf.copy_row(1, 0);
        } else {
            buf.fill_row(0, MIN_SELECTED);
        }
        min.seed(&buf, u8::min);

        for y in 0..height {
            buf.rotate();
            if y < height - self.y_radius {
                selection.read_row(buf.row_mut(yr), rect.x, rect.y + y + self.y_radius, rect.width);
            } else if self.edge_lock {
                buf.copy_row(yr - 1, yr);
            } else {
                buf.fill_row(yr, MIN_SELECTED);
            }
            min.update(&buf, u8::min);

            render_min_row(&min, &circ, xr, &mut out);
            selection.write_row(&out, rect.x, rect.y + y, rect.width);
        }
    }
}

/// Minimum over the structuring element for every column of the row.
fn render_min_row(min: &ColumnExtrema, circ: &OffsetBuffer<i32>, xr: isize, out: &mut [u8]) {
    let mut last_min = min.get(0, circ[-1]);
    let mut last_index: isize = 0;

    for (x, o) in out.iter_mut().enumerate() {
        let x = x as isize;
        last_index -= 1;
        if last_index >= 0 {
            if last_min == MIN_SELECTED {
                *o = MIN_SELECTED;
            } else {
                last_min = MAX_SELECTED;
                for i in (0..=xr).rev() {
                    let v = min.get(x + i, circ[i]);
                    if last_min > v {
                        last_min = v;
                        last_index = i;
                    }
                }
                *o = last_min;
            }
        } else {
            last_index = xr;
            last_min = min.get(x + xr, circ[xr]);
            for i in (-xr..xr).rev() {
                let v = min.get(x + i, circ[i]);
                if last_min > v {
                    last_min = v;
                    last_index = i;
                }
            }
            *o = last_min;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMask;
    use ndarray::Array2;
    use pretty_assertions::assert_eq;

    fn square(size: usize, from: usize, to: usize) -> Array2<u8> {
        Array2::from_shape_fn((size, size), |(y, x)| {
            if (from..=to).contains(&y) && (from..=to).contains(&x) {
                255
            } else {
                0
            }
        })
    }

    fn run(filter: &dyn SelectionFilter, input: Array2<u8>) -> Array2<u8> {
        let mut mask = SelectionMask::from_array(input);
        let rect = mask.default_bounds().bounds();
        filter.process(&mut mask, rect);
        mask.to_array(rect)
    }

    #[test]
    fn test_grow_single_pixel_makes_disc() {
        let mut img = Array2::<u8>::zeros((10, 10));
        img[[5, 5]] = 255;

        let result = run(&GrowSelectionFilter::new(2, 2), img);

        for y in 0..10i32 {
            for x in 0..10i32 {
                let (dx, dy) = (x - 5, y - 5);
                let reach = match dx.abs() {
                    0 | 1 => 2,
                    2 => 1,
                    _ => -1,
                };
                let expected = if dy.abs() <= reach { 255 } else { 0 };
                assert_eq!(result[[y as usize, x as usize]], expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_grow_keeps_partial_values() {
        let mut img = Array2::<u8>::zeros((5, 5));
        img[[2, 2]] = 100;
        let result = run(&GrowSelectionFilter::new(1, 1), img);
        assert_eq!(result[[1, 1]], 100);
        assert_eq!(result[[3, 3]], 100);
        assert_eq!(result[[0, 0]], 0);
    }

    #[test]
    fn test_grow_zero_radius_is_noop() {
        let img = square(8, 3, 4);
        let result = run(&GrowSelectionFilter::new(0, 3), img.clone());
        assert_eq!(result, img);
    }

    #[test]
    fn test_shrink_square() {
        let result = run(&ShrinkSelectionFilter::new(2, 2, false), square(20, 5, 14));
        assert_eq!(result, square(20, 7, 12));
    }

    #[test]
    fn test_shrink_edge_lock_keeps_image_edges() {
        let full = Array2::from_elem((10, 10), 255u8);

        let locked = run(&ShrinkSelectionFilter::new(2, 2, true), full.clone());
        assert!(locked.iter().all(|&v| v == 255));

        let unlocked = run(&ShrinkSelectionFilter::new(2, 2, false), full);
        assert_eq!(unlocked, square(10, 2, 7));
    }

    #[test]
    fn test_shrink_change_rect() {
        let bounds = DefaultBounds::new(Rect::new(0, 0, 200, 200));
        let rect = Rect::new(0, 0, 50, 50);
        assert_eq!(
            ShrinkSelectionFilter::new(3, 3, true).change_rect(rect, &bounds),
            Rect::new(0, 0, 200, 200)
        );
        assert_eq!(ShrinkSelectionFilter::new(3, 3, false).change_rect(rect, &bounds), rect);
        assert_eq!(
            GrowSelectionFilter::new(3, 2).change_rect(rect, &bounds),
            Rect::new(-3, -2, 56, 54)
        );
    }

    #[test]
    fn test_closing_and_opening_bounds() {
        let x = square(20, 7, 12);

        let grown = run(&GrowSelectionFilter::new(2, 2), x.clone());
        let closed = run(&ShrinkSelectionFilter::new(2, 2, false), grown);
        for (c, o) in closed.iter().zip(x.iter()) {
            assert!(c >= o);
        }

        let shrunk = run(&ShrinkSelectionFilter::new(2, 2, false), x.clone());
        let opened = run(&GrowSelectionFilter::new(2, 2), shrunk);
        for (o, orig) in opened.iter().zip(x.iter()) {
            assert!(o <= orig);
        }
    }
}

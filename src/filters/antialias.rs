//! Anti-alias: smooth jagged selection edges.
//!
//! For each pixel the filter measures weighted 3-tap gradients towards its
//! four neighbours. Pixels below [`EDGE_THRESHOLD`] pass through. Otherwise
//! the dominant axis picks the edge neighbour, and the filter walks along
//! the edge in both directions (up to [`SPAN_REACH`] pixels, in the strides
//! of [`STEP_OFFSETS`]) looking for the points where the edge leaves the
//! local average: the span extremes. The pixel is then blended with its edge
//! neighbour according to its relative position inside the span.
//!
//! Uncertain cases (extreme beyond the search reach, right-angled corners,
//! extremes on the wrong side of the edge) leave the pixel untouched.

use super::scanline::ScanlineRing;
use super::SelectionFilter;
use crate::selection::{PixelSelection, Rect};

/// Gradient below which a jagged edge is not noticeable.
pub const EDGE_THRESHOLD: i32 = 4;

/// Strides of the span search; their sum is the search reach.
pub const STEP_OFFSETS: [i32; 11] = [1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 8];

/// Farthest distance the span search looks along an edge.
pub const SPAN_REACH: i32 = 25;

const HORIZONTAL_BORDER: usize = SPAN_REACH as usize;
const VERTICAL_BORDER: usize = SPAN_REACH as usize;
const NUMBER_OF_SCANLINES: usize = 2 * VERTICAL_BORDER + 1;
const CURRENT_SCANLINE: i32 = VERTICAL_BORDER as i32;

#[derive(Debug, Clone, Copy, Default)]
pub struct AntiAliasSelectionFilter;

/// Walk direction along an edge: the perpendicular neighbour lies
/// `pixel_offset` rows away (horizontal span) or columns away (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanAxis {
    pub pixel_offset: i32,
    pub row_multiplier: i32,
    pub col_multiplier: i32,
}

impl SpanAxis {
    /// Edge runs along the row; the neighbour is above (-1) or below (1).
    pub fn horizontal(pixel_offset: i32) -> Self {
        Self {
            pixel_offset,
            row_multiplier: 0,
            col_multiplier: 1,
        }
    }

    /// Edge runs along the column; the neighbour is left (-1) or right (1).
    pub fn vertical(pixel_offset: i32) -> Self {
        Self {
            pixel_offset,
            row_multiplier: 1,
            col_multiplier: 0,
        }
    }
}

/// One end of the span around the current pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanExtreme {
    /// Distance from the current pixel.
    pub distance: i32,
    /// Difference between the end samples' mean and the local average.
    pub pixel_diff: i32,
    /// False when the end looks like a corner of the shape.
    pub valid: bool,
}

/// Padded window of scanlines centred on the current row.
struct Window<'a> {
    ring: &'a ScanlineRing,
}

impl Window<'_> {
    /// Sample at ring row `row`, padded column `col`.
    #[inline]
    fn at(&self, row: i32, col: i32) -> i32 {
        self.ring.row(row as usize)[col as usize] as i32
    }
}

/// Search one direction (`-1` or `1`) along `axis` from column `x`.
fn find_span_extreme(
    window: &Window<'_>,
    x: i32,
    axis: SpanAxis,
    direction: i32,
    pixel_avg: i32,
    scaled_gradient: i32,
    current_pixel_diff: i32,
) -> SpanExtreme {
    let SpanAxis {
        pixel_offset,
        row_multiplier,
        col_multiplier,
    } = axis;
    let mut extreme = SpanExtreme {
        distance: 0,
        pixel_diff: 0,
        valid: true,
    };

    for step in STEP_OFFSETS {
        extreme.distance += step;
        let row1 = CURRENT_SCANLINE + direction * extreme.distance * row_multiplier;
        let col1 = x + HORIZONTAL_BORDER as i32 + direction * extreme.distance * col_multiplier;
        let row2 = row1 + pixel_offset * col_multiplier;
        let col2 = col1 + pixel_offset * row_multiplier;
        let pixel1 = window.at(row1, col1);
        let pixel2 = window.at(row2, col2);

        extreme.pixel_diff = ((pixel1 + pixel2) >> 1) - pixel_avg;
        if extreme.pixel_diff.abs() > scaled_gradient {
            // Jagged border or right-angled part of the shape?
            let same_side = (current_pixel_diff < 0 && extreme.pixel_diff < 0)
                || (current_pixel_diff > 0 && extreme.pixel_diff > 0);
            let pixel_diff2 = if same_side {
                let pixel3 = window.at(row2 + pixel_offset * col_multiplier, col2 + pixel_offset * row_multiplier);
                ((pixel2 + pixel3) >> 1) - pixel_avg
            } else {
                let pixel3 = window.at(row1 - pixel_offset * col_multiplier, col1 - pixel_offset * row_multiplier);
                ((pixel1 + pixel3) >> 1) - pixel_avg
            };
            extreme.valid = pixel_diff2.abs() <= scaled_gradient;
            break;
        }
    }

    extreme
}

/// Search both directions along `axis`; returns (negative, positive).
fn find_span_extremes(
    window: &Window<'_>,
    x: i32,
    axis: SpanAxis,
    pixel_avg: i32,
    scaled_gradient: i32,
    current_pixel_diff: i32,
) -> (SpanExtreme, SpanExtreme) {
    (
        find_span_extreme(window, x, axis, -1, pixel_avg, scaled_gradient, current_pixel_diff),
        find_span_extreme(window, x, axis, 1, pixel_avg, scaled_gradient, current_pixel_diff),
    )
}

/// Blend factor (out of 256) towards the current pixel, or `None` when the
/// pixel must not be smoothed.
///
/// The nearer span end decides: it must be valid and lie on the other side
/// of the local average than the current pixel.
pub fn interpolation_value(negative: &SpanExtreme, positive: &SpanExtreme, current_pixel_diff: i32) -> Option<i32> {
    let nearer = if negative.distance < positive.distance {
        negative
    } else {
        positive
    };
    if !nearer.valid || (current_pixel_diff < 0) == (nearer.pixel_diff < 0) {
        return None;
    }
    let span_length = negative.distance + positive.distance;
    if span_length <= 0 {
        return None;
    }
    let value = ((nearer.distance << 8) / span_length) + 128;
    (value >= 0).then_some(value)
}

/// Anti-aliased value of padded column `x + HORIZONTAL_BORDER` of the
/// window's current row.
fn antialias_pixel(window: &Window<'_>, x: i32) -> u8 {
    let c = x + HORIZONTAL_BORDER as i32;
    let (n, m, s) = (CURRENT_SCANLINE - 1, CURRENT_SCANLINE, CURRENT_SCANLINE + 1);

    let pixel_nw = window.at(n, c - 1);
    let pixel_n = window.at(n, c);
    let pixel_ne = window.at(n, c + 1);
    let pixel_w = window.at(m, c - 1);
    let pixel_m = window.at(m, c);
    let pixel_e = window.at(m, c + 1);
    let pixel_sw = window.at(s, c - 1);
    let pixel_s = window.at(s, c);
    let pixel_se = window.at(s, c + 1);

    let row_n_sum = (pixel_nw >> 2) + (pixel_n >> 1) + (pixel_ne >> 2);
    let row_m_sum = (pixel_w >> 2) + (pixel_m >> 1) + (pixel_e >> 2);
    let row_s_sum = (pixel_sw >> 2) + (pixel_s >> 1) + (pixel_se >> 2);
    let col_w_sum = (pixel_nw >> 2) + (pixel_w >> 1) + (pixel_sw >> 2);
    let col_m_sum = (pixel_n >> 2) + (pixel_m >> 1) + (pixel_s >> 2);
    let col_e_sum = (pixel_ne >> 2) + (pixel_e >> 1) + (pixel_se >> 2);

    let gradient_n = (row_m_sum - row_n_sum).abs();
    let gradient_s = (row_s_sum - row_m_sum).abs();
    let gradient_w = (col_m_sum - col_w_sum).abs();
    let gradient_e = (col_e_sum - col_m_sum).abs();

    let max_gradient_ns = gradient_n.max(gradient_s);
    let max_gradient_we = gradient_w.max(gradient_e);
    if max_gradient_ns.max(max_gradient_we) < EDGE_THRESHOLD {
        return pixel_m as u8;
    }

    let (neighbor, gradient, axis) = if max_gradient_ns > max_gradient_we {
        if gradient_n > gradient_s {
            (pixel_n, gradient_n, SpanAxis::horizontal(-1))
        } else {
            (pixel_s, gradient_s, SpanAxis::horizontal(1))
        }
    } else if gradient_w > gradient_e {
        (pixel_w, gradient_w, SpanAxis::vertical(-1))
    } else {
        (pixel_e, gradient_e, SpanAxis::vertical(1))
    };

    let pixel_avg = (neighbor + pixel_m) >> 1;
    let current_pixel_diff = pixel_m - pixel_avg;
    let (negative, positive) = find_span_extremes(window, x, axis, pixel_avg, gradient >> 2, current_pixel_diff);

    match interpolation_value(&negative, &positive, current_pixel_diff) {
        Some(value) => (neighbor + (((pixel_m - neighbor) * value) >> 8)) as u8,
        None => pixel_m as u8,
    }
}

impl SelectionFilter for AntiAliasSelectionFilter {
    fn name(&self) -> &'static str {
        "Anti-Alias Selection"
    }

    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        log::debug!("{} over {:?}", self.name(), rect);

        let default_pixel = selection.default_pixel();
        let width = rect.width as usize;
        let height = rect.height as usize;
        let bytes_per_scanline = width + 2 * HORIZONTAL_BORDER;
        let padded_stride = bytes_per_scanline.div_ceil(8) * 8;
        log::trace!("anti-alias window {}x{}", padded_stride, NUMBER_OF_SCANLINES);

        // Borders keep the default pixel: rows are only ever read into the
        // middle span.
        let mut scanlines = ScanlineRing::filled(NUMBER_OF_SCANLINES, padded_stride, default_pixel);
        let middle = HORIZONTAL_BORDER..HORIZONTAL_BORDER + width;

        let first_rows = height.min(NUMBER_OF_SCANLINES - VERTICAL_BORDER);
        for i in 0..first_rows {
            let row = &mut scanlines.row_mut(VERTICAL_BORDER + i)[middle.clone()];
            selection.read_row(row, rect.x, rect.y + i as i32, rect.width);
        }

        let mut out = vec![0u8; width];
        for y in 0..height {
            if y > 0 {
                scanlines.rotate();
                let last = NUMBER_OF_SCANLINES - 1;
                if y + VERTICAL_BORDER < height {
                    let row = &mut scanlines.row_mut(last)[middle.clone()];
                    selection.read_row(row, rect.x, rect.y + (y + VERTICAL_BORDER) as i32, rect.width);
                } else {
                    scanlines.fill_row(last, default_pixel);
                }
            }

            let window = Window { ring: &scanlines };
            for (x, o) in out.iter_mut().enumerate() {
                *o = antialias_pixel(&window, x as i32);
            }
            selection.write_row(&out, rect.x, rect.y + y as i32, rect.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMask;
    use ndarray::Array2;
    use pretty_assertions::assert_eq;

    fn run(input: Array2<u8>) -> Array2<u8> {
        let mut mask = SelectionMask::from_array(input);
        let rect = mask.default_bounds().bounds();
        AntiAliasSelectionFilter.process(&mut mask, rect);
        mask.to_array(rect)
    }

    /// Horizontal edge at row 10 for x < 20, stepping down to row 11 after.
    fn step_edge() -> Array2<u8> {
        Array2::from_shape_fn((24, 40), |(y, x)| {
            if (x < 20 && y >= 10) || y >= 11 {
                255
            } else {
                0
            }
        })
    }

    #[test]
    fn test_step_offsets_cover_reach() {
        assert_eq!(STEP_OFFSETS.iter().sum::<i32>(), SPAN_REACH);
    }

    #[test]
    fn test_empty_mask_unchanged() {
        let result = run(Array2::zeros((30, 30)));
        assert!(result.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_flat_plane_unchanged() {
        let bounds = Rect::new(0, 0, 12, 12);
        let mut mask = SelectionMask::with_default_pixel(255, bounds);
        mask.write_bytes(&[255u8; 144], 0, 0, 12, 12);

        AntiAliasSelectionFilter.process(&mut mask, bounds);

        assert!(mask.to_array(bounds).iter().all(|&v| v == 255));
    }

    #[test]
    fn test_step_is_smoothed() {
        let input = step_edge();
        let result = run(input.clone());

        // Corner pixels of the step blend towards their edge neighbours.
        assert_eq!(result[[10, 19]], 136);
        assert_eq!(result[[10, 20]], 118);
        // Far from the edge nothing changes.
        assert_eq!(result[[5, 5]], 0);
        assert_eq!(result[[15, 10]], 255);
        assert_eq!(result[[16, 30]], 255);
    }

    #[test]
    fn test_interpolation_value_prefers_nearer_end() {
        let near = SpanExtreme {
            distance: 1,
            pixel_diff: -127,
            valid: true,
        };
        let far = SpanExtreme {
            distance: 25,
            pixel_diff: -127,
            valid: false,
        };
        assert_eq!(interpolation_value(&far, &near, 128), Some(137));
        // Same side of the average as the current pixel: no smoothing.
        assert_eq!(interpolation_value(&far, &near, -128), None);
        // Nearer end invalid.
        let corner = SpanExtreme { valid: false, ..near };
        assert_eq!(interpolation_value(&corner, &far, 128), None);
    }
}

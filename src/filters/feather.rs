//! Feather: Gaussian softening of the selection edge.
//!
//! A separable blur with a `2 * radius + 1` tap kernel. The horizontal pass
//! writes into a scratch mask, the vertical pass writes back into the
//! selection. Samples beyond the image repeat the nearest edge.

use ndarray::Array2;
use std::f64::consts::PI;

use super::convolution::{apply_kernel, BorderMode, ConvolutionKernel};
use super::SelectionFilter;
use crate::selection::{DefaultBounds, PixelSelection, Rect, SelectionMask};

/// Gaussian feather of the given radius.
#[derive(Debug, Clone, Copy)]
pub struct FeatherSelectionFilter {
    radius: i32,
}

impl FeatherSelectionFilter {
    pub fn new(radius: i32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }
}

/// Un-normalised Gaussian weights for offsets `-radius..=radius`.
///
/// # Returns
/// `(weights, sum)`; divide by `sum` to normalise.
pub fn feather_kernel(radius: i32) -> (Vec<f64>, f64) {
    if radius <= 0 {
        return (vec![1.0], 1.0);
    }
    let r2 = (radius as f64) * (radius as f64);
    let multiplicand = 1.0 / (2.0 * PI * r2);
    let exponent_multiplicand = 1.0 / (2.0 * r2);

    let weights: Vec<f64> = (-radius..=radius)
        .map(|d| {
            let d2 = (d as f64) * (d as f64);
            multiplicand * (-(d2 + r2) * exponent_multiplicand).exp()
        })
        .collect();
    let sum = weights.iter().sum();
    (weights, sum)
}

impl SelectionFilter for FeatherSelectionFilter {
    fn name(&self) -> &'static str {
        "Feather Selection"
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

        let (weights, sum) = feather_kernel(self.radius);
        let taps = weights.len();
        let Ok(matrix) = Array2::from_shape_vec((1, taps), weights) else {
            return;
        };
        let horizontal = ConvolutionKernel::from_matrix(matrix, 0.0, sum);
        let vertical = horizontal.transposed();

        // The vertical pass reads `radius` rows above and below the rect.
        let mut interm = SelectionMask::like(&*selection);
        let horizontal_rect = rect.adjusted(0, -self.radius, 0, self.radius);
        apply_kernel(&horizontal, &*selection, &mut interm, horizontal_rect, BorderMode::Repeat);
        apply_kernel(&vertical, &interm, selection, rect, BorderMode::Repeat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(filter: &dyn SelectionFilter, input: Array2<u8>) -> Array2<u8> {
        let mut mask = SelectionMask::from_array(input);
        let rect = mask.default_bounds().bounds();
        filter.process(&mut mask, rect);
        mask.to_array(rect)
    }

    #[test]
    fn test_kernel_is_symmetric_and_peaked() {
        let (weights, sum) = feather_kernel(3);
        assert_eq!(weights.len(), 7);
        for i in 0..3 {
            assert!((weights[i] - weights[6 - i]).abs() < 1e-12);
            assert!(weights[i] < weights[i + 1]);
        }
        assert!((weights.iter().sum::<f64>() - sum).abs() < 1e-12);
    }

    #[test]
    fn test_zero_radius_is_noop() {
        let input = Array2::from_shape_fn((6, 6), |(y, x)| if x > y { 255 } else { 0 });
        let result = run(&FeatherSelectionFilter::new(0), input.clone());
        assert_eq!(result, input);
    }

    #[test]
    fn test_flat_regions_unchanged() {
        let full = run(&FeatherSelectionFilter::new(2), Array2::from_elem((8, 8), 255u8));
        assert!(full.iter().all(|&v| v == 255));
        let empty = run(&FeatherSelectionFilter::new(2), Array2::<u8>::zeros((8, 8)));
        assert!(empty.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_vertical_edge_becomes_ramp() {
        let input = Array2::from_shape_fn((8, 16), |(_, x)| if x < 8 { 255 } else { 0 });
        let result = run(&FeatherSelectionFilter::new(3), input);

        for row in result.rows() {
            assert_eq!(row[0], 255);
            assert_eq!(row[15], 0);
            assert!(row[7] > 0 && row[7] < 255);
            assert!(row[8] > 0 && row[8] < 255);
            for x in 1..16 {
                assert!(row[x] <= row[x - 1]);
            }
        }
    }

    #[test]
    fn test_change_rect_expands_by_radius() {
        let bounds = DefaultBounds::new(Rect::new(0, 0, 100, 100));
        let filter = FeatherSelectionFilter::new(4);
        assert_eq!(filter.change_rect(Rect::new(10, 10, 5, 5), &bounds), Rect::new(6, 6, 13, 13));
    }
}

//! Structuring-element tables and the binary transition detector.
//!
//! - [`compute_border`]: vertical half-extent of an elliptical structuring
//!   element for every horizontal offset.
//! - [`DensityTable`]: per-offset coverage of the border shell, either a
//!   hard ellipse or an anti-aliased ring.
//! - [`compute_transition`]: marks selected pixels that touch an unselected
//!   neighbour.

use super::scanline::OffsetBuffer;

/// Vertical half-extent of the (x_radius, y_radius) ellipse for every
/// horizontal offset in `[-x_radius, x_radius]`.
///
/// Uses half-pixel centred distances:
/// `round(y_radius * sqrt(x_radius² - (|i| - 0.5)²) / x_radius)`, with the
/// centre column at full height.
pub fn compute_border(x_radius: i32, y_radius: i32) -> OffsetBuffer<i32> {
    let xr = x_radius as isize;
    let mut circ = OffsetBuffer::new(-xr, xr + 1, 0i32);
    let divisor = if x_radius == 0 { 1.0 } else { x_radius as f64 };

    for i in -xr..=xr {
        let tmp = if i == 0 { 0.0 } else { i.unsigned_abs() as f64 - 0.5 };
        let xr2 = (x_radius as f64) * (x_radius as f64);
        let extent = y_radius as f64 * (xr2 - tmp * tmp).sqrt() / divisor;
        circ[i] = (extent + 0.5).floor() as i32;
    }

    circ
}

// ============================================================================
// Density Table
// ============================================================================

/// Coverage of a border shell at offset (dx, dy), for
/// `dx` in `[-x_radius, x_radius]` and `dy` in `[-y_radius, y_radius]`.
#[derive(Debug, Clone)]
pub struct DensityTable {
    x_radius: i32,
    y_radius: i32,
    data: Vec<u8>,
}

impl DensityTable {
    fn from_quadrant(x_radius: i32, y_radius: i32, quadrant: impl Fn(i32, i32) -> u8) -> Self {
        let w = (2 * x_radius + 1) as usize;
        let h = (2 * y_radius + 1) as usize;
        let mut table = Self {
            x_radius,
            y_radius,
            data: vec![0; w * h],
        };
        for x in 0..=x_radius {
            for y in 0..=y_radius {
                let a = quadrant(x, y);
                table.set(x, y, a);
                table.set(x, -y, a);
                table.set(-x, y, a);
                table.set(-x, -y, a);
            }
        }
        table
    }

    /// Hard-edged ellipse: 255 where the half-pixel-offset point lies
    /// inside the (x_radius, y_radius) ellipse, 0 elsewhere.
    pub fn elliptical(x_radius: i32, y_radius: i32) -> Self {
        let xr2 = (x_radius as f64).powi(2);
        let yr2 = (y_radius as f64).powi(2);
        Self::from_quadrant(x_radius, y_radius, |x, y| {
            let tx = if x > 0 { x as f64 - 0.5 } else { 0.0 };
            let ty = if y > 0 { y as f64 - 0.5 } else { 0.0 };
            let dist = ty * ty / yr2 + tx * tx / xr2;
            if dist <= 1.0 {
                255
            } else {
                0
            }
        })
    }

    /// Anti-aliased disc: opaque up to `max_radius - 1`, a linear ramp down
    /// to zero at `max_radius`. Only meaningful for isotropic radii.
    pub fn antialiased(x_radius: i32, y_radius: i32) -> Self {
        let max_radius = 0.5 * (x_radius + y_radius) as f64;
        let min_radius = max_radius - 1.0;
        Self::from_quadrant(x_radius, y_radius, |x, y| {
            let dist = ((x * x + y * y) as f64).sqrt();
            if dist > max_radius {
                0
            } else if dist > min_radius {
                ((1.0 - dist + min_radius) * 255.0).round() as u8
            } else {
                255
            }
        })
    }

    #[inline]
    fn slot(&self, x: i32, y: i32) -> usize {
        let w = (2 * self.x_radius + 1) as usize;
        (y + self.y_radius) as usize * w + (x + self.x_radius) as usize
    }

    fn set(&mut self, x: i32, y: i32, value: u8) {
        let slot = self.slot(x, y);
        self.data[slot] = value;
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.data[self.slot(x, y)]
    }
}

// ============================================================================
// Transition Detector
// ============================================================================

/// Mark every centre-row pixel that is selected (>= 128) and has at least
/// one unselected (< 128) neighbour among the in-range pixels of the 3×3
/// block formed by `top`, `middle` and `bottom`.
///
/// All rows must hold at least `width` samples; `transition[..width]` is
/// overwritten with 255 (edge) or 0.
pub fn compute_transition(transition: &mut [u8], top: &[u8], middle: &[u8], bottom: &[u8], width: usize) {
    if width == 0 {
        return;
    }

    if width == 1 {
        transition[0] = if middle[0] > 127 && (top[0] < 128 || bottom[0] < 128) {
            255
        } else {
            0
        };
        return;
    }

    let low = |v: u8| v < 128;

    // First column: no left neighbours.
    transition[0] = if middle[0] >= 128
        && (low(top[0]) || low(top[1]) || low(middle[1]) || low(bottom[0]) || low(bottom[1]))
    {
        255
    } else {
        0
    };

    for x in 1..width - 1 {
        transition[x] = if middle[x] >= 128
            && (low(top[x - 1])
                || low(top[x])
                || low(top[x + 1])
                || low(middle[x - 1])
                || low(middle[x + 1])
                || low(bottom[x - 1])
                || low(bottom[x])
                || low(bottom[x + 1]))
        {
            255
        } else {
            0
        };
    }

    // Last column: no right neighbours.
    let x = width - 1;
    transition[x] = if middle[x] >= 128
        && (low(top[x - 1]) || low(top[x]) || low(middle[x - 1]) || low(bottom[x - 1]) || low(bottom[x]))
    {
        255
    } else {
        0
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_border_radius_two() {
        let circ = compute_border(2, 2);
        // |i| = 2: round(2 * sqrt(4 - 2.25) / 2) = round(1.32) = 1
        // |i| = 1: round(sqrt(4 - 0.25)) = round(1.94) = 2
        assert_eq!(circ[-2], 1);
        assert_eq!(circ[-1], 2);
        assert_eq!(circ[0], 2);
        assert_eq!(circ[1], 2);
        assert_eq!(circ[2], 1);
    }

    #[test]
    fn test_compute_border_anisotropic() {
        let circ = compute_border(1, 3);
        // |i| = 1: round(3 * sqrt(1 - 0.25)) = round(2.6) = 3
        assert_eq!(circ[-1], 3);
        assert_eq!(circ[0], 3);
        assert_eq!(circ[1], 3);
    }

    #[test]
    fn test_elliptical_density_is_symmetric() {
        let table = DensityTable::elliptical(3, 2);
        assert_eq!(table.get(0, 0), 255);
        for x in -3..=3 {
            for y in -2..=2 {
                assert_eq!(table.get(x, y), table.get(-x, -y));
            }
        }
        // (2.5² / 9) + (1.5² / 4) = 0.69 + 0.56 > 1
        assert_eq!(table.get(3, 2), 0);
    }

    #[test]
    fn test_antialiased_density_ramp() {
        let table = DensityTable::antialiased(3, 3);
        assert_eq!(table.get(0, 0), 255);
        assert_eq!(table.get(2, 0), 255);
        // dist 3 sits exactly on max radius: (1 - 3 + 2) * 255 = 0
        assert_eq!(table.get(3, 0), 0);
        // dist sqrt(5) ~ 2.236: (1 - 2.236 + 2) * 255 ~ 194.8
        assert_eq!(table.get(2, 1), 195);
        assert_eq!(table.get(3, 3), 0);
    }

    #[test]
    fn test_transition_marks_edge_pixels() {
        let top = [0, 0, 0, 0];
        let middle = [255, 255, 255, 255];
        let bottom = [255, 255, 255, 255];
        let mut out = [9u8; 4];
        compute_transition(&mut out, &top, &middle, &bottom, 4);
        assert_eq!(out, [255; 4]);

        let full = [255u8; 4];
        compute_transition(&mut out, &full, &full, &full, 4);
        assert_eq!(out, [0; 4]);

        let row = [0, 255, 255, 255];
        compute_transition(&mut out, &full, &row, &full, 4);
        assert_eq!(out, [0, 255, 0, 0]);
    }

    #[test]
    fn test_transition_single_column() {
        let mut out = [0u8; 1];
        compute_transition(&mut out, &[0], &[200], &[255], 1);
        assert_eq!(out, [255]);
        compute_transition(&mut out, &[255], &[200], &[255], 1);
        assert_eq!(out, [0]);
    }
}

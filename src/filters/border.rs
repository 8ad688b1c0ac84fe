//! Border selection: replace the selection by a shell around its edge.
//!
//! The filter combines three pieces:
//! 1. a binary transition detector ([`compute_transition`]) marking selected
//!    pixels next to unselected ones,
//! 2. a per-column distance to the nearest transition within the vertical
//!    reach, updated incrementally row by row,
//! 3. a [`DensityTable`] mapping (dx, dy) offsets to shell coverage, either
//!    a hard ellipse or an anti-aliased ramp.
//!
//! Radius (1, 1) skips the distance machinery and emits the transition
//! mask directly.

use super::border_table::{compute_transition, DensityTable};
use super::scanline::{OffsetBuffer, ScanlineRing};
use super::SelectionFilter;
use crate::error::{Result, SelectionError};
use crate::selection::{DefaultBounds, PixelSelection, Rect};

/// Turn the selection into a band of (x_radius, y_radius) around its edge.
#[derive(Debug, Clone, Copy)]
pub struct BorderSelectionFilter {
    x_radius: i32,
    y_radius: i32,
    antialiasing: bool,
}

impl BorderSelectionFilter {
    /// Anti-aliased borders need isotropic radii.
    pub fn new(x_radius: i32, y_radius: i32, antialiasing: bool) -> Result<Self> {
        if antialiasing && x_radius != y_radius {
            return Err(SelectionError::AnisotropicAntialiasing { x_radius, y_radius });
        }
        Ok(Self {
            x_radius,
            y_radius,
            antialiasing,
        })
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    /// Radius (1, 1): write the transition mask of every row.
    fn process_unit_radius(&self, selection: &mut dyn PixelSelection, rect: Rect) {
        let width = rect.width as usize;
        let height = rect.height;

        let mut source = ScanlineRing::new(3, width);
        let mut transition = vec![0u8; width];

        selection.read_row(source.row_mut(0), rect.x, rect.y, rect.width);
        source.copy_row(0, 1);
        if height > 1 {
            selection.read_row(source.row_mut(2), rect.x, rect.y + 1, rect.width);
        } else {
            source.copy_row(1, 2);
        }

        compute_transition(&mut transition, source.row(0), source.row(1), source.row(2), width);
        selection.write_row(&transition, rect.x, rect.y, rect.width);

        for y in 1..height {
            source.rotate();
            if y + 1 < height {
                selection.read_row(source.row_mut(2), rect.x, rect.y + y + 1, rect.width);
            } else {
                source.copy_row(1, 2);
            }
            compute_transition(&mut transition, source.row(0), source.row(1), source.row(2), width);
            selection.write_row(&transition, rect.x, rect.y + y, rect.width);
        }
    }
}

impl SelectionFilter for BorderSelectionFilter {
    fn name(&self) -> &'static str {
        "Border Selection"
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
            "{} ({}, {}, antialiasing {}) over {:?}",
            self.name(),
            self.x_radius,
            self.y_radius,
            self.antialiasing,
            rect
        );

        if self.x_radius == 1 && self.y_radius == 1 {
            self.process_unit_radius(selection, rect);
            return;
        }

        let width = rect.width as usize;
        let height = rect.height;
        let xr = self.x_radius;
        let yr = self.y_radius;
        let pad = xr as usize;

        // Signed row distance to the nearest transition per column; values
        // outside [-yr, yr] mean "none in reach".
        let mut max = OffsetBuffer::new(-(xr as isize), (width + 2 * pad) as isize - xr as isize, yr + 2);
        let mut buf = ScanlineRing::new(3, width);
        // Transition rows are padded by x_radius zero columns on each side.
        let mut transition = ScanlineRing::new(yr as usize + 1, width + 2 * pad);
        let mut out = vec![0u8; width];
        let span = pad..pad + width;

        let density = if self.antialiasing {
            DensityTable::antialiased(xr, yr)
        } else {
            DensityTable::elliptical(xr, yr)
        };

        selection.read_row(buf.row_mut(0), rect.x, rect.y, rect.width);
        buf.copy_row(0, 1);
        if height > 1 {
            selection.read_row(buf.row_mut(2), rect.x, rect.y + 1, rect.width);
        } else {
            buf.copy_row(1, 2);
        }
        compute_transition(&mut transition.row_mut(1)[span.clone()], buf.row(0), buf.row(1), buf.row(2), width);

        // set up top of image
        let mut y = 1;
        while y < yr && y + 1 < height {
            buf.rotate();
            selection.read_row(buf.row_mut(2), rect.x, rect.y + y + 1, rect.width);
            compute_transition(
                &mut transition.row_mut(y as usize + 1)[span.clone()],
                buf.row(0),
                buf.row(1),
                buf.row(2),
                width,
            );
            y += 1;
        }

        // set up max[] for top of image
        for x in 0..width {
            let xi = x as isize;
            max[xi] = -(yr + 7);
            for j in 1..=yr as usize {
                if transition.row(j)[pad + x] != 0 {
                    max[xi] = j as i32;
                    break;
                }
            }
        }

        for y in 0..height {
            buf.rotate();
            transition.rotate();
            if y < height - (yr + 1) {
                selection.read_row(buf.row_mut(2), rect.x, rect.y + y + yr + 1, rect.width);
                compute_transition(
                    &mut transition.row_mut(yr as usize)[span.clone()],
                    buf.row(0),
                    buf.row(1),
                    buf.row(2),
                    width,
                );
            } else {
                transition.copy_span(yr as usize - 1, yr as usize, span.clone());
            }

            update_transition_distance(&mut max, &transition, pad, width, yr);
            render_border_row(&max, &density, xr, yr, &mut out);
            selection.write_row(&out, rect.x, rect.y + y, rect.width);
        }
    }
}

/// Move every column's transition distance one row down and pick up new
/// transitions entering the window.
fn update_transition_distance(
    max: &mut OffsetBuffer<i32>,
    transition: &ScanlineRing,
    pad: usize,
    width: usize,
    yr: i32,
) {
    let at = |row: i32, x: usize| transition.row(row as usize)[pad + x] != 0;

    for x in 0..width {
        let xi = x as isize;
        let m = max[xi];
        max[xi] = if m < 1 {
            if m <= -yr {
                if at(yr, x) {
                    yr
                } else {
                    m - 1
                }
            } else if at(-m, x) {
                -m
            } else if at(-m + 1, x) {
                -m + 1
            } else {
                m - 1
            }
        } else {
            m - 1
        };
        if max[xi] < -yr - 1 {
            max[xi] = -yr - 1;
        }
    }
}

/// Shell coverage for every column of the row, skipping long runs with no
/// transition in reach.
fn render_border_row(max: &OffsetBuffer<i32>, density: &DensityTable, xr: i32, yr: i32, out: &mut [u8]) {
    let width = out.len() as isize;
    let xr = xr as isize;
    let in_reach = |m: i32| m <= yr && m >= -yr;

    let mut last_index: isize = 1;
    let mut x: isize = 0;

    while x < width {
        last_index -= 1;
        let lowest = if last_index >= 0 { 0 } else { -xr };
        let mut last_max = 0u8;
        for i in (lowest..=xr).rev() {
            let m = max[x + i];
            if in_reach(m) {
                let d = density.get(i as i32, m);
                if d > last_max {
                    last_max = d;
                    last_index = i;
                }
            }
        }
        out[x as usize] = last_max;

        if last_max == 0 {
            let mut i = x + 1;
            while i < width && max[i] < -yr {
                i += 1;
            }
            if i - x > xr {
                while x < i - xr {
                    out[x as usize] = 0;
                    x += 1;
                }
                x -= 1;
            }
            last_index = xr;
        }
        x += 1;
    }
}

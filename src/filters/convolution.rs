//! Generic 2D convolution of a selection mask.
//!
//! A [`ConvolutionKernel`] holds a weight matrix plus a normalising factor
//! and an additive offset; [`apply_kernel`] evaluates it from a source mask
//! into a destination mask over a rectangle:
//!
//! `dst(x, y) = clamp(round(Σ k(i, j) · src(x + i - cx, y + j - cy) / factor + offset))`
//!
//! where (cx, cy) is the kernel centre. Output rows are independent, so they
//! are computed in parallel.

use ndarray::Array2;
use rayon::prelude::*;

use crate::selection::{PixelSelection, Rect};

/// How samples outside the source are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Clamp sample coordinates into the image bounds (edge replicate).
    #[default]
    Repeat,
    /// Read whatever the source holds there (its default pixel beyond
    /// stored data).
    Transparent,
}

/// Weight matrix with its normalisation.
#[derive(Debug, Clone)]
pub struct ConvolutionKernel {
    data: Array2<f64>,
    factor: f64,
    offset: f64,
}

impl ConvolutionKernel {
    /// Build a kernel from `matrix` (rows, cols).
    ///
    /// # Arguments
    /// * `matrix` - Kernel weights
    /// * `offset` - Added to every normalised sum
    /// * `factor` - Divisor of every sum; 0 is treated as 1
    pub fn from_matrix(matrix: Array2<f64>, offset: f64, factor: f64) -> Self {
        let factor = if factor == 0.0 { 1.0 } else { factor };
        Self {
            data: matrix,
            factor,
            offset,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Transposed copy (a row kernel becomes a column kernel).
    pub fn transposed(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
            factor: self.factor,
            offset: self.offset,
        }
    }

    fn center(&self) -> (i32, i32) {
        ((self.width() / 2) as i32, (self.height() / 2) as i32)
    }
}

/// Read `area` from `src` into a (height, width) window, remapping sample
/// coordinates through `border`.
fn load_window(src: &dyn PixelSelection, area: Rect, border: BorderMode) -> Array2<u8> {
    let width = area.width as usize;
    let height = area.height as usize;
    let mut window = Array2::<u8>::zeros((height, width));
    let mut line = vec![0u8; width];

    let image = src.default_bounds().bounds();
    let clamp_to = match border {
        BorderMode::Repeat if !image.is_empty() => Some(image),
        _ => None,
    };

    for (row, y) in (area.top()..=area.bottom()).enumerate() {
        match clamp_to {
            None => src.read_row(&mut line, area.x, y, area.width),
            Some(bounds) => {
                let sy = y.clamp(bounds.top(), bounds.bottom());
                let x0 = area.left().clamp(bounds.left(), bounds.right());
                let x1 = area.right().clamp(bounds.left(), bounds.right());
                let mut span = vec![0u8; (x1 - x0 + 1) as usize];
                src.read_row(&mut span, x0, sy, x1 - x0 + 1);
                for (i, x) in (area.left()..=area.right()).enumerate() {
                    line[i] = span[(x.clamp(x0, x1) - x0) as usize];
                }
            }
        }
        for (d, s) in window.row_mut(row).iter_mut().zip(line.iter()) {
            *d = *s;
        }
    }

    window
}

/// Convolve `src` with `kernel` and write the result to `dst` over `rect`.
///
/// # Arguments
/// * `kernel` - Weights, factor and offset
/// * `src` - Mask sampled around `rect`
/// * `dst` - Mask receiving `rect.width × rect.height` results at `rect`
/// * `rect` - Output region
/// * `border` - Sampling policy outside the source
pub fn apply_kernel(
    kernel: &ConvolutionKernel,
    src: &dyn PixelSelection,
    dst: &mut dyn PixelSelection,
    rect: Rect,
    border: BorderMode,
) {
    if rect.is_empty() || kernel.width() == 0 || kernel.height() == 0 {
        return;
    }

    let (cx, cy) = kernel.center();
    let kw = kernel.width() as i32;
    let kh = kernel.height() as i32;
    let area = rect.adjusted(-cx, -cy, kw - 1 - cx, kh - 1 - cy);
    log::trace!("convolution {}x{} over {:?} reading {:?}", kw, kh, rect, area);

    let window = load_window(src, area, border);
    let width = rect.width as usize;
    let mut out = vec![0u8; width * rect.height as usize];

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, o) in row.iter_mut().enumerate() {
            let mut sum = 0.0f64;
            for ((j, i), &w) in kernel.data.indexed_iter() {
                sum += w * window[[y + j, x + i]] as f64;
            }
            let v = sum / kernel.factor + kernel.offset;
            *o = v.round().clamp(0.0, 255.0) as u8;
        }
    });

    dst.write_bytes(&out, rect.x, rect.y, rect.width, rect.height);
}

//! Read-only color rasters consulted by adaptive selection filters.
//!
//! ## Supported Formats
//!
//! | Model | Channels | Opacity | Intensity |
//! |-------|----------|---------|-----------|
//! | Gray | 1 | 255 | gray value |
//! | GrayAlpha | 2 | channel 1 | channel 0 |
//! | Rgb | 3 | 255 | BT.709 luminance |
//! | Rgba | 4 | channel 3 | BT.709 luminance |

use ndarray::Array3;

use crate::error::{Result, SelectionError};

/// ITU-R BT.709 luminosity coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Channel layout-aware access to an external color raster.
pub trait ReferenceDevice {
    /// Bytes per pixel.
    fn pixel_size(&self) -> usize;

    /// Copy `width` pixels of row `y` starting at `x` into `buf`
    /// (`width * pixel_size()` bytes). Pixels outside the raster read as
    /// all-zero (transparent).
    fn read_bytes(&self, buf: &mut [u8], x: i32, y: i32, width: i32);

    /// Opacity of one pixel, 0-255.
    fn opacity_u8(&self, pixel: &[u8]) -> u8;

    /// Intensity (luminance) of one pixel, 0-255.
    fn intensity8(&self, pixel: &[u8]) -> u8;
}

/// Channel layout of a [`PaintDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ColorModel {
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            2 => Ok(Self::GrayAlpha),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            n => Err(SelectionError::UnsupportedChannels(n)),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// 8-bit raster of shape (height, width, channels) anchored at the origin.
#[derive(Debug, Clone)]
pub struct PaintDevice {
    pixels: Array3<u8>,
    model: ColorModel,
}

impl PaintDevice {
    pub fn new(pixels: Array3<u8>) -> Result<Self> {
        let model = ColorModel::from_channels(pixels.dim().2)?;
        Ok(Self { pixels, model })
    }

    /// Raster from flat interleaved bytes.
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(SelectionError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let pixels = Array3::from_shape_vec((height, width, channels), data).map_err(|_| {
            SelectionError::SizeMismatch {
                expected,
                actual: 0,
            }
        })?;
        Self::new(pixels)
    }

    pub fn model(&self) -> ColorModel {
        self.model
    }

    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }
}

impl ReferenceDevice for PaintDevice {
    fn pixel_size(&self) -> usize {
        self.model.channels()
    }

    fn read_bytes(&self, buf: &mut [u8], x: i32, y: i32, width: i32) {
        let channels = self.model.channels();
        let (height, raster_width, _) = self.pixels.dim();
        for i in 0..width.max(0) {
            let px = &mut buf[i as usize * channels..(i as usize + 1) * channels];
            let sx = x + i;
            if y < 0 || sx < 0 || y as usize >= height || sx as usize >= raster_width {
                px.fill(0);
                continue;
            }
            for (c, v) in px.iter_mut().enumerate() {
                *v = self.pixels[[y as usize, sx as usize, c]];
            }
        }
    }

    fn opacity_u8(&self, pixel: &[u8]) -> u8 {
        match self.model {
            ColorModel::Gray | ColorModel::Rgb => 255,
            ColorModel::GrayAlpha => pixel[1],
            ColorModel::Rgba => pixel[3],
        }
    }

    fn intensity8(&self, pixel: &[u8]) -> u8 {
        match self.model {
            ColorModel::Gray | ColorModel::GrayAlpha => pixel[0],
            ColorModel::Rgb | ColorModel::Rgba => {
                let r = pixel[0] as f32;
                let g = pixel[1] as f32;
                let b = pixel[2] as f32;
                (LUMA_R * r + LUMA_G * g + LUMA_B * b).round().clamp(0.0, 255.0) as u8
            }
        }
    }
}

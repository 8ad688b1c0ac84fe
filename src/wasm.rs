//! WebAssembly exports for the selection filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Data Layout
//!
//! Masks are flat row-major `u8` arrays of length `width * height`, one
//! byte per pixel. Reference images for grow-until-darkest-pixel are flat
//! interleaved arrays of length `width * height * channels`.
//!
//! Every function returns a new mask of the same size, or throws on
//! mismatched sizes and invalid parameters.

use ndarray::ArrayView2;
use wasm_bindgen::prelude::*;

use crate::error::SelectionError;
use crate::filters::{
    apply_to_array, AntiAliasSelectionFilter, BorderSelectionFilter, DilateSelectionFilter, ErodeSelectionFilter,
    FeatherSelectionFilter, FilterConfig, GrowSelectionFilter, GrowUntilDarkestPixelSelectionFilter,
    InvertSelectionFilter, SelectionFilter, ShrinkSelectionFilter, SmoothSelectionFilter,
};
use crate::selection::{PaintDevice, ReferenceDevice};

fn js_error(err: SelectionError) -> JsError {
    JsError::new(&err.to_string())
}

fn run(filter: &dyn SelectionFilter, data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    let expected = width * height;
    if data.len() != expected {
        return Err(js_error(SelectionError::SizeMismatch {
            expected,
            actual: data.len(),
        }));
    }
    let mask = ArrayView2::from_shape((height, width), data).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(apply_to_array(filter, mask).into_raw_vec_and_offset().0)
}

// ============================================================================
// Binary Morphology
// ============================================================================

/// Shrink the mask by one pixel.
#[wasm_bindgen]
pub fn erode_selection_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    run(&ErodeSelectionFilter, data, width, height)
}

/// Grow the mask by one pixel.
#[wasm_bindgen]
pub fn dilate_selection_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    run(&DilateSelectionFilter, data, width, height)
}

/// 3×3 box average of the mask.
#[wasm_bindgen]
pub fn smooth_selection_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    run(&SmoothSelectionFilter, data, width, height)
}

// ============================================================================
// Radius Morphology
// ============================================================================

/// Grow the mask by an elliptical structuring element.
///
/// # Arguments
/// * `data` - Flat mask bytes (length = width * height)
/// * `width` - Mask width in pixels
/// * `height` - Mask height in pixels
/// * `x_radius` - Horizontal radius
/// * `y_radius` - Vertical radius
#[wasm_bindgen]
pub fn grow_selection_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x_radius: i32,
    y_radius: i32,
) -> Result<Vec<u8>, JsError> {
    run(&GrowSelectionFilter::new(x_radius, y_radius), data, width, height)
}

/// Shrink the mask by an elliptical structuring element.
#[wasm_bindgen]
pub fn shrink_selection_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x_radius: i32,
    y_radius: i32,
    edge_lock: bool,
) -> Result<Vec<u8>, JsError> {
    run(&ShrinkSelectionFilter::new(x_radius, y_radius, edge_lock), data, width, height)
}

/// Replace the mask by a band around its edge.
#[wasm_bindgen]
pub fn border_selection_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    x_radius: i32,
    y_radius: i32,
    antialiasing: bool,
) -> Result<Vec<u8>, JsError> {
    let filter = BorderSelectionFilter::new(x_radius, y_radius, antialiasing).map_err(js_error)?;
    run(&filter, data, width, height)
}

// ============================================================================
// Soft Edges
// ============================================================================

/// Gaussian feather of the mask edge.
#[wasm_bindgen]
pub fn feather_selection_wasm(data: &[u8], width: usize, height: usize, radius: i32) -> Result<Vec<u8>, JsError> {
    run(&FeatherSelectionFilter::new(radius), data, width, height)
}

/// Smooth jagged mask edges.
#[wasm_bindgen]
pub fn anti_alias_selection_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    run(&AntiAliasSelectionFilter, data, width, height)
}

// ============================================================================
// Whole Plane / Adaptive
// ============================================================================

/// Complement the mask.
#[wasm_bindgen]
pub fn invert_selection_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    run(&InvertSelectionFilter, data, width, height)
}

/// Grow the mask until darker or more opaque pixels of a reference image.
///
/// # Arguments
/// * `data` - Flat mask bytes (length = width * height)
/// * `reference` - Flat interleaved image bytes (length = width * height * channels)
/// * `width` - Width in pixels of both
/// * `height` - Height in pixels of both
/// * `channels` - Reference channel count (1, 2, 3 or 4)
/// * `radius` - Maximum growth in pixels
#[wasm_bindgen]
pub fn grow_until_darkest_pixel_wasm(
    data: &[u8],
    reference: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    radius: i32,
) -> Result<Vec<u8>, JsError> {
    let device = PaintDevice::from_vec(width, height, channels, reference.to_vec()).map_err(js_error)?;
    run(&GrowUntilDarkestPixelSelectionFilter::new(radius, &device), data, width, height)
}

/// Apply a filter described by a JSON configuration. `reference` may be
/// empty when the filter does not need one.
#[wasm_bindgen]
pub fn apply_config_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    config: &str,
    reference: &[u8],
    channels: usize,
) -> Result<Vec<u8>, JsError> {
    let config = FilterConfig::from_json(config).map_err(js_error)?;
    let device = if reference.is_empty() {
        None
    } else {
        Some(PaintDevice::from_vec(width, height, channels, reference.to_vec()).map_err(js_error)?)
    };
    let filter = config
        .build(device.as_ref().map(|d| d as &dyn ReferenceDevice))
        .map_err(js_error)?;
    run(filter.as_ref(), data, width, height)
}

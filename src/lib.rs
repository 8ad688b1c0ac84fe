//! Selection Filters
//!
//! Morphological and edge-aware filters for 8-bit raster selection masks,
//! with Python bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Mask Format
//! A selection is a single-channel `u8` plane:
//! - `0` - unselected
//! - `255` - fully selected
//! - in between - partially selected (soft or anti-aliased edges)
//!
//! Masks are addressed through [`selection::PixelSelection`]: scanline reads
//! and writes plus a default pixel that stands in for everything outside the
//! stored samples. [`selection::SelectionMask`] is the in-memory mask.
//!
//! ## Filter Architecture
//! Every filter implements [`filters::SelectionFilter`]:
//! - `change_rect` declares how far around a region the filter reads
//! - `process` transforms the mask in place over a region
//!
//! [`filters::apply_filter`] runs a filter over the selected area of a mask,
//! [`filters::FilterConfig`] builds filters from JSON.

pub mod error;
pub mod filters;
pub mod selection;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, SelectionError};
pub use filters::{apply_filter, apply_to_array, apply_to_image, FilterConfig, SelectionFilter};
pub use selection::{PaintDevice, PixelSelection, Rect, ReferenceDevice, SelectionMask};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::filters::{
        apply_to_array, AntiAliasSelectionFilter, BorderSelectionFilter, DilateSelectionFilter,
        ErodeSelectionFilter, FeatherSelectionFilter, FilterConfig, GrowSelectionFilter,
        GrowUntilDarkestPixelSelectionFilter, InvertSelectionFilter, SelectionFilter, ShrinkSelectionFilter,
        SmoothSelectionFilter,
    };
    use crate::selection::{PaintDevice, ReferenceDevice};

    fn run<'py>(py: Python<'py>, filter: &dyn SelectionFilter, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        apply_to_array(filter, mask.as_array()).into_pyarray(py)
    }

    fn reference_device(reference: PyReadonlyArray3<'_, u8>) -> PyResult<PaintDevice> {
        Ok(PaintDevice::new(reference.as_array().to_owned())?)
    }

    // ========================================================================
    // Binary Morphology
    // ========================================================================

    /// Shrink a (height, width) u8 mask by one pixel.
    #[pyfunction]
    pub fn erode<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        run(py, &ErodeSelectionFilter, mask)
    }

    /// Grow a (height, width) u8 mask by one pixel.
    #[pyfunction]
    pub fn dilate<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        run(py, &DilateSelectionFilter, mask)
    }

    /// 3×3 box average of a mask.
    #[pyfunction]
    pub fn smooth<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        run(py, &SmoothSelectionFilter, mask)
    }

    // ========================================================================
    // Radius Morphology
    // ========================================================================

    /// Grow a mask by an elliptical structuring element.
    ///
    /// # Arguments
    /// * `mask` - Selection mask (height, width)
    /// * `x_radius` - Horizontal radius in pixels
    /// * `y_radius` - Vertical radius in pixels
    #[pyfunction]
    pub fn grow<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        x_radius: i32,
        y_radius: i32,
    ) -> Bound<'py, PyArray2<u8>> {
        run(py, &GrowSelectionFilter::new(x_radius, y_radius), mask)
    }

    /// Shrink a mask by an elliptical structuring element.
    ///
    /// With `edge_lock` the image border does not eat into the selection.
    #[pyfunction]
    #[pyo3(signature = (mask, x_radius, y_radius, edge_lock=false))]
    pub fn shrink<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        x_radius: i32,
        y_radius: i32,
        edge_lock: bool,
    ) -> Bound<'py, PyArray2<u8>> {
        run(py, &ShrinkSelectionFilter::new(x_radius, y_radius, edge_lock), mask)
    }

    /// Replace a mask by a band around its edge.
    ///
    /// Raises `ValueError` for anti-aliased borders with unequal radii.
    #[pyfunction]
    #[pyo3(signature = (mask, x_radius, y_radius, antialiasing=false))]
    pub fn border<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        x_radius: i32,
        y_radius: i32,
        antialiasing: bool,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let filter = BorderSelectionFilter::new(x_radius, y_radius, antialiasing)?;
        Ok(run(py, &filter, mask))
    }

    // ========================================================================
    // Soft Edges
    // ========================================================================

    /// Gaussian feather of the mask edge.
    #[pyfunction]
    pub fn feather<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>, radius: i32) -> Bound<'py, PyArray2<u8>> {
        run(py, &FeatherSelectionFilter::new(radius), mask)
    }

    /// Smooth jagged mask edges.
    #[pyfunction]
    pub fn anti_alias<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        run(py, &AntiAliasSelectionFilter, mask)
    }

    // ========================================================================
    // Whole Plane / Adaptive
    // ========================================================================

    /// Complement a mask.
    #[pyfunction]
    pub fn invert<'py>(py: Python<'py>, mask: PyReadonlyArray2<'py, u8>) -> Bound<'py, PyArray2<u8>> {
        run(py, &InvertSelectionFilter, mask)
    }

    /// Grow a mask until darker or more opaque pixels of `reference`.
    ///
    /// # Arguments
    /// * `mask` - Selection mask (height, width)
    /// * `reference` - Image (height, width, channels) with 1, 2, 3 or 4 channels
    /// * `radius` - Maximum growth in pixels
    #[pyfunction]
    pub fn grow_until_darkest_pixel<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        reference: PyReadonlyArray3<'py, u8>,
        radius: i32,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let device = reference_device(reference)?;
        Ok(run(py, &GrowUntilDarkestPixelSelectionFilter::new(radius, &device), mask))
    }

    /// Apply a filter described by a JSON configuration, e.g.
    /// `{"op": "grow", "x_radius": 3, "y_radius": 3}`.
    #[pyfunction]
    #[pyo3(signature = (mask, config, reference=None))]
    pub fn apply_config<'py>(
        py: Python<'py>,
        mask: PyReadonlyArray2<'py, u8>,
        config: &str,
        reference: Option<PyReadonlyArray3<'py, u8>>,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let config = FilterConfig::from_json(config)?;
        let device = reference.map(reference_device).transpose()?;
        let filter = config.build(device.as_ref().map(|d| d as &dyn ReferenceDevice))?;
        Ok(run(py, filter.as_ref(), mask))
    }

    /// Selection filters extension module
    #[pymodule]
    pub fn selection_filters(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Binary morphology
        m.add_function(wrap_pyfunction!(erode, m)?)?;
        m.add_function(wrap_pyfunction!(dilate, m)?)?;
        m.add_function(wrap_pyfunction!(smooth, m)?)?;

        // Radius morphology
        m.add_function(wrap_pyfunction!(grow, m)?)?;
        m.add_function(wrap_pyfunction!(shrink, m)?)?;
        m.add_function(wrap_pyfunction!(border, m)?)?;

        // Soft edges
        m.add_function(wrap_pyfunction!(feather, m)?)?;
        m.add_function(wrap_pyfunction!(anti_alias, m)?)?;

        // Whole plane / adaptive
        m.add_function(wrap_pyfunction!(invert, m)?)?;
        m.add_function(wrap_pyfunction!(grow_until_darkest_pixel, m)?)?;

        m.add_function(wrap_pyfunction!(apply_config, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::selection_filters;

//! Selection filters: morphological and edge-aware mask operations.
//!
//! ## Supported Formats
//!
//! Every filter works on a single-channel 8-bit selection mask accessed
//! through [`PixelSelection`]. Values are opacities (0 = unselected,
//! 255 = selected); every filter keeps results inside that range.
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Immutable configuration** - radii and flags are fixed at construction
//! - **Declared reach** - `change_rect` states how far `process` reads
//!   beyond the nominal rect, and `process` never reads further
//! - **Streaming** - rows flow through a small [`scanline::ScanlineRing`],
//!   results are written back row by row into the same mask
//! - **Stateless** - scratch buffers live for one `process` call only
//!
//! ## Filter Categories
//!
//! - **Binary morphology** (fixed radius 1): erode, dilate, smooth
//! - **Radius morphology**: grow, shrink, border
//! - **Soft edges**: feather, anti-alias
//! - **Whole plane**: invert
//! - **Adaptive**: grow until darkest pixel

pub mod scanline;
pub mod border_table;
pub mod convolution;

pub mod morphology;
pub mod grow;
pub mod border;
pub mod feather;
pub mod invert;
pub mod antialias;
pub mod grow_until_darkest;

pub mod config;

use ndarray::{Array2, ArrayView2};

use crate::selection::{DefaultBounds, PixelSelection, Rect, SelectionMask};

pub use antialias::AntiAliasSelectionFilter;
pub use border::BorderSelectionFilter;
pub use config::FilterConfig;
pub use feather::FeatherSelectionFilter;
pub use grow::{GrowSelectionFilter, ShrinkSelectionFilter};
pub use grow_until_darkest::GrowUntilDarkestPixelSelectionFilter;
pub use invert::InvertSelectionFilter;
pub use morphology::{DilateSelectionFilter, ErodeSelectionFilter, SmoothSelectionFilter};

/// A named, rect-bounded transformation of a selection mask.
pub trait SelectionFilter {
    /// Human-readable label for undo history.
    fn name(&self) -> &'static str {
        ""
    }

    /// Region `process` needs to read when asked to update `rect`.
    fn change_rect(&self, rect: Rect, _default_bounds: &DefaultBounds) -> Rect {
        rect
    }

    /// Transform `selection` in place over `rect`.
    fn process(&self, selection: &mut dyn PixelSelection, rect: Rect);
}

/// Run `filter` over the whole selected area of `selection`.
///
/// The processed region is the filter's change rect of the selection's
/// exact extent. Returns that region (empty when nothing ran).
pub fn apply_filter(filter: &dyn SelectionFilter, selection: &mut dyn PixelSelection) -> Rect {
    let bounds = selection.default_bounds();
    let rect = filter.change_rect(selection.selected_exact_rect(), &bounds);
    if rect.is_empty() {
        log::warn!("{}: nothing to process", filter.name());
        return Rect::default();
    }
    filter.process(selection, rect);
    rect
}

/// Run `filter` over the full image rectangle of `selection`.
pub fn apply_to_image(filter: &dyn SelectionFilter, selection: &mut dyn PixelSelection) -> Rect {
    let rect = selection.default_bounds().bounds();
    if !rect.is_empty() {
        filter.process(selection, rect);
    }
    rect
}

/// Run `filter` over a whole (height, width) mask array and return the
/// result. The image bounds are the array bounds.
pub fn apply_to_array(filter: &dyn SelectionFilter, mask: ArrayView2<'_, u8>) -> Array2<u8> {
    let mut selection = SelectionMask::from_array(mask.to_owned());
    let rect = apply_to_image(filter, &mut selection);
    selection.to_array(rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionMask;

    #[test]
    fn test_apply_filter_processes_change_rect() {
        let mut mask = SelectionMask::new(Rect::new(0, 0, 20, 20));
        mask.set_pixel(10, 10, 255);
        let filter = GrowSelectionFilter::new(1, 1);
        let rect = apply_filter(&filter, &mut mask);
        assert_eq!(rect, Rect::new(9, 9, 3, 3));
        assert_eq!(mask.pixel(9, 10), 255);
        assert_eq!(mask.pixel(10, 9), 255);
    }

    #[test]
    fn test_apply_filter_on_empty_selection_stays_empty() {
        let mut mask = SelectionMask::new(Rect::new(0, 0, 20, 20));
        apply_filter(&DilateSelectionFilter, &mut mask);
        assert!(mask.selected_exact_rect().is_empty());

        let rect = apply_filter(&ShrinkSelectionFilter::new(2, 2, false), &mut mask);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_apply_filter_invert_uses_image_bounds() {
        let mut mask = SelectionMask::new(Rect::new(0, 0, 4, 4));
        let rect = apply_filter(&InvertSelectionFilter, &mut mask);
        assert_eq!(rect, Rect::new(0, 0, 4, 4));
        assert_eq!(mask.default_pixel(), 255);
    }

    #[test]
    fn test_apply_to_array_keeps_shape() {
        let mut input = Array2::<u8>::zeros((3, 5));
        input[[1, 2]] = 255;
        let result = apply_to_array(&DilateSelectionFilter, input.view());
        assert_eq!(result.dim(), (3, 5));
        assert_eq!(result[[0, 2]], 255);
        assert_eq!(result[[1, 1]], 255);
        assert_eq!(result[[0, 0]], 0);
    }
}

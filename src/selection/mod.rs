//! Selection model: masks, rectangles and reference rasters.
//!
//! This module provides the data the selection filters work on:
//! - **Rect**: integer regions and change rects
//! - **Mask**: the 8-bit opacity plane with its scanline access contract
//! - **Reference devices**: read-only color rasters for adaptive filters

pub mod mask;
pub mod rect;
pub mod reference;

pub use mask::{DefaultBounds, PixelSelection, SelectionMask, MAX_SELECTED, MIN_SELECTED};
pub use rect::Rect;
pub use reference::{ColorModel, PaintDevice, ReferenceDevice};

//! Declarative filter configuration.
//!
//! A [`FilterConfig`] names one filter and its parameters and can be read
//! from JSON, e.g.
//!
//! ```json
//! { "op": "shrink", "x_radius": 3, "y_radius": 3, "edge_lock": true }
//! ```

use serde::{Deserialize, Serialize};

use super::{
    AntiAliasSelectionFilter, BorderSelectionFilter, DilateSelectionFilter, ErodeSelectionFilter,
    FeatherSelectionFilter, GrowSelectionFilter, GrowUntilDarkestPixelSelectionFilter, InvertSelectionFilter,
    SelectionFilter, ShrinkSelectionFilter, SmoothSelectionFilter,
};
use crate::error::{Result, SelectionError};
use crate::selection::ReferenceDevice;

/// Every selection filter with its construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterConfig {
    Erode,
    Dilate,
    Smooth,
    Grow {
        x_radius: i32,
        y_radius: i32,
    },
    Shrink {
        x_radius: i32,
        y_radius: i32,
        #[serde(default)]
        edge_lock: bool,
    },
    Border {
        x_radius: i32,
        y_radius: i32,
        #[serde(default)]
        antialiasing: bool,
    },
    Feather {
        radius: i32,
    },
    Invert,
    AntiAlias,
    GrowUntilDarkestPixel {
        radius: i32,
    },
}

impl FilterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether [`FilterConfig::build`] needs a reference device.
    pub fn needs_reference(&self) -> bool {
        matches!(self, Self::GrowUntilDarkestPixel { .. })
    }

    /// Instantiate the configured filter.
    ///
    /// # Arguments
    /// * `reference` - Color raster consulted by grow-until-darkest-pixel;
    ///   ignored by every other filter
    ///
    /// # Errors
    /// [`SelectionError::MissingReference`] when grow-until-darkest-pixel
    /// gets no reference, and the constructor errors of the filter itself.
    pub fn build<'a>(&self, reference: Option<&'a dyn ReferenceDevice>) -> Result<Box<dyn SelectionFilter + 'a>> {
        let filter: Box<dyn SelectionFilter + 'a> = match *self {
            Self::Erode => Box::new(ErodeSelectionFilter),
            Self::Dilate => Box::new(DilateSelectionFilter),
            Self::Smooth => Box::new(SmoothSelectionFilter),
            Self::Grow { x_radius, y_radius } => Box::new(GrowSelectionFilter::new(x_radius, y_radius)),
            Self::Shrink {
                x_radius,
                y_radius,
                edge_lock,
            } => Box::new(ShrinkSelectionFilter::new(x_radius, y_radius, edge_lock)),
            Self::Border {
                x_radius,
                y_radius,
                antialiasing,
            } => Box::new(BorderSelectionFilter::new(x_radius, y_radius, antialiasing)?),
            Self::Feather { radius } => Box::new(FeatherSelectionFilter::new(radius)),
            Self::Invert => Box::new(InvertSelectionFilter),
            Self::AntiAlias => Box::new(AntiAliasSelectionFilter),
            Self::GrowUntilDarkestPixel { radius } => {
                let reference = reference.ok_or(SelectionError::MissingReference)?;
                Box::new(GrowUntilDarkestPixelSelectionFilter::new(radius, reference))
            }
        };
        log::trace!("built {} from {:?}", filter.name(), self);
        Ok(filter)
    }
}

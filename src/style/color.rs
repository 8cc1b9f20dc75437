//! Color checks for style options

use crate::{GraphmodexError, Result};

/// Grid line color applied to every axis
pub const GRID_COLOR: &str = "#CCCCCC";
/// Zero line color applied to every axis
pub const ZERO_LINE_COLOR: &str = "#AAAAAA";
/// Axis line color applied to every axis
pub const AXIS_LINE_COLOR: &str = "black";

/// Reject a style option that is not a CSS color
///
/// Supports named colors (e.g., "red"), hex (#FF0000), rgb(), rgba(), hsl(), etc.
/// The original spelling is what ends up in the figure.
pub(crate) fn check_color(option: &str, value: &str) -> Result<()> {
    csscolorparser::parse(value).map(|_| ()).map_err(|e| {
        GraphmodexError::ValidationError(format!(
            "Invalid color '{}' for {}: {}",
            value, option, e
        ))
    })
}

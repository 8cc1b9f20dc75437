//! Uniform layout policy
//!
//! [`apply_style`] gives a figure the house look: one background color for
//! plot and paper, light gridlines on every axis, axis titles, hover
//! templates built from caller-chosen labels, and a single shared legend.
//! Options are plain data ([`LayoutStyle`]) so they can be loaded from a
//! config file; `overrides` carries any further Plotly layout keys and is
//! applied after everything else.

mod color;

pub use color::{AXIS_LINE_COLOR, GRID_COLOR, ZERO_LINE_COLOR};

pub use crate::figure::LegendOrientation;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::figure::{AxisKind, AxisType, Figure, Legend};
use crate::Result;
use color::check_color;

/// Value of `customdata` that leaves hover templates alone
pub const CUSTOMDATA_OPT_OUT: &str = "no";

/// What to do with trace hover text and `customdata`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "Option<Value>")]
pub enum CustomData {
    /// Leave hover templates and custom data untouched
    OptOut,
    /// Hover shows x and y only; custom data is cleared
    #[default]
    None,
    /// Hover shows x, y and this value, which is attached to every trace
    Value(Value),
}

impl From<Option<Value>> for CustomData {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => CustomData::None,
            Some(Value::String(s)) if s == CUSTOMDATA_OPT_OUT => CustomData::OptOut,
            Some(v) => CustomData::Value(v),
        }
    }
}

impl From<CustomData> for Option<Value> {
    fn from(value: CustomData) -> Self {
        match value {
            CustomData::OptOut => Some(Value::String(CUSTOMDATA_OPT_OUT.to_string())),
            CustomData::None => None,
            CustomData::Value(v) => Some(v),
        }
    }
}

/// Labels shown in hover text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverLabels {
    pub x: String,
    pub y: String,
    pub custom: String,
}

impl Default for HoverLabels {
    fn default() -> Self {
        Self {
            x: "x".to_string(),
            y: "y".to_string(),
            custom: "Info".to_string(),
        }
    }
}

impl HoverLabels {
    /// Hover template for the given custom data policy, `None` when opted out
    pub fn template(&self, customdata: &CustomData) -> Option<String> {
        match customdata {
            CustomData::OptOut => None,
            CustomData::None => Some(format!("{}: %{{x}}<br>{}: %{{y}}", self.x, self.y)),
            CustomData::Value(_) => Some(format!(
                "{}: %{{x}}<br>{}: %{{y}}<br>{}: %{{customdata}}<br>",
                self.x, self.y, self.custom
            )),
        }
    }
}

/// Shared legend box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendStyle {
    /// Horizontal position in normalized figure coordinates
    pub x: Option<f64>,
    /// Vertical position in normalized figure coordinates
    pub y: Option<f64>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: f64,
    pub orientation: LegendOrientation,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            background_color: "#ffffff".to_string(),
            border_color: "#ffffff".to_string(),
            border_width: 1.0,
            orientation: LegendOrientation::Vertical,
        }
    }
}

/// Options for [`apply_style`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub width: u32,
    pub height: u32,
    /// Figure title; the existing title is kept when unset
    pub title: Option<String>,
    /// Used for both the plot area and the paper
    pub background_color: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Option<[Value; 2]>,
    pub y_range: Option<[Value; 2]>,
    pub x_type: AxisType,
    pub y_type: AxisType,
    pub hover: HoverLabels,
    pub customdata: CustomData,
    /// Shared legend; legend settings are left alone when unset
    pub legend: Option<LegendStyle>,
    /// Extra Plotly layout keys, merged after the policy above
    pub overrides: Map<String, Value>,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            width: 700,
            height: 600,
            title: None,
            background_color: "white".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            x_range: None,
            y_range: None,
            x_type: AxisType::Auto,
            y_type: AxisType::Auto,
            hover: HoverLabels::default(),
            customdata: CustomData::None,
            legend: Some(LegendStyle::default()),
            overrides: Map::new(),
        }
    }
}

impl LayoutStyle {
    fn validate(&self) -> Result<()> {
        check_color("background_color", &self.background_color)?;
        if let Some(legend) = &self.legend {
            check_color("legend.background_color", &legend.background_color)?;
            check_color("legend.border_color", &legend.border_color)?;
        }
        Ok(())
    }
}

/// Apply the uniform layout policy to a figure
///
/// Every x and y axis in the layout is styled, so grid figures get the same
/// treatment in every cell. On error the figure is left as it was.
pub fn apply_style<'a>(figure: &'a mut Figure, style: &LayoutStyle) -> Result<&'a mut Figure> {
    style.validate()?;

    let mut styled = figure.clone();
    style_figure(&mut styled, style)?;
    *figure = styled;

    tracing::debug!(
        traces = figure.data.len(),
        x_axes = figure.layout.axis_count(AxisKind::X),
        y_axes = figure.layout.axis_count(AxisKind::Y),
        "applied layout style"
    );

    Ok(figure)
}

fn style_figure(figure: &mut Figure, style: &LayoutStyle) -> Result<()> {
    let layout = &mut figure.layout;
    layout.width = Some(f64::from(style.width));
    layout.height = Some(f64::from(style.height));
    layout.plot_bgcolor = Some(style.background_color.clone());
    layout.paper_bgcolor = Some(style.background_color.clone());
    if let Some(title) = &style.title {
        layout.set_title_text(title.as_str());
    }

    for (kind, label, range, axis_type) in [
        (AxisKind::X, &style.x_label, &style.x_range, style.x_type),
        (AxisKind::Y, &style.y_label, &style.y_range, style.y_type),
    ] {
        for axis in layout.axes_mut(kind) {
            axis.showgrid = Some(true);
            axis.gridcolor = Some(GRID_COLOR.to_string());
            axis.zerolinecolor = Some(ZERO_LINE_COLOR.to_string());
            axis.linecolor = Some(AXIS_LINE_COLOR.to_string());
            axis.set_title_text(label.as_str());
            axis.range = range.as_ref().map(|r| r.to_vec());
            axis.axis_type = Some(axis_type);
        }
    }

    if let Some(template) = style.hover.template(&style.customdata) {
        let customdata = match &style.customdata {
            CustomData::Value(v) => Some(v.clone()),
            _ => None,
        };
        for trace in figure.data.iter_mut() {
            trace.hovertemplate = Some(template.clone());
            trace.customdata = customdata.clone();
        }
    }

    if let Some(legend_style) = &style.legend {
        let layout = &mut figure.layout;
        layout.showlegend = Some(true);
        let legend = layout.legend.get_or_insert_with(Legend::default);
        legend.x = legend_style.x;
        legend.y = legend_style.y;
        legend.bgcolor = Some(legend_style.background_color.clone());
        legend.bordercolor = Some(legend_style.border_color.clone());
        legend.borderwidth = Some(legend_style.border_width);
        legend.orientation = Some(legend_style.orientation);
    }

    figure.layout.merge_overrides(&style.overrides)
}

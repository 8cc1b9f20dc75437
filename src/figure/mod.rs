//! Figure types
//!
//! A typed view of the Plotly figure JSON format (`{"data": [...], "layout": {...}}`).
//! Attributes that graphmodex reads or writes have dedicated fields; all
//! others are preserved so a figure survives a load/write round trip.

mod axis;
mod layout;
mod trace;

pub use axis::{Axis, AxisId, AxisKind, AxisType};
pub use layout::{Annotation, Layout, Legend, LegendOrientation, Title};
pub use trace::Trace;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::Result;

/// A chart: its traces plus the layout they are drawn in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
    /// Other top-level keys (`frames`, `config`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.layout.set_title_text(title);
        self
    }

    /// Parse Plotly figure JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Read a figure from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn title_text(&self) -> Option<&str> {
        self.layout.title_text()
    }

    pub fn traces(&self) -> &[Trace] {
        &self.data
    }

    pub fn traces_mut(&mut self) -> &mut [Trace] {
        &mut self.data
    }
}

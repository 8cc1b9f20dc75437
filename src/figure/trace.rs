//! Trace type
//!
//! A trace is one data series. Only the attributes the styling and
//! composition code touches have dedicated fields; the data arrays and every
//! other Plotly attribute are carried in `attributes`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::axis::{AxisId, AxisKind};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trace {
    /// Plotly trace type (`scatter`, `bar`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub trace_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    /// Reference to the x axis this trace is drawn against (`x`, `x2`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customdata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Trace {
    pub fn new(trace_type: impl Into<String>) -> Self {
        Self {
            trace_type: Some(trace_type.into()),
            ..Default::default()
        }
    }

    pub fn scatter() -> Self {
        Self::new("scatter")
    }

    pub fn bar() -> Self {
        Self::new("bar")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the `x` and `y` data arrays
    pub fn with_xy<X, Y>(mut self, x: X, y: Y) -> Self
    where
        X: IntoIterator,
        X::Item: Into<Value>,
        Y: IntoIterator,
        Y::Item: Into<Value>,
    {
        let x: Vec<Value> = x.into_iter().map(Into::into).collect();
        let y: Vec<Value> = y.into_iter().map(Into::into).collect();
        self.attributes.insert("x".to_string(), Value::Array(x));
        self.attributes.insert("y".to_string(), Value::Array(y));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Axis this trace is drawn against for the given kind (defaults to the first)
    pub fn axis_id(&self, kind: AxisKind) -> AxisId {
        let reference = match kind {
            AxisKind::X => self.xaxis.as_deref(),
            AxisKind::Y => self.yaxis.as_deref(),
        };
        reference
            .and_then(AxisId::parse_trace_ref)
            .filter(|id| id.kind == kind)
            .unwrap_or_else(|| AxisId::new(kind, 1))
    }

    /// Point this trace at an axis pair
    pub fn set_axes(&mut self, x: AxisId, y: AxisId) {
        self.xaxis = Some(x.trace_ref());
        self.yaxis = Some(y.trace_ref());
    }
}

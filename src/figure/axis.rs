//! Cartesian axis types
//!
//! Plotly names axes by kind and position: the first x axis is `xaxis` in the
//! layout and `x` on a trace, the second is `xaxis2` / `x2`, and so on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Title;

/// Which direction an axis runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisKind {
    #[default]
    X,
    Y,
}

impl AxisKind {
    /// Single-letter prefix used in axis keys and trace references
    pub fn prefix(&self) -> &'static str {
        match self {
            AxisKind::X => "x",
            AxisKind::Y => "y",
        }
    }

    /// The axis kind paired with this one in a subplot cell
    pub fn partner(&self) -> AxisKind {
        match self {
            AxisKind::X => AxisKind::Y,
            AxisKind::Y => AxisKind::X,
        }
    }
}

/// Identity of an axis within a layout (kind plus 1-based index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisId {
    pub kind: AxisKind,
    pub index: usize,
}

impl Default for AxisId {
    fn default() -> Self {
        Self::new(AxisKind::X, 1)
    }
}

impl AxisId {
    pub fn new(kind: AxisKind, index: usize) -> Self {
        Self { kind, index }
    }

    pub fn x(index: usize) -> Self {
        Self::new(AxisKind::X, index)
    }

    pub fn y(index: usize) -> Self {
        Self::new(AxisKind::Y, index)
    }

    /// The axis with the same index and the other kind
    pub fn partner(&self) -> AxisId {
        Self::new(self.kind.partner(), self.index)
    }

    /// Layout key for this axis (`xaxis`, `xaxis2`, ...)
    pub fn layout_key(&self) -> String {
        if self.index <= 1 {
            format!("{}axis", self.kind.prefix())
        } else {
            format!("{}axis{}", self.kind.prefix(), self.index)
        }
    }

    /// Reference used by traces and anchors (`x`, `x2`, ...)
    pub fn trace_ref(&self) -> String {
        if self.index <= 1 {
            self.kind.prefix().to_string()
        } else {
            format!("{}{}", self.kind.prefix(), self.index)
        }
    }

    /// Parse a layout key such as `yaxis3`
    ///
    /// Returns `None` for anything that is not an axis key. `xaxis1` is
    /// accepted as an alias of `xaxis`.
    pub fn parse_layout_key(key: &str) -> Option<AxisId> {
        let (kind, rest) = if let Some(rest) = key.strip_prefix("xaxis") {
            (AxisKind::X, rest)
        } else if let Some(rest) = key.strip_prefix("yaxis") {
            (AxisKind::Y, rest)
        } else {
            return None;
        };
        Self::parse_index(rest).map(|index| Self::new(kind, index))
    }

    /// Parse a trace reference such as `x2`
    pub fn parse_trace_ref(reference: &str) -> Option<AxisId> {
        let (kind, rest) = if let Some(rest) = reference.strip_prefix('x') {
            (AxisKind::X, rest)
        } else if let Some(rest) = reference.strip_prefix('y') {
            (AxisKind::Y, rest)
        } else {
            return None;
        };
        Self::parse_index(rest).map(|index| Self::new(kind, index))
    }

    fn parse_index(digits: &str) -> Option<usize> {
        if digits.is_empty() {
            return Some(1);
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<usize>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(n),
        }
    }
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.trace_ref())
    }
}

/// Axis scale kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    /// Let the renderer infer the scale from the data
    #[default]
    #[serde(rename = "-")]
    Auto,
    Linear,
    Log,
    Date,
    Category,
    Multicategory,
}

/// A single x or y axis of a layout
///
/// Attributes without a dedicated field are kept in `attributes` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis {
    /// Position of this axis in the layout; derived from its key, not serialized
    #[serde(skip)]
    pub id: AxisId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zerolinecolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Value>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<AxisType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Axis {
    pub fn new(id: AxisId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Title text, if any
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().and_then(|t| t.text.as_deref())
    }

    /// Set the title text, keeping any other title attributes (font, standoff)
    pub fn set_title_text(&mut self, text: impl Into<String>) {
        self.title.get_or_insert_with(Title::default).text = Some(text.into());
    }
}

//! Layout types: title, legend, annotations and the axis collection

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::axis::{Axis, AxisId, AxisKind};
use crate::{GraphmodexError, Result};

/// Title of a figure or an axis
///
/// Plotly accepts either a bare string or an object with `text`; both forms
/// are read, the object form is written.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "TitleRepr")]
pub struct Title {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            attributes: Map::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TitleRepr {
    Text(String),
    Full {
        #[serde(default)]
        text: Option<String>,
        #[serde(flatten)]
        attributes: Map<String, Value>,
    },
}

impl From<TitleRepr> for Title {
    fn from(repr: TitleRepr) -> Self {
        match repr {
            TitleRepr::Text(text) => Title::new(text),
            TitleRepr::Full { text, attributes } => Title { text, attributes },
        }
    }
}

/// Legend item layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendOrientation {
    #[default]
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

/// Shared legend box
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Legend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bordercolor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borderwidth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<LegendOrientation>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Text placed on the figure, used for subplot titles
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub showarrow: Option<bool>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Figure layout
///
/// Axes are lifted out of the flat Plotly key space (`xaxis`, `xaxis2`, ...)
/// into `xaxes` / `yaxes`, each sorted by index. Everything else without a
/// dedicated field lives in `attributes`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawLayout")]
pub struct Layout {
    pub title: Option<Title>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub plot_bgcolor: Option<String>,
    pub paper_bgcolor: Option<String>,
    pub showlegend: Option<bool>,
    pub legend: Option<Legend>,
    pub annotations: Vec<Annotation>,
    pub xaxes: Vec<Axis>,
    pub yaxes: Vec<Axis>,
    pub attributes: Map<String, Value>,
}

impl Layout {
    /// Title text, if any
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().and_then(|t| t.text.as_deref())
    }

    /// Set the title text, keeping any other title attributes
    pub fn set_title_text(&mut self, text: impl Into<String>) {
        self.title.get_or_insert_with(Title::default).text = Some(text.into());
    }

    /// All axes of one kind, in index order
    pub fn axes(&self, kind: AxisKind) -> &[Axis] {
        match kind {
            AxisKind::X => &self.xaxes,
            AxisKind::Y => &self.yaxes,
        }
    }

    pub fn axes_mut(&mut self, kind: AxisKind) -> &mut [Axis] {
        match kind {
            AxisKind::X => &mut self.xaxes,
            AxisKind::Y => &mut self.yaxes,
        }
    }

    /// Number of axes of one kind
    pub fn axis_count(&self, kind: AxisKind) -> usize {
        self.axes(kind).len()
    }

    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes(id.kind).iter().find(|a| a.id == id)
    }

    pub fn axis_mut(&mut self, id: AxisId) -> Option<&mut Axis> {
        self.axes_mut(id.kind).iter_mut().find(|a| a.id == id)
    }

    /// Get an axis, inserting an empty one in index order if it is missing
    pub fn ensure_axis(&mut self, id: AxisId) -> &mut Axis {
        let axes = match id.kind {
            AxisKind::X => &mut self.xaxes,
            AxisKind::Y => &mut self.yaxes,
        };
        let pos = match axes.binary_search_by_key(&id.index, |a| a.id.index) {
            Ok(pos) => pos,
            Err(pos) => {
                axes.insert(pos, Axis::new(id));
                pos
            }
        };
        &mut axes[pos]
    }

    /// Merge caller-supplied options over the current layout
    ///
    /// Keys use Plotly names (`width`, `xaxis2`, `legend`, ...); `xaxis1`
    /// addresses the same axis as `xaxis`. Nested objects are merged key by
    /// key; any other value replaces what was there. The result must still be
    /// a valid layout.
    pub fn merge_overrides(&mut self, overrides: &Map<String, Value>) -> Result<()> {
        if overrides.is_empty() {
            return Ok(());
        }
        let mut value = serde_json::to_value(&*self)?;
        if let Value::Object(fields) = &mut value {
            for (key, override_value) in overrides {
                let key = AxisId::parse_layout_key(key)
                    .map_or_else(|| key.clone(), |id| id.layout_key());
                tracing::debug!(key = %key, "merging layout override");
                merge_field(fields, key, override_value);
            }
        }
        *self = serde_json::from_value(value).map_err(|e| {
            GraphmodexError::ValidationError(format!("Layout override rejected: {}", e))
        })?;
        Ok(())
    }
}

/// Set `key` to `incoming`, merging into an existing object when both sides are objects
fn merge_field(fields: &mut Map<String, Value>, key: String, incoming: &Value) {
    match fields.get_mut(&key) {
        Some(existing) => merge_value(existing, incoming),
        None => {
            fields.insert(key, incoming.clone());
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(fields), Value::Object(incoming)) => {
            for (key, value) in incoming {
                merge_field(fields, key.clone(), value);
            }
        }
        (existing, incoming) => *existing = incoming.clone(),
    }
}

/// Wire form of [`Layout`]: axes still live in the flat attribute map
#[derive(Deserialize)]
struct RawLayout {
    #[serde(default)]
    title: Option<Title>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    plot_bgcolor: Option<String>,
    #[serde(default)]
    paper_bgcolor: Option<String>,
    #[serde(default)]
    showlegend: Option<bool>,
    #[serde(default)]
    legend: Option<Legend>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl TryFrom<RawLayout> for Layout {
    type Error = serde_json::Error;

    fn try_from(raw: RawLayout) -> std::result::Result<Self, Self::Error> {
        let mut axis_values: Vec<(AxisId, Value)> = Vec::new();
        let mut attributes = Map::new();

        for (key, value) in raw.attributes {
            match AxisId::parse_layout_key(&key) {
                Some(id) => match axis_values.iter_mut().find(|(seen, _)| *seen == id) {
                    // `xaxis` and `xaxis1` name the same axis; later keys win
                    Some((_, existing)) => merge_value(existing, &value),
                    None => axis_values.push((id, value)),
                },
                None => {
                    attributes.insert(key, value);
                }
            }
        }

        let mut xaxes = Vec::new();
        let mut yaxes = Vec::new();
        for (id, value) in axis_values {
            let mut axis: Axis = if value.is_null() {
                Axis::default()
            } else {
                serde_json::from_value(value)?
            };
            axis.id = id;
            match id.kind {
                AxisKind::X => xaxes.push(axis),
                AxisKind::Y => yaxes.push(axis),
            }
        }
        xaxes.sort_by_key(|a| a.id.index);
        yaxes.sort_by_key(|a| a.id.index);

        Ok(Layout {
            title: raw.title,
            width: raw.width,
            height: raw.height,
            plot_bgcolor: raw.plot_bgcolor,
            paper_bgcolor: raw.paper_bgcolor,
            showlegend: raw.showlegend,
            legend: raw.legend,
            annotations: raw.annotations,
            xaxes,
            yaxes,
            attributes,
        })
    }
}

/// Borrowed wire form used when writing a [`Layout`]
#[derive(Serialize)]
struct LayoutRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plot_bgcolor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paper_bgcolor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    legend: Option<&'a Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<&'a [Annotation]>,
    #[serde(flatten)]
    axes: BTreeMap<String, &'a Axis>,
    #[serde(flatten)]
    attributes: &'a Map<String, Value>,
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let axes = self
            .xaxes
            .iter()
            .chain(&self.yaxes)
            .map(|axis| (axis.id.layout_key(), axis))
            .collect();
        LayoutRef {
            title: self.title.as_ref(),
            width: self.width,
            height: self.height,
            plot_bgcolor: self.plot_bgcolor.as_deref(),
            paper_bgcolor: self.paper_bgcolor.as_deref(),
            showlegend: self.showlegend,
            legend: self.legend.as_ref(),
            annotations: (!self.annotations.is_empty()).then_some(self.annotations.as_slice()),
            axes,
            attributes: &self.attributes,
        }
        .serialize(serializer)
    }
}

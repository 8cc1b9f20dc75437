//! Subplot composition
//!
//! [`compose`] arranges several finished figures into one grid figure: each
//! input figure gets a cell, its traces move into that cell, and the result
//! gets one title, one size, one legend policy and per-axis names.
//!
//! The inputs are never modified; composition works on copies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::figure::{AxisKind, Figure};
use crate::grid::{make_grid, GridSpec};
use crate::style::{apply_style, LayoutStyle};
use crate::{GraphmodexError, Result};

/// Height added to the figure for every row the grid grows by
pub const ROW_HEIGHT_STEP: u32 = 400;

/// Vertical spacing used once the grid has grown
pub const EXPANDED_VERTICAL_SPACING: f64 = 0.1;

/// Axis title used for x slots without a name
pub const DEFAULT_X_AXIS_NAME: &str = "x";

/// Axis title used for y slots without a name
pub const DEFAULT_Y_AXIS_NAME: &str = "y";

/// Titles for the axis slots of a grid figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisNames {
    /// One label for every slot
    Single(String),
    /// Labels in slot order; missing ones fall back to the default label
    Many(Vec<String>),
}

impl AxisNames {
    /// Expand to exactly `slots` labels
    pub fn resolve(&self, slots: usize, default: &str) -> Vec<String> {
        match self {
            AxisNames::Single(name) => vec![name.clone(); slots],
            AxisNames::Many(names) => {
                if names.len() > slots {
                    tracing::warn!(
                        given = names.len(),
                        slots,
                        "ignoring axis names beyond the number of axes"
                    );
                }
                (0..slots)
                    .map(|i| names.get(i).cloned().unwrap_or_else(|| default.to_string()))
                    .collect()
            }
        }
    }
}

impl From<&str> for AxisNames {
    fn from(name: &str) -> Self {
        AxisNames::Single(name.to_string())
    }
}

impl From<Vec<String>> for AxisNames {
    fn from(names: Vec<String>) -> Self {
        AxisNames::Many(names)
    }
}

/// Options for [`compose`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubplotOptions {
    /// Starting number of rows; grows until every figure has a cell
    pub rows: usize,
    pub cols: usize,
    /// Cell titles; taken from each figure's own title when unset
    pub subplot_titles: Option<Vec<String>>,
    pub title: String,
    pub width: u32,
    /// Starting height; grows with the rows
    pub height: u32,
    /// Per-figure legend visibility; figures without an entry show their legend
    #[serde(deserialize_with = "deserialize_legend_flags")]
    pub legends: Vec<bool>,
    pub shared_x: bool,
    pub shared_y: bool,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub x_axis_names: AxisNames,
    pub y_axis_names: AxisNames,
    /// Base style for colors, hover text and legend; width, height, title and
    /// axis labels are set by the composer
    pub style: LayoutStyle,
    /// Extra Plotly layout keys, merged after the style
    pub layout_overrides: Map<String, Value>,
}

impl Default for SubplotOptions {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 2,
            subplot_titles: None,
            title: "Plots".to_string(),
            width: 1400,
            height: 600,
            legends: Vec::new(),
            shared_x: false,
            shared_y: false,
            horizontal_spacing: 0.08,
            vertical_spacing: 0.08,
            x_axis_names: AxisNames::Single(DEFAULT_X_AXIS_NAME.to_string()),
            y_axis_names: AxisNames::Single(DEFAULT_Y_AXIS_NAME.to_string()),
            style: LayoutStyle::default(),
            layout_overrides: Map::new(),
        }
    }
}

/// Read legend flags leniently: numbers, strings, null and containers are
/// taken by truthiness
fn deserialize_legend_flags<'de, D>(deserializer: D) -> std::result::Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values.iter().map(truthy).collect())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Grid shape after growing to fit every figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSize {
    pub rows: usize,
    pub height: u32,
    pub vertical_spacing: f64,
}

/// Add rows until `charts` figures fit in a `cols`-wide grid
///
/// Only rows grow. Each added row makes the figure [`ROW_HEIGHT_STEP`] taller
/// and switches to [`EXPANDED_VERTICAL_SPACING`]. Fails with
/// [`GraphmodexError::InvalidInput`] when the grid size overflows.
pub fn fit_rows(options: &SubplotOptions, charts: usize) -> Result<GridSize> {
    let mut size = GridSize {
        rows: options.rows,
        height: options.height,
        vertical_spacing: options.vertical_spacing,
    };
    if options.cols == 0 {
        return Ok(size);
    }
    loop {
        let capacity = size.rows.checked_mul(options.cols).ok_or_else(|| {
            GraphmodexError::InvalidInput(format!(
                "A {}x{} grid has too many cells",
                size.rows, options.cols
            ))
        })?;
        if capacity >= charts {
            return Ok(size);
        }
        size.rows += 1;
        size.height = size.height.saturating_add(ROW_HEIGHT_STEP);
        size.vertical_spacing = EXPANDED_VERTICAL_SPACING;
    }
}

/// Shrink a spacing that would leave no room for `count` subplots
///
/// Tall grids grown by [`fit_rows`] would otherwise run out of canvas; the
/// gaps are then limited to half of it.
fn fit_spacing(spacing: f64, count: usize) -> f64 {
    if count > 1 && spacing * (count - 1) as f64 >= 1.0 {
        let fitted = 0.5 / (count - 1) as f64;
        tracing::warn!(spacing, fitted, count, "spacing too large for grid, shrinking");
        fitted
    } else {
        spacing
    }
}

/// Legend visibility for each of `charts` figures
fn legend_flags(legends: &[bool], charts: usize) -> Vec<bool> {
    (0..charts)
        .map(|i| legends.get(i).copied().unwrap_or(true))
        .collect()
}

/// Combine figures into one subplot grid
///
/// Figure `i` lands in row `i / cols + 1`, column `i % cols + 1`, with its
/// traces in their original order. Fails with
/// [`GraphmodexError::InvalidInput`] when there are no figures or no columns.
pub fn compose(charts: &[Figure], options: &SubplotOptions) -> Result<Figure> {
    if charts.is_empty() {
        return Err(GraphmodexError::InvalidInput(
            "compose requires at least one figure".to_string(),
        ));
    }
    if options.cols == 0 {
        return Err(GraphmodexError::InvalidInput(
            "compose requires at least one column".to_string(),
        ));
    }

    let mut charts: Vec<Figure> = charts.to_vec();

    let flags = legend_flags(&options.legends, charts.len());
    for (chart, show) in charts.iter_mut().zip(flags) {
        for trace in chart.traces_mut() {
            trace.showlegend = Some(show);
        }
    }

    let size = fit_rows(options, charts.len())?;
    if size.rows != options.rows {
        tracing::debug!(
            from = options.rows,
            to = size.rows,
            height = size.height,
            "grew subplot grid to fit figures"
        );
    }

    let subplot_titles = match &options.subplot_titles {
        Some(titles) => titles.clone(),
        None => charts
            .iter()
            .map(|c| c.title_text().unwrap_or_default().to_string())
            .collect(),
    };

    let spec = GridSpec {
        rows: size.rows,
        cols: options.cols,
        shared_x: options.shared_x,
        shared_y: options.shared_y,
        horizontal_spacing: fit_spacing(options.horizontal_spacing, options.cols),
        vertical_spacing: fit_spacing(size.vertical_spacing, size.rows),
        subplot_titles,
        cells: Some(charts.len()),
    };
    let mut grid = make_grid(&spec)?;

    for (i, chart) in charts.into_iter().enumerate() {
        let row = i / options.cols + 1;
        let col = i % options.cols + 1;
        for trace in chart.data {
            grid.add_trace(trace, row, col)?;
        }
    }

    let mut figure = grid.into_figure();

    let style = LayoutStyle {
        width: options.width,
        height: size.height,
        title: Some(options.title.clone()),
        x_label: DEFAULT_X_AXIS_NAME.to_string(),
        y_label: DEFAULT_Y_AXIS_NAME.to_string(),
        ..options.style.clone()
    };
    apply_style(&mut figure, &style)?;
    figure.layout.merge_overrides(&options.layout_overrides)?;

    name_axes(&mut figure, AxisKind::X, &options.x_axis_names, DEFAULT_X_AXIS_NAME);
    name_axes(&mut figure, AxisKind::Y, &options.y_axis_names, DEFAULT_Y_AXIS_NAME);

    tracing::info!(
        rows = size.rows,
        cols = options.cols,
        traces = figure.data.len(),
        "composed subplot figure"
    );

    Ok(figure)
}

/// Title each axis of one kind, in creation order
fn name_axes(figure: &mut Figure, kind: AxisKind, names: &AxisNames, default: &str) {
    let slots = figure.layout.axis_count(kind);
    let labels = names.resolve(slots, default);
    for (axis, label) in figure.layout.axes_mut(kind).iter_mut().zip(labels) {
        axis.set_title_text(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{AxisId, Trace};
    use crate::style::CustomData;
    use proptest::prelude::*;
    use serde_json::json;

    fn chart(title: &str, traces: usize) -> Figure {
        let mut figure = Figure::new().with_title(title);
        for i in 0..traces {
            figure = figure.with_trace(
                Trace::scatter()
                    .with_name(format!("{} {}", title, i))
                    .with_xy([1, 2, 3], [i as i64, 2, 1]),
            );
        }
        figure
    }

    fn names(figure: &Figure) -> Vec<String> {
        figure
            .data
            .iter()
            .map(|t| t.name.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_empty_input_is_invalid() {
        let result = compose(&[], &SubplotOptions::default());
        assert!(matches!(result, Err(GraphmodexError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_columns_is_invalid() {
        let options = SubplotOptions {
            cols: 0,
            ..Default::default()
        };
        let result = compose(&[chart("a", 1)], &options);
        assert!(matches!(result, Err(GraphmodexError::InvalidInput(_))));
    }

    #[test]
    fn test_two_charts_side_by_side() {
        let charts = [chart("Left", 1), chart("Right", 1)];
        let figure = compose(&charts, &SubplotOptions::default()).unwrap();

        assert_eq!(figure.data.len(), 2);
        assert_eq!(figure.data[0].xaxis.as_deref(), Some("x"));
        assert_eq!(figure.data[0].yaxis.as_deref(), Some("y"));
        assert_eq!(figure.data[1].xaxis.as_deref(), Some("x2"));
        assert_eq!(figure.data[1].yaxis.as_deref(), Some("y2"));

        // No growth: one row, starting height
        assert_eq!(figure.layout.height, Some(600.0));
        assert_eq!(figure.layout.width, Some(1400.0));
        assert_eq!(figure.title_text(), Some("Plots"));

        let left = figure.layout.axis(AxisId::x(1)).unwrap().domain.unwrap();
        let right = figure.layout.axis(AxisId::x(2)).unwrap().domain.unwrap();
        assert!(left[1] < right[0]);
    }

    #[test]
    fn test_five_charts_grow_to_three_rows() {
        let charts: Vec<Figure> = (0..5).map(|i| chart(&format!("c{}", i), 1)).collect();
        let options = SubplotOptions::default();

        let size = fit_rows(&options, charts.len()).unwrap();
        assert_eq!(size.rows, 3);
        assert_eq!(size.height, 600 + 400 * 2);
        assert_eq!(size.vertical_spacing, 0.1);

        let figure = compose(&charts, &options).unwrap();
        assert_eq!(figure.layout.height, Some(1400.0));
        assert_eq!(figure.layout.axis_count(AxisKind::X), 5);

        // Fifth chart: row 3, column 1 -> cell 5
        assert_eq!(figure.data[4].xaxis.as_deref(), Some("x5"));
        let fifth = figure.layout.axis(AxisId::y(5)).unwrap().domain.unwrap();
        let first = figure.layout.axis(AxisId::y(1)).unwrap().domain.unwrap();
        assert!(fifth[1] < first[0]);
    }

    #[test]
    fn test_trace_order_and_count() {
        let charts = [chart("a", 2), chart("b", 3), chart("c", 1)];
        let options = SubplotOptions {
            cols: 2,
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(
            names(&figure),
            vec!["a 0", "a 1", "b 0", "b 1", "b 2", "c 0"]
        );
        let axes: Vec<&str> = figure
            .data
            .iter()
            .map(|t| t.xaxis.as_deref().unwrap())
            .collect();
        assert_eq!(axes, vec!["x", "x", "x2", "x2", "x2", "x3"]);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let mut original = chart("a", 2);
        original.data[0].showlegend = Some(true);
        original.data[1].hovertemplate = Some("mine".to_string());
        let charts = vec![original, chart("b", 1)];
        let snapshot = charts.clone();

        let options = SubplotOptions {
            legends: vec![false, false],
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(charts, snapshot);
        assert!(figure.data.iter().all(|t| t.showlegend == Some(false)));
    }

    #[test]
    fn test_missing_legend_flags_default_to_visible() {
        let charts = [chart("a", 2), chart("b", 1), chart("c", 1)];
        let options = SubplotOptions {
            legends: vec![false],
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        let flags: Vec<Option<bool>> = figure.data.iter().map(|t| t.showlegend).collect();
        assert_eq!(
            flags,
            vec![Some(false), Some(false), Some(true), Some(true)]
        );
    }

    #[test]
    fn test_legend_flags_coerced_from_config() {
        let options: SubplotOptions =
            serde_json::from_value(json!({"legends": [0, 1, "", "yes", null, true]})).unwrap();
        assert_eq!(
            options.legends,
            vec![false, true, false, true, false, true]
        );
    }

    #[test]
    fn test_subplot_titles_from_chart_titles() {
        let untitled = Figure::new().with_trace(Trace::scatter());
        let charts = [chart("Revenue", 1), untitled, chart("Costs", 1)];
        let figure = compose(&charts, &SubplotOptions::default()).unwrap();

        let texts: Vec<&str> = figure
            .layout
            .annotations
            .iter()
            .filter_map(|a| a.text.as_deref())
            .collect();
        assert_eq!(texts, vec!["Revenue", "Costs"]);
    }

    #[test]
    fn test_explicit_subplot_titles() {
        let charts = [chart("a", 1), chart("b", 1)];
        let options = SubplotOptions {
            subplot_titles: Some(vec!["First".to_string(), "Second".to_string()]),
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();
        assert_eq!(figure.layout.annotations[1].text.as_deref(), Some("Second"));
    }

    #[test]
    fn test_single_axis_name_replicated() {
        let charts = [chart("a", 1), chart("b", 1), chart("c", 1)];
        let options = SubplotOptions {
            cols: 3,
            x_axis_names: AxisNames::from("A"),
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(figure.layout.axis_count(AxisKind::X), 3);
        for axis in &figure.layout.xaxes {
            assert_eq!(axis.title_text(), Some("A"));
        }
        for axis in &figure.layout.yaxes {
            assert_eq!(axis.title_text(), Some("y"));
        }
    }

    #[test]
    fn test_short_axis_names_padded() {
        let charts = [chart("a", 1), chart("b", 1), chart("c", 1)];
        let options = SubplotOptions {
            cols: 3,
            x_axis_names: AxisNames::from(vec!["A".to_string()]),
            y_axis_names: AxisNames::from(vec![
                "P".to_string(),
                "Q".to_string(),
                "R".to_string(),
                "extra".to_string(),
            ]),
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        let x: Vec<&str> = figure.layout.xaxes.iter().filter_map(|a| a.title_text()).collect();
        assert_eq!(x, vec!["A", "x", "x"]);
        let y: Vec<&str> = figure.layout.yaxes.iter().filter_map(|a| a.title_text()).collect();
        assert_eq!(y, vec!["P", "Q", "R"]);
    }

    #[test]
    fn test_axis_names_from_config() {
        let single: AxisNames = serde_json::from_value(json!("Time")).unwrap();
        assert_eq!(single, AxisNames::Single("Time".to_string()));
        let many: AxisNames = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(many.resolve(3, "x"), vec!["a", "b", "x"]);
    }

    #[test]
    fn test_layout_overrides_win() {
        let charts = [chart("a", 1), chart("b", 1)];
        let overrides = json!({"width": 800, "title": {"text": "Custom"}});
        let options = SubplotOptions {
            layout_overrides: overrides.as_object().unwrap().clone(),
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(figure.layout.width, Some(800.0));
        assert_eq!(figure.title_text(), Some("Custom"));
        // Policy still applied where not overridden
        assert_eq!(figure.layout.paper_bgcolor.as_deref(), Some("white"));
    }

    #[test]
    fn test_style_policy_applies_to_all_cells() {
        let charts = [chart("a", 1), chart("b", 1), chart("c", 1)];
        let figure = compose(&charts, &SubplotOptions::default()).unwrap();

        for axis in figure.layout.xaxes.iter().chain(figure.layout.yaxes.iter()) {
            assert_eq!(axis.gridcolor.as_deref(), Some("#CCCCCC"));
        }
        for trace in &figure.data {
            assert_eq!(trace.hovertemplate.as_deref(), Some("x: %{x}<br>y: %{y}"));
        }
        assert_eq!(figure.layout.showlegend, Some(true));
    }

    #[test]
    fn test_shared_axes_pass_through() {
        let charts = [chart("a", 1), chart("b", 1)];
        let options = SubplotOptions {
            shared_y: true,
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();
        let y2 = figure.layout.axis(AxisId::y(2)).unwrap();
        assert_eq!(y2.matches.as_deref(), Some("y"));
    }

    #[test]
    fn test_tall_grid_spacing_shrinks() {
        let charts: Vec<Figure> = (0..12).map(|i| chart(&format!("c{}", i), 1)).collect();
        let options = SubplotOptions {
            cols: 1,
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(figure.layout.axis_count(AxisKind::Y), 12);
        assert_eq!(figure.layout.height, Some(600.0 + 400.0 * 11.0));
        for axis in &figure.layout.yaxes {
            let [lo, hi] = axis.domain.unwrap();
            assert!(lo < hi);
        }
    }

    #[test]
    fn test_zero_rows_grows_from_empty() {
        let options = SubplotOptions {
            rows: 0,
            ..Default::default()
        };
        let size = fit_rows(&options, 3).unwrap();
        assert_eq!(size.rows, 2);
        assert_eq!(size.height, 600 + 800);
    }

    #[test]
    fn test_oversized_grid_is_invalid() {
        let options = SubplotOptions {
            rows: 2,
            cols: usize::MAX / 2 + 1,
            ..Default::default()
        };
        assert!(matches!(
            fit_rows(&options, 1),
            Err(GraphmodexError::InvalidInput(_))
        ));
        let result = compose(&[chart("a", 1)], &options);
        assert!(matches!(result, Err(GraphmodexError::InvalidInput(_))));
    }

    #[test]
    fn test_customdata_opt_out_keeps_hover_templates() {
        let mut first = chart("a", 2);
        first.data[0].hovertemplate = Some("%{x} sold".to_string());
        let mut second = chart("b", 1);
        second.data[0].hovertemplate = Some("%{y} left".to_string());
        let charts = [first, second];

        let options = SubplotOptions {
            style: LayoutStyle {
                customdata: CustomData::OptOut,
                ..Default::default()
            },
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        let templates: Vec<Option<&str>> = figure
            .data
            .iter()
            .map(|t| t.hovertemplate.as_deref())
            .collect();
        assert_eq!(templates, vec![Some("%{x} sold"), None, Some("%{y} left")]);
        // Composer settings still win over the base style
        assert_eq!(figure.layout.width, Some(1400.0));
    }

    #[test]
    fn test_style_overrides_then_layout_overrides() {
        let charts = [chart("a", 1), chart("b", 1)];
        let options = SubplotOptions {
            style: LayoutStyle {
                overrides: json!({
                    "width": 900,
                    "hovermode": "closest",
                    "xaxis": {"gridcolor": "blue"}
                })
                .as_object()
                .unwrap()
                .clone(),
                ..Default::default()
            },
            layout_overrides: json!({"width": 800, "xaxis1": {"gridcolor": "red"}})
                .as_object()
                .unwrap()
                .clone(),
            ..Default::default()
        };
        let figure = compose(&charts, &options).unwrap();

        assert_eq!(figure.layout.width, Some(800.0));
        assert_eq!(figure.layout.attributes["hovermode"], "closest");
        let first = figure.layout.axis(AxisId::x(1)).unwrap();
        assert_eq!(first.gridcolor.as_deref(), Some("red"));
        let second = figure.layout.axis(AxisId::x(2)).unwrap();
        assert_eq!(second.gridcolor.as_deref(), Some("#CCCCCC"));
    }

    proptest! {
        #[test]
        fn prop_rows_grow_minimally(
            rows in 0usize..4,
            cols in 1usize..5,
            charts in 1usize..20,
        ) {
            let options = SubplotOptions { rows, cols, ..Default::default() };
            let size = fit_rows(&options, charts).unwrap();

            prop_assert!(size.rows * cols >= charts);
            prop_assert!(size.rows >= rows);
            if size.rows > rows {
                prop_assert!((size.rows - 1) * cols < charts);
                prop_assert_eq!(size.vertical_spacing, EXPANDED_VERTICAL_SPACING);
            } else {
                prop_assert_eq!(size.vertical_spacing, options.vertical_spacing);
            }
            let added = (size.rows - rows) as u32;
            prop_assert_eq!(size.height, options.height + ROW_HEIGHT_STEP * added);
        }

        #[test]
        fn prop_every_trace_placed_once(
            traces in proptest::collection::vec(0usize..4, 1..8),
            cols in 1usize..4,
        ) {
            let charts: Vec<Figure> = traces
                .iter()
                .enumerate()
                .map(|(i, n)| chart(&format!("c{}", i), *n))
                .collect();
            let options = SubplotOptions { cols, ..Default::default() };
            let figure = compose(&charts, &options).unwrap();

            let expected: Vec<String> = charts.iter().flat_map(names).collect();
            prop_assert_eq!(names(&figure), expected);

            for (i, chart) in charts.iter().enumerate() {
                let cell = AxisId::x(i + 1).trace_ref();
                for trace in &chart.data {
                    let placed = figure
                        .data
                        .iter()
                        .find(|t| t.name == trace.name)
                        .and_then(|t| t.xaxis.clone());
                    prop_assert_eq!(placed, Some(cell.clone()));
                }
            }
        }
    }
}

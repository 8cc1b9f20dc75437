//! Subplot grids
//!
//! Builds an empty figure whose layout holds one x/y axis pair per grid cell,
//! each pair confined to its cell's share of the canvas, and places traces
//! into cells.
//!
//! Cells are numbered row-major from the top-left corner starting at 1; cell
//! `k` owns axes `xaxis{k}` / `yaxis{k}`.

use serde::{Deserialize, Serialize};

use crate::figure::{Annotation, AxisId, AxisKind, Figure, Trace};
use crate::{GraphmodexError, Result};

/// Font size of subplot title annotations
const SUBPLOT_TITLE_FONT_SIZE: f64 = 16.0;

/// Grid construction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    /// Every x axis in a column follows the column's bottom axis
    pub shared_x: bool,
    /// Every y axis in a row follows the row's first axis
    pub shared_y: bool,
    /// Gap between columns, as a fraction of the figure width
    pub horizontal_spacing: f64,
    /// Gap between rows, as a fraction of the figure height
    pub vertical_spacing: f64,
    /// Titles for cells in row-major order
    pub subplot_titles: Vec<String>,
    /// Number of cells (row-major) that receive axes; all cells when unset
    pub cells: Option<usize>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            shared_x: false,
            shared_y: false,
            horizontal_spacing: 0.08,
            vertical_spacing: 0.08,
            subplot_titles: Vec::new(),
            cells: None,
        }
    }
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }

    /// Number of cells that receive an axis pair
    pub fn cell_count(&self) -> Result<usize> {
        match self.cells {
            Some(cells) => Ok(cells),
            None => self.capacity(),
        }
    }

    /// Number of cells in the grid
    fn capacity(&self) -> Result<usize> {
        self.rows.checked_mul(self.cols).ok_or_else(|| {
            GraphmodexError::InvalidInput(format!(
                "A {}x{} grid has too many cells",
                self.rows, self.cols
            ))
        })
    }

    fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GraphmodexError::InvalidInput(format!(
                "Grid needs at least one row and one column, got {}x{}",
                self.rows, self.cols
            )));
        }
        check_spacing("horizontal_spacing", self.horizontal_spacing, self.cols)?;
        check_spacing("vertical_spacing", self.vertical_spacing, self.rows)?;
        let cells = self.cell_count()?;
        if cells > self.capacity()? {
            return Err(GraphmodexError::InvalidInput(format!(
                "{} cells do not fit in a {}x{} grid",
                cells, self.rows, self.cols
            )));
        }
        Ok(())
    }
}

fn check_spacing(name: &str, spacing: f64, count: usize) -> Result<()> {
    if !(0.0..1.0).contains(&spacing) {
        return Err(GraphmodexError::InvalidInput(format!(
            "{} must be in [0, 1), got {}",
            name, spacing
        )));
    }
    if count > 1 && spacing * (count - 1) as f64 >= 1.0 {
        return Err(GraphmodexError::InvalidInput(format!(
            "{} of {} leaves no room for {} subplots",
            name, spacing, count
        )));
    }
    Ok(())
}

/// Extent of slot `i` out of `count`, separated by `spacing`
fn slot_domain(i: usize, count: usize, spacing: f64) -> [f64; 2] {
    let size = (1.0 - spacing * (count - 1) as f64) / count as f64;
    let start = i as f64 * (size + spacing);
    [start.clamp(0.0, 1.0), (start + size).clamp(0.0, 1.0)]
}

/// An empty subplot figure plus the shape needed to place traces
#[derive(Debug, Clone, PartialEq)]
pub struct SubplotGrid {
    figure: Figure,
    rows: usize,
    cols: usize,
    cells: usize,
}

impl SubplotGrid {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells that own an axis pair
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Cell number (1-based, row-major) of a row/column position
    pub fn cell_index(&self, row: usize, col: usize) -> Result<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return Err(GraphmodexError::InvalidInput(format!(
                "Cell ({}, {}) is outside the {}x{} grid",
                row, col, self.rows, self.cols
            )));
        }
        let index = (row - 1) * self.cols + col;
        if index > self.cells {
            return Err(GraphmodexError::InvalidInput(format!(
                "Cell ({}, {}) has no axes",
                row, col
            )));
        }
        Ok(index)
    }

    /// Add a trace to the cell at `row`, `col` (both 1-based)
    pub fn add_trace(&mut self, mut trace: Trace, row: usize, col: usize) -> Result<()> {
        let index = self.cell_index(row, col)?;
        trace.set_axes(AxisId::x(index), AxisId::y(index));
        self.figure.data.push(trace);
        Ok(())
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn figure_mut(&mut self) -> &mut Figure {
        &mut self.figure
    }

    pub fn into_figure(self) -> Figure {
        self.figure
    }
}

/// Build an empty subplot grid
pub fn make_grid(spec: &GridSpec) -> Result<SubplotGrid> {
    spec.validate()?;

    let cells = spec.cell_count()?;
    let mut figure = Figure::new();

    for index in 1..=cells {
        let row = (index - 1) / spec.cols;
        let col = (index - 1) % spec.cols;

        let x_domain = slot_domain(col, spec.cols, spec.horizontal_spacing);
        // Row 0 is drawn at the top of the canvas
        let y_domain = slot_domain(spec.rows - 1 - row, spec.rows, spec.vertical_spacing);

        for (kind, domain) in [(AxisKind::X, x_domain), (AxisKind::Y, y_domain)] {
            let id = AxisId::new(kind, index);
            let axis = figure.layout.ensure_axis(id);
            axis.domain = Some(domain);
            axis.anchor = Some(id.partner().trace_ref());
        }

        if let Some(title) = spec.subplot_titles.get(index - 1) {
            if !title.is_empty() {
                figure.layout.annotations.push(title_annotation(title, x_domain, y_domain));
            }
        }
    }

    if spec.shared_x {
        link_shared_x(&mut figure, spec.cols, cells);
    }
    if spec.shared_y {
        link_shared_y(&mut figure, spec.cols, cells);
    }

    tracing::debug!(
        rows = spec.rows,
        cols = spec.cols,
        cells,
        "built subplot grid"
    );

    Ok(SubplotGrid {
        figure,
        rows: spec.rows,
        cols: spec.cols,
        cells,
    })
}

fn title_annotation(title: &str, x_domain: [f64; 2], y_domain: [f64; 2]) -> Annotation {
    let mut annotation = Annotation {
        text: Some(title.to_string()),
        x: Some((x_domain[0] + x_domain[1]) / 2.0),
        y: Some(y_domain[1]),
        xref: Some("paper".to_string()),
        yref: Some("paper".to_string()),
        xanchor: Some("center".to_string()),
        yanchor: Some("bottom".to_string()),
        showarrow: Some(false),
        ..Default::default()
    };
    annotation.attributes.insert(
        "font".to_string(),
        serde_json::json!({ "size": SUBPLOT_TITLE_FONT_SIZE }),
    );
    annotation
}

/// Columns follow their lowest populated cell; only that cell shows tick labels
fn link_shared_x(figure: &mut Figure, cols: usize, cells: usize) {
    for col in 1..=cols.min(cells) {
        let column_cells: Vec<usize> = (col..=cells).step_by(cols).collect();
        let Some(&bottom) = column_cells.last() else {
            continue;
        };
        let anchor = AxisId::x(bottom).trace_ref();
        for &index in &column_cells {
            if index == bottom {
                continue;
            }
            if let Some(axis) = figure.layout.axis_mut(AxisId::x(index)) {
                axis.matches = Some(anchor.clone());
                axis.showticklabels = Some(false);
            }
        }
    }
}

/// Rows follow their first cell; only that cell shows tick labels
fn link_shared_y(figure: &mut Figure, cols: usize, cells: usize) {
    for first in (1..=cells).step_by(cols) {
        let anchor = AxisId::y(first).trace_ref();
        let last = (first + cols - 1).min(cells);
        for index in first + 1..=last {
            if let Some(axis) = figure.layout.axis_mut(AxisId::y(index)) {
                axis.matches = Some(anchor.clone());
                axis.showticklabels = Some(false);
            }
        }
    }
}

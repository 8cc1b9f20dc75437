/*!
# graphmodex - Plotly figure styling and composition

graphmodex applies a consistent visual policy (axis grids, colors, legends,
hover templates) to Plotly figures and arranges several figures into a single
subplot grid.

Figures are held in a small typed model that reads and writes the Plotly
figure JSON format, so charts produced by any Plotly front end can be loaded,
restyled, composed and written back out.

## Example

```rust,ignore
use graphmodex::{compose, Figure, SubplotOptions};

let revenue = Figure::from_path("revenue.json")?;
let costs = Figure::from_path("costs.json")?;

let options = SubplotOptions {
    title: "Quarterly report".to_string(),
    ..Default::default()
};
let combined = compose(&[revenue, costs], &options)?;
```

## Core Components

- [`figure`] - Figure, trace, layout and axis types
- [`grid`] - Empty subplot grids and trace placement
- [`style`] - The uniform layout policy
- [`compose`](mod@compose) - Multi-figure subplot composition
- [`writer`] - JSON and HTML output
*/

pub mod compose;
pub mod figure;
pub mod grid;
pub mod style;
pub mod writer;

// Re-export key types for convenience
pub use compose::{compose, AxisNames, SubplotOptions};
pub use figure::{Axis, AxisId, AxisKind, AxisType, Figure, Layout, Trace};
pub use grid::{make_grid, GridSpec, SubplotGrid};
pub use style::{apply_style, CustomData, HoverLabels, LayoutStyle, LegendOrientation, LegendStyle};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum GraphmodexError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Output generation error: {0}")]
    WriterError(String),
}

pub type Result<T> = std::result::Result<T, GraphmodexError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/*!
graphmodex Command Line Interface

Applies the uniform layout policy to Plotly figure JSON files and composes
several figures into one subplot grid.

## Usage

```bash
graphmodex style chart.json --title "Revenue" --output styled.html --format html
graphmodex compose a.json b.json c.json --cols 2 --config options.json
```
*/

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graphmodex::writer::{JsonWriter, Writer};
use graphmodex::{apply_style, compose, Figure, LayoutStyle, SubplotOptions, VERSION};

#[cfg(feature = "html")]
use graphmodex::writer::HtmlWriter;

#[derive(Parser)]
#[command(name = "graphmodex")]
#[command(about = "Consistent styling and subplot composition for Plotly figures")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Html,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the layout policy to one figure
    Style {
        /// Plotly figure JSON file
        file: PathBuf,

        /// JSON file with style options (any subset of fields)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Figure title
        #[arg(long)]
        title: Option<String>,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Combine several figures into one subplot grid
    Compose {
        /// Plotly figure JSON files, placed in row-major order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// JSON file with composition options (any subset of fields)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting number of rows
        #[arg(long)]
        rows: Option<usize>,

        /// Number of columns
        #[arg(long)]
        cols: Option<usize>,

        /// Overall figure title
        #[arg(long)]
        title: Option<String>,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Starting canvas height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Output file path (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

/// Read options from a JSON file, or use defaults
fn load_options<T: DeserializeOwned + Default>(path: Option<&Path>) -> anyhow::Result<T> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(T::default()),
    }
}

fn load_figure(path: &Path) -> anyhow::Result<Figure> {
    Figure::from_path(path).with_context(|| format!("Failed to load figure {}", path.display()))
}

fn render(figure: &Figure, format: OutputFormat) -> anyhow::Result<String> {
    let output = match format {
        OutputFormat::Json => JsonWriter::new().write(figure)?,
        #[cfg(feature = "html")]
        OutputFormat::Html => HtmlWriter::new().write(figure)?,
        #[cfg(not(feature = "html"))]
        OutputFormat::Html => {
            anyhow::bail!("HTML writer not compiled in. Rebuild with --features html")
        }
    };
    Ok(output)
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for figure output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphmodex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Style {
            file,
            config,
            width,
            height,
            title,
            output,
            format,
        } => {
            let mut style: LayoutStyle = load_options(config.as_deref())?;
            if let Some(width) = width {
                style.width = width;
            }
            if let Some(height) = height {
                style.height = height;
            }
            if title.is_some() {
                style.title = title;
            }

            let mut figure = load_figure(&file)?;
            apply_style(&mut figure, &style)?;
            info!("Styled {} trace(s) from {}", figure.data.len(), file.display());

            emit(&render(&figure, format)?, output.as_deref())?;
        }

        Commands::Compose {
            files,
            config,
            rows,
            cols,
            title,
            width,
            height,
            output,
            format,
        } => {
            let mut options: SubplotOptions = load_options(config.as_deref())?;
            if let Some(rows) = rows {
                options.rows = rows;
            }
            if let Some(cols) = cols {
                options.cols = cols;
            }
            if let Some(title) = title {
                options.title = title;
            }
            if let Some(width) = width {
                options.width = width;
            }
            if let Some(height) = height {
                options.height = height;
            }

            let charts = files
                .iter()
                .map(|f| load_figure(f))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let figure = compose(&charts, &options)?;
            info!("Composed {} figure(s)", charts.len());

            emit(&render(&figure, format)?, output.as_deref())?;
        }
    }

    Ok(())
}

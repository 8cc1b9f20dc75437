//! Output writer abstraction layer for graphmodex
//!
//! All writers implement the `Writer` trait, which provides:
//! - Figure → Output conversion
//! - Validation for writer compatibility
//!
//! # Example
//!
//! ```rust,ignore
//! use graphmodex::writer::{HtmlWriter, Writer};
//!
//! let writer = HtmlWriter::new();
//! let page = writer.write(&figure)?;
//! std::fs::write("figure.html", page)?;
//! ```

use crate::figure::{AxisKind, Figure};
use crate::{GraphmodexError, Result};

mod json;

#[cfg(feature = "html")]
mod html;

pub use json::JsonWriter;

#[cfg(feature = "html")]
pub use html::HtmlWriter;

/// Trait for figure output writers
pub trait Writer {
    /// The output type produced by this writer.
    type Output;

    /// Generate output from a figure
    ///
    /// # Errors
    ///
    /// Returns `GraphmodexError::WriterError` if the figure fails
    /// [`Writer::validate`] or cannot be encoded.
    fn write(&self, figure: &Figure) -> Result<Self::Output>;

    /// Validate that a figure can be rendered
    ///
    /// Every axis a trace refers to must exist in the layout. The first x and
    /// y axes are implicit and always accepted.
    fn validate(&self, figure: &Figure) -> Result<()> {
        for (trace_idx, trace) in figure.data.iter().enumerate() {
            for kind in [AxisKind::X, AxisKind::Y] {
                let id = trace.axis_id(kind);
                if id.index > 1 && figure.layout.axis(id).is_none() {
                    return Err(GraphmodexError::WriterError(format!(
                        "Trace {} refers to missing axis '{}'",
                        trace_idx + 1,
                        id
                    )));
                }
            }
        }
        Ok(())
    }
}

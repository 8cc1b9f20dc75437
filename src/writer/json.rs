//! Plotly figure JSON writer

use super::Writer;
use crate::figure::Figure;
use crate::{GraphmodexError, Result};

/// Writes a figure as Plotly figure JSON
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    /// Create a writer producing indented JSON
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a writer producing single-line JSON
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for JsonWriter {
    type Output = String;

    fn write(&self, figure: &Figure) -> Result<String> {
        self.validate(figure)?;

        let encoded = if self.pretty {
            serde_json::to_string_pretty(figure)
        } else {
            serde_json::to_string(figure)
        };
        encoded.map_err(|e| {
            GraphmodexError::WriterError(format!("Failed to serialize figure JSON: {}", e))
        })
    }
}

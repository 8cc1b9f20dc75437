//! Standalone HTML writer
//!
//! Produces a self-contained page that loads plotly.js from a CDN and draws
//! the figure into a single `div`.

use super::Writer;
use crate::figure::Figure;
use crate::{GraphmodexError, Result};

/// plotly.js bundle loaded by generated pages
const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Writes a figure as an HTML document
pub struct HtmlWriter {
    /// Script URL for plotly.js
    plotly_url: String,
    /// Id of the container element
    div_id: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self {
            plotly_url: PLOTLY_CDN_URL.to_string(),
            div_id: "graphmodex-figure".to_string(),
        }
    }

    /// Load plotly.js from another location (e.g. a local copy)
    pub fn with_plotly_url(mut self, url: impl Into<String>) -> Self {
        self.plotly_url = url.into();
        self
    }

    pub fn with_div_id(mut self, id: impl Into<String>) -> Self {
        self.div_id = id.into();
        self
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Make JSON safe to embed in a `<script>` element
fn escape_for_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Writer for HtmlWriter {
    type Output = String;

    fn write(&self, figure: &Figure) -> Result<String> {
        self.validate(figure)?;

        let data = serde_json::to_string(&figure.data).map_err(|e| {
            GraphmodexError::WriterError(format!("Failed to serialize traces: {}", e))
        })?;
        let layout = serde_json::to_string(&figure.layout).map_err(|e| {
            GraphmodexError::WriterError(format!("Failed to serialize layout: {}", e))
        })?;

        let title = escape_attribute(figure.title_text().unwrap_or("graphmodex"));
        let div_id = escape_attribute(&self.div_id);
        let div_id_js = serde_json::to_string(&self.div_id).map_err(|e| {
            GraphmodexError::WriterError(format!("Failed to encode div id: {}", e))
        })?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{url}"></script>
</head>
<body>
<div id="{div_id}"></div>
<script>
Plotly.newPlot({div_id_js}, {data}, {layout});
</script>
</body>
</html>
"#,
            title = title,
            url = escape_attribute(&self.plotly_url),
            div_id = div_id,
            div_id_js = escape_for_script(&div_id_js),
            data = escape_for_script(&data),
            layout = escape_for_script(&layout),
        ))
    }
}

//! Output formatting: JSON, compact JSON, YAML.

use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render any serde value in the chosen format.
pub fn render<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(render_err)?,
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_err)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_err)?,
    };
    Ok(rendered)
}

/// Print the rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end());
}

#[allow(clippy::needless_pass_by_value)]
fn render_err(e: impl std::fmt::Display) -> CliError {
    CliError::Render(e.to_string())
}

//! Rendering of loaded entities to stdout.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for `mlent load` and `mlent component`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Serialize `value` in `format`, without a trailing newline.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("failed to render entity as YAML")?
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to render entity as JSON")?
        }
    };
    Ok(text.trim_end().to_string())
}

use std::path::Path;

use anyhow::Context;
use tracing::info;

use super::types::{RouteTable, TableFormat};

/// Read and parse a route table file. The format follows the extension
/// (`.json`, `.toml`, otherwise YAML).
///
/// # Errors
///
/// Fails when the file cannot be read or does not parse as a route table.
pub fn load_table<P: AsRef<Path>>(path: P) -> anyhow::Result<RouteTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route table {}", path.display()))?;
    let format = TableFormat::from_extension(path.extension().and_then(|e| e.to_str()));
    let table = parse_table(&content, format)
        .with_context(|| format!("failed to parse route table {}", path.display()))?;
    info!(
        path = %path.display(),
        routes_count = table.routes.len(),
        "Route table loaded"
    );
    Ok(table)
}

/// Parse a route table from a string.
///
/// # Errors
///
/// Fails when `content` is not a valid table in `format`.
pub fn parse_table(content: &str, format: TableFormat) -> anyhow::Result<RouteTable> {
    let table = match format {
        TableFormat::Yaml => serde_yaml::from_str(content)?,
        TableFormat::Json => serde_json::from_str(content)?,
        TableFormat::Toml => toml::from_str(content)?,
    };
    Ok(table)
}

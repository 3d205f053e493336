//! Output rendering
//!
//! Collections render either as a fixed-width table driven by each kind's
//! column definitions, or as a JSON array of raw remote records. Table cells
//! support dot-notation paths into the record plus the derived `_name` and
//! `_id` pseudo-fields.

use crate::config::OutputFormat;
use crate::resource::collection::Collection;
use crate::resource::kind::ColumnDef;
use crate::resource::model::{FromRemoteRecord, Resource};
use serde_json::Value;
use std::io::Write;

/// Extract a display value from a record using a dot-notation path.
/// Numeric path segments index into arrays. Missing values render as `-`.
pub fn extract_json_value(item: &Value, path: &str) -> String {
    let mut current = item;

    for part in path.split('.') {
        let next = match part.parse::<usize>() {
            Ok(idx) => current.get(idx),
            Err(_) => current.get(part),
        };
        current = match next {
            Some(v) => v,
            None => return "-".to_string(),
        };
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

fn cell_value<R: Resource>(resource: &R, column: &ColumnDef) -> String {
    match column.json_path {
        "_name" => resource.name().unwrap_or_else(|| "-".to_string()),
        "_id" => resource.id().unwrap_or_else(|| "-".to_string()),
        path => extract_json_value(resource.remote_data(), path),
    }
}

fn pad(value: &str, width: usize) -> String {
    let mut cell: String = value.chars().take(width).collect();
    while cell.chars().count() < width {
        cell.push(' ');
    }
    cell
}

/// Render a collection as a fixed-width table.
pub fn render_table<R: FromRemoteRecord>(collection: &Collection<R>) -> String {
    let columns = collection.kind().def().columns;
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|c| pad(c.header, c.width))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for resource in collection.iter() {
        let row: Vec<String> = columns
            .iter()
            .map(|c| pad(&cell_value(resource, c), c.width))
            .collect();
        out.push_str(row.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Render a collection as a pretty-printed JSON array of raw records.
pub fn render_json<R: FromRemoteRecord>(collection: &Collection<R>) -> String {
    let records: Vec<&Value> = collection.iter().map(Resource::remote_data).collect();
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

/// Write a collection to the given sink in the chosen format.
pub fn print_collection<R: FromRemoteRecord, W: Write>(
    writer: &mut W,
    collection: &Collection<R>,
    format: OutputFormat,
) -> std::io::Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_table(collection),
        OutputFormat::Json => render_json(collection),
    };
    writeln!(writer, "{}", rendered.trim_end())
}

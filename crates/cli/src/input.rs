//! Loading of the two flat input exports. The engine's contract is "ordered
//! sequence of loosely keyed records"; the file format here is a JSON array
//! of flat objects, the shape upstream spreadsheet tooling exports to.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use dealscope_core::RawRecord;
use serde_json::Value;

/// Reads a JSON array of objects. A missing path yields an empty sequence so
/// a run can be driven by a single export; non-object array entries are
/// skipped rather than failing the batch.
pub fn load_records(path: Option<&Path>) -> Result<Vec<RawRecord>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read input file {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("input file {} is not valid JSON", path.display()))?;

    let Value::Array(entries) = parsed else {
        bail!("input file {} must contain a JSON array of records", path.display());
    };

    let records: Vec<RawRecord> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();

    tracing::debug!(path = %path.display(), records = records.len(), "loaded input records");
    Ok(records)
}

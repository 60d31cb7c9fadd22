//! Series file discovery and parsing.
//!
//! Lists the `*.json` files of the data directory (minus the aggregate
//! output) and classifies each one as an optimized or flat-list document.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument};

use talksite_shared::{
    Result, SeriesDocument, SeriesInfo, SeriesRegistry, TalkRecord, TalksiteError, is_truthy,
};

/// A series file found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name, e.g. `kim.json`.
    pub file_name: String,
    /// File name without the `.json` extension; the registry key.
    pub stem: String,
}

/// List series files in `data_dir`, sorted by file name.
///
/// Only regular files ending in `.json` are returned, and `aggregate_file`
/// is always excluded so the merge never reads its own output.
#[instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub async fn list_series_files(data_dir: &Path, aggregate_file: &str) -> Result<Vec<SeriesFile>> {
    let mut entries = tokio::fs::read_dir(data_dir)
        .await
        .map_err(|e| TalksiteError::io(data_dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| TalksiteError::io(data_dir, e))?
    {
        let path = entry.path();
        // Follows symlinks, unlike `DirEntry::file_type`.
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| TalksiteError::io(&path, e))?;
        if !metadata.is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(String::from) else {
            debug!(path = %path.display(), "skipping non-UTF-8 file name");
            continue;
        };
        if file_name == aggregate_file {
            continue;
        }
        let Some(stem) = file_name.strip_suffix(".json") else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }

        files.push(SeriesFile {
            path,
            stem: stem.to_string(),
            file_name,
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!(count = files.len(), "series files listed");
    Ok(files)
}

/// Read and classify one series file.
///
/// I/O failures and invalid JSON are errors; a well-formed JSON value of
/// the wrong shape comes back as [`SeriesDocument::Unrecognized`].
pub async fn load_document(path: &Path) -> Result<SeriesDocument> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TalksiteError::io(path, e))?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| TalksiteError::json(path, e))?;
    classify(value).map_err(|e| TalksiteError::json(path, e))
}

/// Decide the document shape from a parsed JSON value.
///
/// An object counts as optimized only when both `series` and `talks` are
/// present and truthy; an array is a flat list of talks.
pub fn classify(value: Value) -> serde_json::Result<SeriesDocument> {
    match value {
        Value::Object(mut map) if is_truthy(map.get("series")) && is_truthy(map.get("talks")) => {
            let series: SeriesInfo =
                serde_json::from_value(map.remove("series").unwrap_or_default())?;
            let talks: Vec<TalkRecord> =
                serde_json::from_value(map.remove("talks").unwrap_or_default())?;
            Ok(SeriesDocument::Optimized { series, talks })
        }
        Value::Array(items) => {
            let talks = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<serde_json::Result<Vec<TalkRecord>>>()?;
            Ok(SeriesDocument::FlatList(talks))
        }
        other => Ok(SeriesDocument::Unrecognized {
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without series/talks",
    }
}

// ---------------------------------------------------------------------------
// Registry audit
// ---------------------------------------------------------------------------

/// How the registry lines up with the files actually present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryAudit {
    /// `(stem, slug)` for files that have a mapping.
    pub mapped: Vec<(String, String)>,
    /// Stems of files with no mapping; the merge skips these.
    pub unmapped: Vec<String>,
    /// Registry stems with no matching file.
    pub orphaned: Vec<String>,
}

/// Compare the series files in a directory against the registry.
pub fn audit_registry(files: &[SeriesFile], registry: &SeriesRegistry) -> RegistryAudit {
    let mut audit = RegistryAudit::default();

    for file in files {
        match registry.slug_for(&file.stem) {
            Some(slug) => audit.mapped.push((file.stem.clone(), slug.to_string())),
            None => audit.unmapped.push(file.stem.clone()),
        }
    }

    audit.orphaned = registry
        .iter()
        .filter(|(stem, _)| !files.iter().any(|f| f.stem == *stem))
        .map(|(stem, _)| stem.to_string())
        .collect();

    audit
}

//! End-to-end merge pipeline: list → load → normalize → sort → write.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use talksite_shared::{
    Result, SeriesDocument, SeriesRegistry, SiteConfig, SitePaths, TalkRecord, TalksiteError,
};

use crate::aggregate::aggregate;
use crate::loader::{list_series_files, load_document};
use crate::normalize::{normalize_document, series_link};

/// Configuration for [`merge_talks`].
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Directory holding the series files.
    pub data_dir: PathBuf,
    /// Aggregate file name inside `data_dir`; excluded from input.
    pub aggregate_file: String,
    /// Series file stem → slug.
    pub registry: SeriesRegistry,
    /// URL prefix for generated series links.
    pub link_prefix: String,
}

impl MergeConfig {
    /// Build from a loaded site config and its resolved paths.
    pub fn new(config: &SiteConfig, paths: &SitePaths) -> Self {
        Self {
            data_dir: paths.data_dir.clone(),
            aggregate_file: paths.aggregate_file.clone(),
            registry: config.series.clone(),
            link_prefix: config.paths.link_prefix.clone(),
        }
    }

    /// Full path of the aggregate output file.
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.aggregate_file)
    }
}

/// Why a series file contributed no talks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The registry has no slug for the file's stem.
    Unmapped,
    /// The JSON was neither a `{series, talks}` object nor an array.
    UnknownStructure { kind: &'static str },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unmapped => write!(f, "no series directory mapping"),
            Self::UnknownStructure { kind } => write!(f, "unknown structure ({kind})"),
        }
    }
}

/// A file the merge skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Where the aggregate was written.
    pub output_path: PathBuf,
    /// Total talks written.
    pub talk_count: usize,
    /// Every series file considered, in processing order.
    pub files: Vec<String>,
    /// Files that were skipped with a warning.
    pub skipped: Vec<SkippedFile>,
}

/// Run the merge.
///
/// Files are read one after another. A missing mapping or an unknown
/// document shape skips that file with a warning; any I/O or JSON error
/// aborts the run before the aggregate is touched.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub async fn merge_talks(config: &MergeConfig) -> Result<MergeReport> {
    let files = list_series_files(&config.data_dir, &config.aggregate_file).await?;
    info!(files = files.len(), "merging series files");

    let mut batches: Vec<Vec<TalkRecord>> = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in &files {
        let document = load_document(&file.path).await?;
        debug!(file = %file.file_name, talks = document.talk_count(), "series file loaded");

        let Some(slug) = config.registry.slug_for(&file.stem) else {
            warn!(
                file = %file.file_name,
                "no series directory mapping found; add it to the [series] table"
            );
            skipped.push(SkippedFile {
                file_name: file.file_name.clone(),
                reason: SkipReason::Unmapped,
            });
            continue;
        };

        if let SeriesDocument::Unrecognized { kind } = document {
            warn!(file = %file.file_name, kind, "skipping file: unknown structure");
            skipped.push(SkippedFile {
                file_name: file.file_name.clone(),
                reason: SkipReason::UnknownStructure { kind },
            });
            continue;
        }

        let link = series_link(&config.link_prefix, slug);
        let talks = normalize_document(document, &link);
        debug!(file = %file.file_name, slug, talks = talks.len(), "series normalized");
        batches.push(talks);
    }

    let talks = aggregate(batches);
    let output_path = config.output_path();
    write_aggregate(&output_path, &talks).await?;

    info!(
        talks = talks.len(),
        skipped = skipped.len(),
        path = %output_path.display(),
        "merge complete"
    );

    Ok(MergeReport {
        output_path,
        talk_count: talks.len(),
        files: files.into_iter().map(|f| f.file_name).collect(),
        skipped,
    })
}

/// Render the aggregate as pretty-printed JSON (two-space indent).
pub fn render_aggregate(talks: &[TalkRecord]) -> Result<String> {
    serde_json::to_string_pretty(talks).map_err(|e| {
        TalksiteError::validation(format!("JSON serialization failed: {e}"))
    })
}

/// Write the aggregate file, replacing any previous content.
pub async fn write_aggregate(path: &Path, talks: &[TalkRecord]) -> Result<()> {
    let json = render_aggregate(talks)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| TalksiteError::io(path, e))?;
    debug!(path = %path.display(), "wrote aggregate file");
    Ok(())
}

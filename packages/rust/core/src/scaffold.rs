//! Per-series page scaffolding.
//!
//! Creates `<series_dir>/<stem>/index.html` for every series file, each a
//! byte-for-byte copy of the site template. The directory name is the file
//! stem itself, not the registry slug.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use talksite_shared::{Result, SiteConfig, SitePaths, TalksiteError};

use crate::loader::list_series_files;
use crate::normalize::series_link;

/// Configuration for [`scaffold_series`].
#[derive(Debug, Clone)]
pub struct ScaffoldConfig {
    /// Directory whose series files name the pages to create.
    pub data_dir: PathBuf,
    /// Aggregate file name; never treated as a series.
    pub aggregate_file: String,
    /// Root under which one directory per series is created.
    pub series_dir: PathBuf,
    /// Template copied to every `index.html`.
    pub template: PathBuf,
    /// URL prefix used when reporting page URLs.
    pub link_prefix: String,
}

impl ScaffoldConfig {
    /// Build from a loaded site config and its resolved paths.
    pub fn new(config: &SiteConfig, paths: &SitePaths) -> Self {
        Self {
            data_dir: paths.data_dir.clone(),
            aggregate_file: paths.aggregate_file.clone(),
            series_dir: paths.series_dir.clone(),
            template: paths.template.clone(),
            link_prefix: config.paths.link_prefix.clone(),
        }
    }
}

/// One generated series page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldedPage {
    /// Series identifier (file stem) and directory name.
    pub stem: String,
    /// Path of the written `index.html`.
    pub index_path: PathBuf,
    /// Public URL of the page, e.g. `/series/kim/`.
    pub url: String,
}

/// Result of a scaffold run.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    pub pages: Vec<ScaffoldedPage>,
}

/// Create one directory per series and copy the template into it.
///
/// Existing `index.html` files are overwritten, so re-running is safe.
/// The template is only read when there is at least one series.
#[instrument(skip_all, fields(series_dir = %config.series_dir.display()))]
pub async fn scaffold_series(config: &ScaffoldConfig) -> Result<ScaffoldReport> {
    let files = list_series_files(&config.data_dir, &config.aggregate_file).await?;

    tokio::fs::create_dir_all(&config.series_dir)
        .await
        .map_err(|e| TalksiteError::io(&config.series_dir, e))?;

    if files.is_empty() {
        info!("no series files found; nothing to scaffold");
        return Ok(ScaffoldReport::default());
    }

    let template = tokio::fs::read(&config.template)
        .await
        .map_err(|e| TalksiteError::io(&config.template, e))?;

    info!(series = files.len(), "setting up series directories");

    let mut report = ScaffoldReport::default();
    for file in files {
        let page_dir = config.series_dir.join(&file.stem);
        tokio::fs::create_dir_all(&page_dir)
            .await
            .map_err(|e| TalksiteError::io(&page_dir, e))?;

        let index_path = page_dir.join("index.html");
        tokio::fs::write(&index_path, &template)
            .await
            .map_err(|e| TalksiteError::io(&index_path, e))?;
        debug!(path = %index_path.display(), "wrote series page");

        report.pages.push(ScaffoldedPage {
            url: series_link(&config.link_prefix, &file.stem),
            stem: file.stem,
            index_path,
        });
    }

    info!(pages = report.pages.len(), "scaffold complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "talksite-scaffold-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn make_site(root: &Path) -> ScaffoldConfig {
        let data_dir = root.join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("kim.json"), "[]").unwrap();
        std::fs::write(data_dir.join("sergio.json"), "[]").unwrap();
        std::fs::write(data_dir.join("talks.json"), "[]").unwrap();
        std::fs::write(root.join("series-template.html"), "<h1>Talk</h1>").unwrap();

        ScaffoldConfig {
            data_dir,
            aggregate_file: "talks.json".into(),
            series_dir: root.join("series"),
            template: root.join("series-template.html"),
            link_prefix: "/series".into(),
        }
    }

    #[tokio::test]
    async fn creates_one_page_per_series() {
        let root = temp_dir();
        let config = make_site(&root);

        let report = scaffold_series(&config).await.unwrap();
        let stems: Vec<_> = report.pages.iter().map(|p| p.stem.as_str()).collect();
        assert_eq!(stems, ["kim", "sergio"]);
        assert_eq!(report.pages[0].url, "/series/kim/");

        for stem in ["kim", "sergio"] {
            let page = root.join("series").join(stem).join("index.html");
            assert_eq!(std::fs::read_to_string(page).unwrap(), "<h1>Talk</h1>");
        }
        assert!(!root.join("series").join("talks").exists());
    }

    #[tokio::test]
    async fn rerun_overwrites_pages() {
        let root = temp_dir();
        let config = make_site(&root);
        scaffold_series(&config).await.unwrap();

        let page = root.join("series/kim/index.html");
        std::fs::write(&page, "stale").unwrap();
        std::fs::write(&config.template, "<h1>New</h1>").unwrap();

        scaffold_series(&config).await.unwrap();
        assert_eq!(std::fs::read_to_string(page).unwrap(), "<h1>New</h1>");
    }

    #[tokio::test]
    async fn missing_template_is_an_error() {
        let root = temp_dir();
        let mut config = make_site(&root);
        config.template = root.join("missing.html");

        let err = scaffold_series(&config).await.unwrap_err();
        assert!(matches!(err, TalksiteError::Io { .. }));
        assert!(!root.join("series/kim").exists());
    }

    #[tokio::test]
    async fn no_series_needs_no_template() {
        let root = temp_dir();
        std::fs::create_dir_all(root.join("data")).unwrap();
        std::fs::write(root.join("data/talks.json"), "[]").unwrap();
        let config = ScaffoldConfig {
            data_dir: root.join("data"),
            aggregate_file: "talks.json".into(),
            series_dir: root.join("series"),
            template: root.join("missing.html"),
            link_prefix: "/series".into(),
        };

        let report = scaffold_series(&config).await.unwrap();
        assert!(report.pages.is_empty());
        assert!(root.join("series").is_dir());
    }
}

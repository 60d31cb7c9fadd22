//! Site configuration for talksite.
//!
//! The config lives at `<site root>/talksite.toml` and is optional.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TalksiteError};
use crate::types::SeriesRegistry;

/// Default configuration file name, looked up in the site root.
pub const CONFIG_FILE_NAME: &str = "talksite.toml";

// ---------------------------------------------------------------------------
// Config structs (matching talksite.toml schema)
// ---------------------------------------------------------------------------

/// Top-level site config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Series file stem → URL slug.
    #[serde(default = "default_registry")]
    pub series: SeriesRegistry,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            series: default_registry(),
        }
    }
}

/// `[paths]` section. Relative paths resolve against the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one JSON file per series.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the merged output, inside `data_dir`. Never read as input.
    #[serde(default = "default_aggregate_file")]
    pub aggregate_file: String,

    /// Root of the generated per-series pages.
    #[serde(default = "default_series_dir")]
    pub series_dir: String,

    /// HTML template copied into every series page.
    #[serde(default = "default_template")]
    pub template: String,

    /// URL prefix for generated `seriesLink` values.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            aggregate_file: default_aggregate_file(),
            series_dir: default_series_dir(),
            template: default_template(),
            link_prefix: default_link_prefix(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_aggregate_file() -> String {
    "talks.json".into()
}
fn default_series_dir() -> String {
    "series".into()
}
fn default_template() -> String {
    "series-template.html".into()
}
fn default_link_prefix() -> String {
    "/series".into()
}

/// The series the site currently publishes.
fn default_registry() -> SeriesRegistry {
    SeriesRegistry::from_pairs([
        ("kim", "knot-theory"),
        ("sergio", "coarse-cohomology"),
        ("lukas", "spin-geometry-and-scalar-curvature-rigidity"),
        (
            "oscar",
            "invariant-theory-of-hamiltonian-mechanics-and-related-numerical-analysis",
        ),
        (
            "rajas",
            "existence-of-higher-extremal-kahler-metrics-on-minimal-ruled-surface",
        ),
        ("sandip", "on-the-groups-of-self-homotopy-equivalences"),
    ])
}

// ---------------------------------------------------------------------------
// Resolved paths (runtime, merged from config + site root)
// ---------------------------------------------------------------------------

/// Absolute-or-root-relative locations used by the merge and scaffold passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub data_dir: PathBuf,
    /// Aggregate file name (also the name excluded from input scanning).
    pub aggregate_file: String,
    pub series_dir: PathBuf,
    pub template: PathBuf,
}

impl SiteConfig {
    /// Resolve configured paths against the site root.
    pub fn resolve(&self, root: &Path) -> SitePaths {
        SitePaths {
            data_dir: root.join(&self.paths.data_dir),
            aggregate_file: self.paths.aggregate_file.clone(),
            series_dir: root.join(&self.paths.series_dir),
            template: root.join(&self.paths.template),
        }
    }

    /// Reject slugs and file names that would escape their directory or
    /// produce broken links.
    pub fn validate(&self) -> Result<()> {
        let aggregate = &self.paths.aggregate_file;
        if aggregate.is_empty() || aggregate.contains(['/', '\\']) {
            return Err(TalksiteError::config(format!(
                "aggregate_file must be a plain file name, got '{aggregate}'"
            )));
        }
        if !aggregate.ends_with(".json") {
            return Err(TalksiteError::config(format!(
                "aggregate_file must end in .json, got '{aggregate}'"
            )));
        }
        for (stem, slug) in self.series.iter() {
            if slug.is_empty() || slug.contains(['/', '\\']) || slug == "." || slug == ".." {
                return Err(TalksiteError::validation(format!(
                    "slug '{slug}' for series '{stem}' is not a single path segment"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a site root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the site config from `root`. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<SiteConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(SiteConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the site config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TalksiteError::io(path, e))?;

    let config: SiteConfig = toml::from_str(&content).map_err(|e| {
        TalksiteError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, series = config.series.len(), "loaded config");
    Ok(config)
}

/// Write a default config file into `root`. Refuses to overwrite.
/// Returns the path to the created file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(TalksiteError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(root).map_err(|e| TalksiteError::io(root, e))?;
    let content = toml::to_string_pretty(&SiteConfig::default())
        .map_err(|e| TalksiteError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TalksiteError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "talksite-config-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = SiteConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("knot-theory"));
    }

    #[test]
    fn config_roundtrip() {
        let config = SiteConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: SiteConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.paths.aggregate_file, "talks.json");
        assert_eq!(parsed.series, config.series);
    }

    #[test]
    fn config_with_custom_series_replaces_defaults() {
        let toml_str = r#"
[paths]
data_dir = "content/talks"

[series]
kim = "knot-theory"
ana = "arithmetic-geometry"
"#;
        let config: SiteConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.data_dir, "content/talks");
        assert_eq!(config.paths.series_dir, "series");
        assert_eq!(config.series.len(), 2);
        assert_eq!(config.series.slug_for("ana"), Some("arithmetic-geometry"));
        assert_eq!(config.series.slug_for("sergio"), None);
    }

    #[test]
    fn resolve_joins_root() {
        let config = SiteConfig::default();
        let paths = config.resolve(Path::new("/site"));
        assert_eq!(paths.data_dir, PathBuf::from("/site/data"));
        assert_eq!(paths.aggregate_file, "talks.json");
        assert_eq!(paths.template, PathBuf::from("/site/series-template.html"));
    }

    #[test]
    fn validate_rejects_nested_slug() {
        let config = SiteConfig {
            series: SeriesRegistry::from_pairs([("kim", "knot/theory")]),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("knot/theory"));
    }

    #[test]
    fn validate_rejects_non_json_aggregate() {
        let mut config = SiteConfig::default();
        config.paths.aggregate_file = "talks.txt".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = temp_dir();
        let config = load_config(&dir).expect("load");
        assert_eq!(config.series.len(), 6);
    }

    #[test]
    fn init_then_load() {
        let dir = temp_dir();
        let path = init_config(&dir).expect("init");
        assert!(path.exists());

        let config = load_config(&dir).expect("load");
        assert_eq!(config.paths.template, "series-template.html");

        let again = init_config(&dir);
        assert!(again.unwrap_err().to_string().contains("already exists"));
    }
}

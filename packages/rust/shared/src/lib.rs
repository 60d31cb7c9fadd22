//! Shared types, error model, and configuration for talksite.
//!
//! This crate is the foundation depended on by the other talksite crates.
//! It provides:
//! - [`TalksiteError`] — the unified error type
//! - Domain types ([`TalkRecord`], [`SeriesInfo`], [`SeriesDocument`], [`SeriesRegistry`])
//! - Configuration ([`SiteConfig`], [`SitePaths`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, PathsConfig, SiteConfig, SitePaths, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{Result, TalksiteError};
pub use types::{SeriesDocument, SeriesInfo, SeriesRegistry, TalkRecord, fields, is_truthy};

//! Merge and scaffold passes for talksite.
//!
//! This crate turns a directory of per-series talk files into the single
//! sorted `talks.json` the listing page reads (`merge_talks`), and creates
//! the per-series page directories (`scaffold_series`).

pub mod aggregate;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod scaffold;

pub use merge::{MergeConfig, MergeReport, SkipReason, SkippedFile, merge_talks};
pub use scaffold::{ScaffoldConfig, ScaffoldReport, ScaffoldedPage, scaffold_series};

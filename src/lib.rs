//! Repo-Flatten: flatten a repository's working tree into one text artifact
//!
//! The [`engine`] walks a directory, decides per file whether to include it,
//! and streams the survivors into a single framed artifact while counting
//! every verdict. Tree acquisition, configuration and the CLI sit around it.

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod utils;

pub use domain::{CandidateFile, FilterConfig, RunStatistics, SkipReason, Verdict};
pub use engine::{flatten, CancelToken, Flattener};
pub use error::FlattenError;

//! Run-fatal errors surfaced by the flattening engine.
//!
//! Per-file problems (exclusions, unreadable content) never show up here;
//! they are counted in [`RunStatistics`](crate::domain::RunStatistics).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, FlattenError>;

#[derive(Error, Debug)]
pub enum FlattenError {
    /// The traversal root could not be opened
    #[error("cannot open traversal root '{}': {source}", path.display())]
    OpenRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The traversal root exists but is not a directory
    #[error("traversal root '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// The output artifact could not be created
    #[error("cannot open output artifact '{}': {source}", path.display())]
    OpenArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing to the output artifact failed mid-run
    #[error("failed writing output artifact {target}: {source}")]
    WriteArtifact {
        /// Artifact path, or a description of the sink
        target: String,
        #[source]
        source: io::Error,
    },
}

impl FlattenError {
    pub(crate) fn write(target: impl Into<String>, source: io::Error) -> Self {
        FlattenError::WriteArtifact { target: target.into(), source }
    }
}

//! Flattening engine
//!
//! Walks a directory tree, runs every leaf through the ordered filter
//! pipeline and the content reader, and appends survivors to a single
//! artifact in visitation order while counting every verdict.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{CandidateFile, FilterConfig, RunStatistics, SkipReason, Verdict};
use crate::error::{FlattenError, Result};

pub mod filter;
pub mod reader;
pub mod walk;
pub mod writer;

pub use filter::evaluate;
pub use reader::{read_text, DecodeFailure};
pub use walk::{walk_leaves, LeafWalker};
pub use writer::{ArtifactWriter, SEPARATOR_WIDTH};

/// Candidates resolved per parallel batch. Bounds how much decoded content
/// waits in memory for its turn to be written.
const BATCH_SIZE: usize = 64;

/// Cooperative cancellation shared between the caller and a running flatten.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal outcome for one candidate, before it reaches the writer.
enum Outcome {
    Text(String),
    Skipped(SkipReason),
}

/// Configurable flattening run.
#[derive(Debug, Clone)]
pub struct Flattener {
    filter: FilterConfig,
    follow_symlinks: bool,
    parallel: bool,
    cancel: CancelToken,
}

impl Flattener {
    pub fn new(filter: FilterConfig) -> Self {
        Self { filter, follow_symlinks: false, parallel: false, cancel: CancelToken::default() }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Resolve candidates on the rayon pool; output order is unchanged.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Flatten `root` into a newly created (or truncated) file at `output`.
    pub fn flatten_to_path(&self, root: &Path, output: &Path) -> Result<RunStatistics> {
        let leaves = walk_leaves(root, self.follow_symlinks)?;
        let file = File::create(output)
            .map_err(|source| FlattenError::OpenArtifact { path: output.to_path_buf(), source })?;
        let target = format!("'{}'", output.display());
        self.run(root, leaves, BufWriter::new(file), &target)
    }

    /// Flatten `root` into an arbitrary sink.
    pub fn flatten_into<W: Write>(&self, root: &Path, sink: W) -> Result<RunStatistics> {
        let leaves = walk_leaves(root, self.follow_symlinks)?;
        self.run(root, leaves, sink, "stream")
    }

    fn run<W: Write>(
        &self,
        root: &Path,
        leaves: LeafWalker,
        sink: W,
        target: &str,
    ) -> Result<RunStatistics> {
        info!(root = %root.display(), parallel = self.parallel, "flattening tree");

        // On any error below the writer is dropped, which closes the sink.
        let mut writer = ArtifactWriter::new(sink);
        let stats = if self.parallel {
            self.run_parallel(leaves, &mut writer, target)?
        } else {
            self.run_sequential(leaves, &mut writer, target)?
        };
        let bytes = writer.bytes_written();
        writer.finish().map_err(|e| FlattenError::write(target, e))?;

        info!(
            files = stats.total_files,
            included = stats.included_files,
            bytes,
            cancelled = stats.cancelled,
            "flatten finished"
        );
        Ok(stats)
    }

    fn run_sequential<W: Write>(
        &self,
        leaves: LeafWalker,
        writer: &mut ArtifactWriter<W>,
        target: &str,
    ) -> Result<RunStatistics> {
        let mut stats = RunStatistics::default();
        for leaf in leaves {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            let candidate = leaf?;
            let outcome = resolve(&candidate, &self.filter);
            apply(writer, &mut stats, &candidate, outcome, target)?;
        }
        Ok(stats)
    }

    fn run_parallel<W: Write>(
        &self,
        mut leaves: LeafWalker,
        writer: &mut ArtifactWriter<W>,
        target: &str,
    ) -> Result<RunStatistics> {
        let mut stats = RunStatistics::default();
        loop {
            let batch = self.next_batch(&mut leaves, &mut stats)?;
            if batch.is_empty() {
                break;
            }

            // Indexed collect keeps visitation order regardless of completion order.
            let outcomes: Vec<Outcome> =
                batch.par_iter().map(|candidate| resolve(candidate, &self.filter)).collect();
            for (candidate, outcome) in batch.iter().zip(outcomes) {
                apply(writer, &mut stats, candidate, outcome, target)?;
            }

            if stats.cancelled || batch.len() < BATCH_SIZE {
                break;
            }
        }
        Ok(stats)
    }

    fn next_batch(
        &self,
        leaves: &mut LeafWalker,
        stats: &mut RunStatistics,
    ) -> Result<Vec<CandidateFile>> {
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        while batch.len() < BATCH_SIZE {
            if self.cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            match leaves.next() {
                Some(leaf) => batch.push(leaf?),
                None => break,
            }
        }
        Ok(batch)
    }
}

/// Flatten `root` into `output` with default traversal options.
pub fn flatten(root: &Path, output: &Path, filter: &FilterConfig) -> Result<RunStatistics> {
    Flattener::new(filter.clone()).flatten_to_path(root, output)
}

fn resolve(candidate: &CandidateFile, filter: &FilterConfig) -> Outcome {
    match evaluate(candidate, filter) {
        Verdict::Excluded(reason) => {
            debug!(path = %candidate.relative_path, reason = reason.as_str(), "excluded");
            Outcome::Skipped(reason)
        }
        Verdict::Included => match read_text(&candidate.path) {
            Ok(text) => Outcome::Text(text),
            Err(failure) => {
                debug!(path = %candidate.relative_path, error = %failure, "undecodable content");
                Outcome::Skipped(SkipReason::UndecodableContent)
            }
        },
    }
}

fn apply<W: Write>(
    writer: &mut ArtifactWriter<W>,
    stats: &mut RunStatistics,
    candidate: &CandidateFile,
    outcome: Outcome,
    target: &str,
) -> Result<()> {
    match outcome {
        Outcome::Text(content) => {
            writer
                .write_file(&candidate.relative_path, &content)
                .map_err(|e| FlattenError::write(target, e))?;
            stats.record(&Verdict::Included);
            stats.record_included(content.len());
        }
        Outcome::Skipped(reason) => stats.record(&Verdict::Excluded(reason)),
    }
    Ok(())
}

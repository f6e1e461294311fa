//! Leaf enumeration under the traversal root

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::domain::CandidateFile;
use crate::error::{FlattenError, Result};
use crate::utils::normalize_path;

/// Deterministic, depth-first iterator over non-directory entries.
///
/// Entries are sorted by file name inside each directory, so an unchanged tree
/// is always visited in the same order.
pub struct LeafWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

/// Open `root` for traversal. Failing to read the root itself is fatal.
pub fn walk_leaves(root: &Path, follow_symlinks: bool) -> Result<LeafWalker> {
    let metadata = fs::metadata(root)
        .map_err(|source| FlattenError::OpenRoot { path: root.to_path_buf(), source })?;
    if !metadata.is_dir() {
        return Err(FlattenError::NotADirectory { path: root.to_path_buf() });
    }
    fs::read_dir(root)
        .map_err(|source| FlattenError::OpenRoot { path: root.to_path_buf(), source })?;

    let inner = WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow_symlinks)
        .sort_by_file_name()
        .into_iter();

    Ok(LeafWalker { root: root.to_path_buf(), inner })
}

impl LeafWalker {
    fn candidate(&self, entry: &DirEntry) -> Option<CandidateFile> {
        if entry.file_type().is_dir() {
            return None;
        }

        let path = entry.path();
        // Unfollowed links: a link to a directory is treated like a directory.
        let metadata = if entry.path_is_symlink() {
            let target = fs::metadata(path);
            if matches!(&target, Ok(meta) if meta.is_dir()) {
                debug!(path = %path.display(), "skipping symlinked directory");
                return None;
            }
            target
        } else {
            entry.metadata().map_err(io::Error::from)
        };

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        Some(CandidateFile {
            path: path.to_path_buf(),
            relative_path: normalize_path(relative),
            // Unknown size lets the reader report the failure.
            size_bytes: metadata.map(|m| m.len()).unwrap_or(0),
        })
    }

    /// Followed links whose target is gone still count as visited leaves.
    fn dangling_link(&self, err: &walkdir::Error) -> Option<CandidateFile> {
        let path = err.path()?;
        let is_link = fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()).ok()?;
        if !is_link || fs::metadata(path).is_ok() {
            return None;
        }
        debug!(path = %path.display(), "dangling symlink");
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        Some(CandidateFile {
            path: path.to_path_buf(),
            relative_path: normalize_path(relative),
            size_bytes: 0,
        })
    }
}

impl Iterator for LeafWalker {
    type Item = Result<CandidateFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if let Some(candidate) = self.candidate(&entry) {
                        return Some(Ok(candidate));
                    }
                }
                Err(err) if err.depth() == 0 => {
                    let source = io::Error::from(err);
                    return Some(Err(FlattenError::OpenRoot { path: self.root.clone(), source }));
                }
                Err(err) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        warn!(
                            path = ?err.path(),
                            ancestor = %ancestor.display(),
                            "symlink loop detected, skipping"
                        );
                    } else if let Some(candidate) = self.dangling_link(&err) {
                        return Some(Ok(candidate));
                    } else {
                        warn!(path = ?err.path(), error = %err, "skipping unreadable entry");
                    }
                }
            }
        }
    }
}

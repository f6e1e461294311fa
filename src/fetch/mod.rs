//! Tree acquisition: local directories or single-branch git clones

use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the scratch directory a remote repository is cloned into.
pub const CLONE_DIR_NAME: &str = "repo_temp";

/// A populated tree ready for flattening.
///
/// For cloned repositories the clone is removed when this is dropped.
#[derive(Debug)]
pub struct RepoContext {
    pub root_path: PathBuf,
    /// Human-readable name used for the default artifact file name
    pub repo_name: String,
    cleanup: Option<PathBuf>,
}

impl RepoContext {
    pub fn is_clone(&self) -> bool {
        self.cleanup.is_some()
    }
}

impl Drop for RepoContext {
    fn drop(&mut self) {
        if let Some(dir) = self.cleanup.take() {
            if let Err(err) = fs::remove_dir_all(&dir) {
                warn!(path = %dir.display(), error = %err, "failed to remove clone directory");
            }
        }
    }
}

/// Resolve the traversal root: use `path` in place, or clone `repo_url` into
/// `<download_dir>/repo_temp`.
pub fn fetch_repository(
    path: Option<&Path>,
    repo_url: Option<&str>,
    branch: &str,
    download_dir: &Path,
) -> Result<RepoContext> {
    if let Some(path) = path {
        let root_path = path
            .canonicalize()
            .with_context(|| format!("Path does not exist: {}", path.display()))?;
        if !root_path.is_dir() {
            anyhow::bail!("Path is not a directory: {}", root_path.display());
        }
        let repo_name =
            root_path.file_name().and_then(|n| n.to_str()).unwrap_or("repository").to_string();
        return Ok(RepoContext { root_path, repo_name, cleanup: None });
    }

    let Some(url) = repo_url else {
        anyhow::bail!("Either --path or --repo must be specified");
    };

    fs::create_dir_all(download_dir)
        .with_context(|| format!("Failed to create download folder {}", download_dir.display()))?;
    let dest = download_dir.join(CLONE_DIR_NAME);
    if dest.exists() {
        fs::remove_dir_all(&dest)
            .with_context(|| format!("Failed to clear stale clone at {}", dest.display()))?;
    }

    // Guard first so a failed clone still cleans up after itself.
    let ctx = RepoContext {
        root_path: dest.clone(),
        repo_name: parse_repo_name(url),
        cleanup: Some(dest.clone()),
    };
    clone_repository(url, &dest, branch)?;
    Ok(ctx)
}

/// Clone only `branch` of `url` into `dest`.
pub fn clone_repository(url: &str, dest: &Path, branch: &str) -> Result<()> {
    info!(url, branch, dest = %dest.display(), "cloning repository");

    let tracked = branch.to_string();
    let mut builder = RepoBuilder::new();
    builder.branch(branch);
    builder.remote_create(move |repo, name, remote_url| {
        let refspec = format!("+refs/heads/{tracked}:refs/remotes/{name}/{tracked}");
        repo.remote_with_fetch(name, remote_url, &refspec)
    });

    builder.clone(url, dest).with_context(|| {
        format!(
            "Failed to clone branch '{branch}' from repository '{url}'. \
             The branch might not exist, or there was a problem accessing the repo."
        )
    })?;
    Ok(())
}

/// Derive a repository name from its URL (`https://host/user/name.git` -> `name`).
pub fn parse_repo_name(repo_url: &str) -> String {
    let without_query = repo_url.split(['?', '#']).next().unwrap_or_default();
    // Only the URL path counts, never the host.
    let url_path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or_default(),
        None => without_query,
    };
    let last = url_path.trim_end_matches('/').rsplit(['/', ':']).next().unwrap_or_default();
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

/// Delete `root/<folder>` for each configured folder before traversal.
///
/// Only meant for freshly cloned trees. Failures are logged and ignored.
pub fn remove_unwanted_folders(root: &Path, folders: &[String]) {
    for folder in folders {
        let relative = folder.trim().trim_matches('/');
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            continue;
        }
        let folder_path = root.join(relative);
        if folder_path.is_dir() {
            info!(path = %folder_path.display(), "removing folder");
            if let Err(err) = fs::remove_dir_all(&folder_path) {
                warn!(path = %folder_path.display(), error = %err, "failed to remove folder");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fetch_repository, parse_repo_name, remove_unwanted_folders};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn repo_name_comes_from_last_url_segment() {
        assert_eq!(parse_repo_name("https://github.com/user/repo_name.git"), "repo_name");
        assert_eq!(parse_repo_name("https://github.com/user/tool/"), "tool");
        assert_eq!(parse_repo_name("git@github.com:user/dotfiles.git"), "dotfiles");
        assert_eq!(parse_repo_name("https://host/org/proj?tab=readme"), "proj");
        assert_eq!(parse_repo_name("https://github.com/"), "repository");
        assert_eq!(parse_repo_name(""), "repository");
    }

    #[test]
    fn removes_only_listed_folders_inside_root() {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().join("clone");
        fs::create_dir_all(root.join("node_modules/pkg")).expect("mkdir");
        fs::create_dir_all(root.join("docs/api")).expect("mkdir");
        fs::create_dir_all(root.join("src")).expect("mkdir");
        fs::create_dir_all(temp.path().join("outside")).expect("mkdir");

        let folders = vec![
            "node_modules".to_string(),
            "docs/api".to_string(),
            "../outside".to_string(),
            "missing".to_string(),
        ];
        remove_unwanted_folders(&root, &folders);

        assert!(!root.join("node_modules").exists());
        assert!(!root.join("docs/api").exists());
        assert!(root.join("docs").exists());
        assert!(root.join("src").exists());
        assert!(temp.path().join("outside").exists());
    }

    #[test]
    fn local_path_is_used_in_place() {
        let temp = TempDir::new().expect("temp dir");
        let repo = temp.path().join("my-project");
        fs::create_dir_all(&repo).expect("mkdir");

        let ctx = fetch_repository(Some(&repo), None, "main", temp.path()).expect("fetch");
        assert_eq!(ctx.repo_name, "my-project");
        assert!(!ctx.is_clone());
        drop(ctx);
        assert!(repo.exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let err = fetch_repository(None, None, "main", temp.path()).expect_err("no source");
        assert!(err.to_string().contains("Either --path or --repo"));
    }
}

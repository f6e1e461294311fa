//! CLI argument merging with config

use crate::domain::Config;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub path: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub output: Option<PathBuf>,
    /// Appended to the configured skip folders rather than replacing them
    pub extra_skip_folders: Vec<String>,
    pub include_extensions: Option<BTreeSet<String>>,
    pub max_file_bytes: Option<u64>,
    pub follow_symlinks: Option<bool>,
    pub parallel: Option<bool>,
    pub download_folder: Option<PathBuf>,
}

pub fn merge_cli_with_config(mut base_config: Config, cli: CliOverrides) -> Config {
    if let Some(path) = cli.path {
        base_config.path = Some(path);
        base_config.repo_url = None;
    }
    if let Some(repo_url) = cli.repo_url {
        base_config.repo_url = Some(repo_url);
        base_config.path = None;
    }
    if let Some(branch) = cli.branch {
        base_config.branch = Some(branch);
    }
    if let Some(output) = cli.output {
        base_config.output = Some(output);
    }

    for folder in cli.extra_skip_folders {
        if !base_config.skip_folders.contains(&folder) {
            base_config.skip_folders.push(folder);
        }
    }
    if let Some(include_extensions) = cli.include_extensions {
        base_config.extensions = Some(include_extensions);
    }

    if let Some(max_file_bytes) = cli.max_file_bytes {
        base_config.max_file_bytes = max_file_bytes;
    }
    if let Some(follow_symlinks) = cli.follow_symlinks {
        base_config.follow_symlinks = follow_symlinks;
    }
    if let Some(parallel) = cli.parallel {
        base_config.parallel = parallel;
    }
    if let Some(download_folder) = cli.download_folder {
        base_config.download_folder = download_folder;
    }

    base_config
}

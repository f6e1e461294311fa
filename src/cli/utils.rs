//! Shared CLI helpers

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::{normalize_extension, Config, RunStatistics};
use crate::fetch::{fetch_repository, remove_unwanted_folders, RepoContext};
use crate::utils::{format_with_commas, normalize_path};

/// Where the tree comes from and how it is filtered.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Local directory path to flatten
    #[arg(short, long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Git repository URL to clone and flatten
    #[arg(short = 'r', long, value_name = "URL")]
    pub repo: Option<String>,

    /// Branch to clone when using --repo (overrides default_branch)
    #[arg(short = 'b', long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Path to config file (JSON, TOML or YAML; default: ./config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Additional folders to exclude, added to skip_folders (repeatable or comma-separated)
    #[arg(short = 'e', long, value_name = "FOLDERS", value_delimiter = ',', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Include only these extensions (comma-separated, e.g., '.py,.ts')
    #[arg(short = 'i', long, value_name = "EXTS")]
    pub include_ext: Option<String>,

    /// Skip files larger than this (bytes)
    #[arg(long, value_name = "BYTES")]
    pub max_file_bytes: Option<u64>,

    /// Follow symbolic links when traversing
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Read and decode files on a thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Folder for clones and the output artifact (default: ./repos)
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Load the config file and layer these arguments on top.
    pub fn merged_config(&self, output: Option<PathBuf>) -> Result<Config> {
        if self.path.is_some() && self.repo.is_some() {
            anyhow::bail!("Cannot specify both --path and --repo");
        }

        let file_config = load_config(self.config.as_deref());
        let include_extensions = parse_csv(&self.include_ext)
            .map(|v| v.iter().filter_map(|ext| normalize_extension(ext)).collect());

        let overrides = CliOverrides {
            path: self.path.clone(),
            repo_url: self.repo.clone(),
            branch: self.branch.clone(),
            output,
            extra_skip_folders: self.exclude.clone(),
            include_extensions,
            max_file_bytes: self.max_file_bytes,
            follow_symlinks: if self.follow_symlinks { Some(true) } else { None },
            parallel: if self.parallel { Some(true) } else { None },
            download_folder: self.download_dir.clone(),
        };
        let merged = merge_cli_with_config(file_config, overrides);

        if merged.path.is_none() && merged.repo_url.is_none() {
            anyhow::bail!("Either --path or --repo must be specified");
        }
        Ok(merged)
    }
}

/// Fetch the tree described by `config`, pruning skip folders from clones.
pub fn acquire_tree(config: &Config) -> Result<RepoContext> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(spinner_style);
    }
    if let Some(url) = config.repo_url.as_deref() {
        spinner.set_message(format!("Cloning {url} ({})", config.effective_branch()));
        spinner.enable_steady_tick(Duration::from_millis(120));
    }

    let result = fetch_repository(
        config.path.as_deref(),
        config.repo_url.as_deref(),
        config.effective_branch(),
        &config.download_folder,
    );
    spinner.finish_and_clear();

    let repo_ctx = result?;
    if repo_ctx.is_clone() {
        remove_unwanted_folders(&repo_ctx.root_path, &config.skip_folders);
    }
    Ok(repo_ctx)
}

/// Keep the artifact out of its own input when the download folder sits
/// inside the traversal root.
pub fn exclude_download_dir(config: &mut Config, root: &Path) -> Result<()> {
    fs::create_dir_all(&config.download_folder).with_context(|| {
        format!("Failed to create download folder {}", config.download_folder.display())
    })?;
    skip_download_dir(config, root)
}

/// Like [`exclude_download_dir`], but leaves a missing download folder alone.
pub fn skip_download_dir(config: &mut Config, root: &Path) -> Result<()> {
    if !config.download_folder.is_dir() {
        return Ok(());
    }
    let download_dir = config.download_folder.canonicalize()?;
    if let Ok(relative) = download_dir.strip_prefix(root) {
        let relative = normalize_path(relative);
        if !relative.is_empty() {
            // Leading slash anchors the entry at the root.
            config.skip_folders.push(format!("/{relative}"));
        }
    }
    Ok(())
}

/// Parse a comma-separated option into trimmed, non-empty values.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|raw| {
        raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
    })
}

pub fn print_statistics(root: &Path, stats: &RunStatistics, elapsed: Duration) {
    println!("{}", style("Statistics:").bold());
    println!("  Repository:      {}", root.display());
    println!("  Files visited:   {}", format_with_commas(stats.total_files as u64));
    println!("  Files included:  {}", format_with_commas(stats.included_files as u64));

    // Per-category skip breakdown
    if stats.skipped_total() > 0 {
        println!("  Files skipped:");
        if stats.skipped_by_extension > 0 {
            println!("    extension:   {}", stats.skipped_by_extension);
        }
        if stats.skipped_by_folder > 0 {
            println!("    folder:      {}", stats.skipped_by_folder);
        }
        if stats.skipped_by_name > 0 {
            println!("    name:        {}", stats.skipped_by_name);
        }
        if stats.skipped_by_size > 0 {
            println!("    size limit:  {}", stats.skipped_by_size);
        }
        if stats.skipped_binary > 0 {
            println!("    binary:      {}", stats.skipped_binary);
        }
    }

    println!("  Total size:      {} bytes", format_with_commas(stats.total_size));
    if stats.cancelled {
        println!("  {}", style("Run was cancelled before the tree was exhausted").yellow());
    }
    println!("  Processing time: {:.2}s", elapsed.as_secs_f64());
}

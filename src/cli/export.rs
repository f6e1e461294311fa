//! Export command implementation

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::utils::{acquire_tree, exclude_download_dir, print_statistics, SourceArgs};
use crate::domain::{Config, RunStatistics};
use crate::engine::Flattener;

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file name, placed in the download folder (default: <repo-name>.txt)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write run statistics as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let start_time = Instant::now();

    let mut merged = args.source.merged_config(args.output.clone())?;
    let repo_ctx = acquire_tree(&merged)?;
    let root_path = repo_ctx.root_path.clone();
    exclude_download_dir(&mut merged, &root_path)?;

    let output_path =
        resolve_output_path(&merged.download_folder, merged.output.as_deref(), &repo_ctx.repo_name);

    let stats = Flattener::new(merged.filter_config())
        .follow_symlinks(merged.follow_symlinks)
        .parallel(merged.parallel)
        .flatten_to_path(&root_path, &output_path)
        .with_context(|| format!("Failed to flatten {}", root_path.display()))?;

    if let Some(report_path) = args.report.as_deref() {
        write_report(report_path, &root_path, &output_path, &merged, &stats)?;
    }

    // --- Print export summary ---
    println!();
    println!("{}", style("Flatten complete!").green().bold());
    println!();
    print_statistics(&root_path, &stats, start_time.elapsed());

    println!();
    println!("Output files:");
    println!("  {}", output_path.display());
    if let Some(report_path) = args.report.as_deref() {
        println!("  {}", report_path.display());
    }

    Ok(())
}

/// `<download_dir>/<base name of --output>` or `<download_dir>/<repo_name>.txt`.
fn resolve_output_path(download_dir: &Path, output: Option<&Path>, repo_name: &str) -> PathBuf {
    match output.and_then(Path::file_name) {
        Some(name) => download_dir.join(name),
        None => download_dir.join(format!("{repo_name}.txt")),
    }
}

fn write_report(
    report_path: &Path,
    root_path: &Path,
    output_path: &Path,
    config: &Config,
    stats: &RunStatistics,
) -> Result<()> {
    let extensions = config.extensions.as_ref().filter(|exts| !exts.is_empty());
    let report = json!({
        "repository":  root_path.display().to_string(),
        "output_file": output_path.display().to_string(),
        "config": {
            "repo":            config.repo_url,
            "branch":          config.repo_url.as_ref().map(|_| config.effective_branch()),
            "extensions":      extensions,
            "skip_folders":    config.skip_folders,
            "skip_files":      config.skip_files,
            "max_file_bytes":  config.max_file_bytes,
            "follow_symlinks": config.follow_symlinks,
            "parallel":        config.parallel,
        },
        "stats": stats.to_report_value(),
    });

    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    Ok(())
}

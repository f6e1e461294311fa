//! Info command: a dry run that only reports statistics

use anyhow::{Context, Result};
use clap::Args;
use std::io;
use std::time::Instant;

use super::utils::{acquire_tree, print_statistics, skip_download_dir, SourceArgs};
use crate::engine::Flattener;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print statistics as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let start_time = Instant::now();

    let mut merged = args.source.merged_config(None)?;
    let repo_ctx = acquire_tree(&merged)?;
    // Count earlier artifacts the same way export does.
    skip_download_dir(&mut merged, &repo_ctx.root_path)?;

    let stats = Flattener::new(merged.filter_config())
        .follow_symlinks(merged.follow_symlinks)
        .parallel(merged.parallel)
        .flatten_into(&repo_ctx.root_path, io::sink())
        .with_context(|| format!("Failed to scan {}", repo_ctx.root_path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats.to_report_value())?);
    } else {
        print_statistics(&repo_ctx.root_path, &stats, start_time.elapsed());
    }
    Ok(())
}

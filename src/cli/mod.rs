//! Command-line interface for repo-flatten
//!
//! Provides `export`, `info`, and `completions` subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod export;
mod info;
mod utils;

/// Fetch a repository and flatten its working tree into a single text file
#[derive(Parser)]
#[command(name = "repo-flatten")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a repository into a single text artifact
    Export(Box<export::ExportArgs>),

    /// Show what a flatten would include without writing anything
    Info(info::InfoArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// RUST_LOG wins when it parses; otherwise `--verbose` picks DEBUG over WARN.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "warn" };
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(cli.verbose, directives.as_deref());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Export(args) => export::run(*args),
        Commands::Info(args) => info::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "repo-flatten",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::log_filter;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn rust_log_overrides_default_level() {
        let filter = log_filter(false, Some("debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn verbose_flag_applies_without_rust_log() {
        assert_eq!(log_filter(true, None).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(false, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(false, Some("  ")).max_level_hint(), Some(LevelFilter::WARN));
    }
}

//! Configuration loading and CLI merging

mod loader;
mod merge;

pub use loader::{load_config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use merge::{merge_cli_with_config, CliOverrides};

//! repo-flatten: fetch a repository and flatten it into a single text file
//!
//! Clones (or reads) a repository, filters its files by folder, name,
//! extension and size, and concatenates the rest into one framed artifact.

use anyhow::Result;

mod cli;
mod config;
mod domain;
mod engine;
mod error;
mod fetch;
mod utils;

fn main() -> Result<()> {
    cli::run()
}

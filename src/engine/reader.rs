//! Best-effort content reader
//!
//! Reads a file and decodes it as strict UTF-8. Failures come back as a
//! [`DecodeFailure`] so a single bad file never stops the run.

use std::fs;
use std::io;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

/// Why a file that passed the filters could not be turned into text.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    /// Permission denied, vanished between listing and read, dangling link, ...
    #[error("read failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("invalid UTF-8 after {valid_up_to} bytes")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Read `path` and decode its bytes as UTF-8 without replacement.
pub fn read_text(path: &Path) -> Result<String, DecodeFailure> {
    let bytes = fs::read(path)?;
    decode_utf8(&bytes)
}

// A BOM is content too; it is kept as-is.
fn decode_utf8(bytes: &[u8]) -> Result<String, DecodeFailure> {
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Ok(text.into_owned()),
        None => Err(DecodeFailure::InvalidUtf8 { valid_up_to: Encoding::utf8_valid_up_to(bytes) }),
    }
}

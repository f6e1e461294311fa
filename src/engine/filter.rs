//! Ordered filter pipeline
//!
//! Checks run in a fixed order and the first match decides the verdict, so a
//! file matching several rules is always credited to the same counter.

use crate::domain::{CandidateFile, FilterConfig, SkipReason, Verdict};

type Check = fn(&CandidateFile, &FilterConfig) -> Option<SkipReason>;

/// Precedence order: size, folder, name, extension.
const CHECKS: [Check; 4] = [check_size, check_folder, check_name, check_extension];

/// Decide whether `file` proceeds to the content reader.
pub fn evaluate(file: &CandidateFile, config: &FilterConfig) -> Verdict {
    CHECKS
        .iter()
        .find_map(|check| check(file, config))
        .map(Verdict::Excluded)
        .unwrap_or(Verdict::Included)
}

fn check_size(file: &CandidateFile, config: &FilterConfig) -> Option<SkipReason> {
    (file.size_bytes > config.max_file_size_bytes()).then_some(SkipReason::TooLarge)
}

fn check_folder(file: &CandidateFile, config: &FilterConfig) -> Option<SkipReason> {
    if file.parent_segments().any(|segment| config.is_folder_excluded(segment)) {
        return Some(SkipReason::FolderExcluded);
    }
    config
        .excluded_folder_prefixes()
        .iter()
        .any(|prefix| file.relative_path.starts_with(prefix.as_str()))
        .then_some(SkipReason::FolderExcluded)
}

fn check_name(file: &CandidateFile, config: &FilterConfig) -> Option<SkipReason> {
    config.is_file_name_excluded(file.file_name()).then_some(SkipReason::NameExcluded)
}

fn check_extension(file: &CandidateFile, config: &FilterConfig) -> Option<SkipReason> {
    if config.allows_all_extensions() {
        return None;
    }
    // Extensionless files (Makefile, Dockerfile) always pass.
    let extension = file.extension()?;
    (!config.is_extension_allowed(extension)).then_some(SkipReason::ExtensionExcluded)
}

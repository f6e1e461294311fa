//! Core domain types and models
//!
//! Defines the filter configuration, per-file candidates and verdicts, the
//! run statistics accumulated while flattening, and the collaborator-facing
//! `Config` loaded from disk.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// Immutable filter rules, built once before traversal.
///
/// Folder and file names are matched case-sensitively; allowed extensions are
/// lower-cased here and compared case-insensitively.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    allowed_extensions: HashSet<String>,
    excluded_folder_names: HashSet<String>,
    excluded_folder_prefixes: Vec<String>,
    excluded_file_names: HashSet<String>,
    max_file_size_bytes: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: HashSet::new(),
            excluded_folder_names: HashSet::new(),
            excluded_folder_prefixes: Vec::new(),
            excluded_file_names: HashSet::new(),
            max_file_size_bytes: default_max_file_bytes(),
        }
    }
}

impl FilterConfig {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self { max_file_size_bytes, ..Self::default() }
    }

    /// Restrict inclusion to these extensions. `None` or an empty set allows all.
    pub fn allowed_extensions<I, S>(mut self, extensions: Option<I>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .flatten()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Bare names exclude any directory segment with that name. Entries that
    /// start with or contain `/` exclude a root-relative directory prefix.
    pub fn excluded_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for folder in folders {
            let raw = folder.as_ref().trim();
            let trimmed = raw.trim_matches('/');
            if trimmed.is_empty() {
                continue;
            }
            if raw.starts_with('/') || trimmed.contains('/') {
                self.excluded_folder_prefixes.push(format!("{trimmed}/"));
            } else {
                self.excluded_folder_names.insert(trimmed.to_string());
            }
        }
        self
    }

    pub fn excluded_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_file_names = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        self
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    pub fn allows_all_extensions(&self) -> bool {
        self.allowed_extensions.is_empty()
    }

    pub fn is_extension_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(&extension.to_lowercase())
    }

    pub fn is_folder_excluded(&self, segment: &str) -> bool {
        self.excluded_folder_names.contains(segment)
    }

    pub fn excluded_folder_prefixes(&self) -> &[String] {
        &self.excluded_folder_prefixes
    }

    pub fn is_file_name_excluded(&self, name: &str) -> bool {
        self.excluded_file_names.contains(name)
    }
}

/// Lower-case and dot-prefix an extension; blank input yields `None`.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{lower}"))
    }
}

/// A leaf entry produced by one traversal step.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Absolute (or root-joined) path used for reading
    pub path: PathBuf,

    /// Path relative to the traversal root, always with forward slashes
    pub relative_path: String,

    /// File size in bytes
    pub size_bytes: u64,
}

impl CandidateFile {
    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.relative_path.rsplit('/').next().unwrap_or(&self.relative_path)
    }

    /// Directory segments between the root and the file.
    pub fn parent_segments(&self) -> impl Iterator<Item = &str> {
        let mut segments: Vec<&str> = self.relative_path.split('/').collect();
        segments.pop();
        segments.into_iter().filter(|s| !s.is_empty())
    }

    /// Dotted suffix of the file name (`.gz` for `a.tar.gz`). A name that
    /// only starts with a dot, or ends with one, has no extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        let idx = name.rfind('.')?;
        if idx == 0 || idx == name.len() - 1 {
            return None;
        }
        Some(&name[idx..])
    }
}

/// Reason a visited file was left out of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    TooLarge,
    FolderExcluded,
    NameExcluded,
    ExtensionExcluded,
    UndecodableContent,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::TooLarge => "size",
            SkipReason::FolderExcluded => "folder",
            SkipReason::NameExcluded => "name",
            SkipReason::ExtensionExcluded => "extension",
            SkipReason::UndecodableContent => "binary",
        }
    }
}

/// Per-file inclusion decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Included,
    Excluded(SkipReason),
}

impl Verdict {
    pub fn is_included(&self) -> bool {
        matches!(self, Verdict::Included)
    }
}

/// Counters accumulated over one flattening run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Every visited leaf, whatever its verdict
    pub total_files: usize,

    /// Files written to the artifact
    pub included_files: usize,

    /// UTF-8 byte length of all included content
    pub total_size: u64,

    pub skipped_by_size: usize,
    pub skipped_by_folder: usize,
    pub skipped_by_name: usize,
    pub skipped_by_extension: usize,

    /// Files whose bytes could not be read or decoded as UTF-8
    pub skipped_binary: usize,

    /// Set when a cancel token stopped enumeration early
    pub cancelled: bool,
}

impl RunStatistics {
    /// Count one visited leaf with its terminal verdict.
    ///
    /// Included files must also report their size via [`record_included`].
    ///
    /// [`record_included`]: RunStatistics::record_included
    pub fn record(&mut self, verdict: &Verdict) {
        self.total_files += 1;
        match verdict {
            Verdict::Included => {}
            Verdict::Excluded(reason) => *self.counter_mut(*reason) += 1,
        }
    }

    pub fn record_included(&mut self, content_bytes: usize) {
        self.included_files += 1;
        self.total_size += content_bytes as u64;
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::TooLarge => self.skipped_by_size,
            SkipReason::FolderExcluded => self.skipped_by_folder,
            SkipReason::NameExcluded => self.skipped_by_name,
            SkipReason::ExtensionExcluded => self.skipped_by_extension,
            SkipReason::UndecodableContent => self.skipped_binary,
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped_by_size
            + self.skipped_by_folder
            + self.skipped_by_name
            + self.skipped_by_extension
            + self.skipped_binary
    }

    /// `total_files == included_files + all skip counters`.
    pub fn is_partitioned(&self) -> bool {
        self.total_files == self.included_files + self.skipped_total()
    }

    fn counter_mut(&mut self, reason: SkipReason) -> &mut usize {
        match reason {
            SkipReason::TooLarge => &mut self.skipped_by_size,
            SkipReason::FolderExcluded => &mut self.skipped_by_folder,
            SkipReason::NameExcluded => &mut self.skipped_by_name,
            SkipReason::ExtensionExcluded => &mut self.skipped_by_extension,
            SkipReason::UndecodableContent => &mut self.skipped_binary,
        }
    }

    /// JSON report with per-reason skip counts nested under `files_skipped`.
    pub fn to_report_value(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "total_files":    self.total_files,
            "included_files": self.included_files,
            "total_size":     self.total_size,
            "files_skipped": {
                "binary":    self.skipped_binary,
                "extension": self.skipped_by_extension,
                "folder":    self.skipped_by_folder,
                "name":      self.skipped_by_name,
                "size":      self.skipped_by_size,
            },
        });

        // Only present on interrupted runs.
        if self.cancelled {
            value["cancelled"] = serde_json::json!(true);
        }

        value
    }
}

/// Custom deserializer for extensions: normalizes to lower-case, dot-prefixed
/// entries.
///
/// - Accepts a comma-separated string or an array
/// - `null` means "allow every extension"
fn deserialize_extensions<'de, D>(deserializer: D) -> Result<Option<BTreeSet<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ExtensionsVisitor;

    impl<'de> Visitor<'de> for ExtensionsVisitor {
        type Value = Option<BTreeSet<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("null, a string, or an array of extensions")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D2>(self, deserializer: D2) -> Result<Self::Value, D2::Error>
        where
            D2: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(ExtensionsVisitor)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.split(',').filter_map(normalize_extension).collect()))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut result = BTreeSet::new();
            while let Some(ext) = seq.next_element::<String>()? {
                if let Some(normalized) = normalize_extension(&ext) {
                    result.insert(normalized);
                }
            }
            Ok(Some(result))
        }
    }

    deserializer.deserialize_any(ExtensionsVisitor)
}

/// Main configuration for repo-flatten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Input source
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default, alias = "repo")]
    pub repo_url: Option<String>,

    /// Branch requested on the command line; falls back to `default_branch`
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    // Filtering options
    #[serde(default = "default_extensions", deserialize_with = "deserialize_extensions")]
    pub extensions: Option<BTreeSet<String>>,

    #[serde(default = "default_skip_folders")]
    pub skip_folders: Vec<String>,

    #[serde(default = "default_skip_files")]
    pub skip_files: BTreeSet<String>,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    #[serde(default)]
    pub follow_symlinks: bool,

    #[serde(default)]
    pub parallel: bool,

    // Output options
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,

    /// Artifact file name; only its base name is used
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            repo_url: None,
            branch: None,
            default_branch: default_branch(),
            extensions: default_extensions(),
            skip_folders: default_skip_folders(),
            skip_files: default_skip_files(),
            max_file_bytes: default_max_file_bytes(),
            follow_symlinks: false,
            parallel: false,
            download_folder: default_download_folder(),
            output: None,
        }
    }
}

impl Config {
    /// Branch to clone: the explicit one, else the configured default.
    pub fn effective_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(&self.default_branch)
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::new(self.max_file_bytes)
            .allowed_extensions(self.extensions.as_ref())
            .excluded_folders(&self.skip_folders)
            .excluded_files(&self.skip_files)
    }
}

// Default value functions for serde
fn default_branch() -> String {
    "main".to_string()
}

fn default_max_file_bytes() -> u64 {
    1_048_576 // 1 MB
}

fn default_download_folder() -> PathBuf {
    PathBuf::from("repos")
}

pub fn default_extensions() -> Option<BTreeSet<String>> {
    Some(
        [
            ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".c", ".cpp", ".cs", ".rb", ".go",
            ".php", ".html", ".css", ".scss", ".json", ".md", ".yml", ".yaml",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    )
}

pub fn default_skip_folders() -> Vec<String> {
    [".git", ".github", "node_modules", "dist", "build", "__pycache__", ".venv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_skip_files() -> BTreeSet<String> {
    ["LICENSE", "LICENSE.txt", "LICENSE.md", "LICENSE.rst", "COPYING", "COPYING.txt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

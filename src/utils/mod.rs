//! Utility functions

use std::path::{Component, Path};

/// Join path components with `/` regardless of the host separator.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a number with thousands separators (e.g. 1048576 → "1,048,576").
pub fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{format_with_commas, normalize_path};
    use std::path::PathBuf;

    #[test]
    fn commas_group_by_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_048_576), "1,048,576");
    }

    #[test]
    fn paths_use_forward_slashes() {
        let path: PathBuf = ["src", "engine", "mod.rs"].iter().collect();
        assert_eq!(normalize_path(&path), "src/engine/mod.rs");
    }
}

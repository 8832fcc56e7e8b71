/// Split a slash path (`repo/data_loaders/load.py`) into tree path segments.
///
/// Backslashes are treated as separators and empty segments are dropped.
pub fn parse_tree_path(s: &str) -> Vec<String> {
    normalize_path_separator(s)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

// Helper function for cross-platform path comparison
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}

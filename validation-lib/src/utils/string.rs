/// Split a comma-separated list and trim every entry.
///
/// Entries are kept even when they trim down to nothing, so `"Name,,Email"`
/// yields three entries and the blank one surfaces later as a missing column.
pub fn split_column_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim().to_string())
        .collect()
}

/// `Some(value)` unless the value is absent or the empty string.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

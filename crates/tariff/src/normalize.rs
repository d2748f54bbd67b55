/// Canonical form for every destination comparison in the workspace:
/// trimmed, internal whitespace collapsed to one space, uppercased.
///
/// Price lookup, transit matching, live area filtering and batch
/// reconciliation all go through this one function.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Normalize an optional subregion; blank input counts as absent.
pub fn normalize_opt(text: Option<&str>) -> Option<String> {
    text.map(normalize).filter(|s| !s.is_empty())
}

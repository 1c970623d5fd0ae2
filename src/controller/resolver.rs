//! Target resolution from an explicit name or the controller's type name.

/// Decide which target class backs a controller.
///
/// A non-empty `explicit` name wins. Otherwise the last path segment of
/// `caller_type_name` (split on `::` or `\`) must end with `suffix`, and the
/// remainder is the class name. An empty remainder or an empty suffix
/// resolves to nothing.
pub fn resolve_target_class(
    explicit: Option<&str>,
    caller_type_name: &str,
    suffix: &str,
) -> Option<String> {
    if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
        return Some(name.to_string());
    }
    infer_from_type_name(caller_type_name, suffix)
}

/// The suffix-stripping half of [`resolve_target_class`].
pub fn infer_from_type_name(caller_type_name: &str, suffix: &str) -> Option<String> {
    if suffix.is_empty() {
        return None;
    }
    let segment = last_segment(caller_type_name);
    let remainder = segment.strip_suffix(suffix)?;
    if remainder.is_empty() {
        None
    } else {
        Some(remainder.to_string())
    }
}

fn last_segment(type_name: &str) -> &str {
    // Generic arguments would otherwise contribute their own `::` segments.
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit(|c: char| c == ':' || c == '\\')
        .next()
        .unwrap_or(base)
}

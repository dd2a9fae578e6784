//! Token estimation

/// Estimate tokens using a simple heuristic (chars / 4).
///
/// Counts Unicode code points, not bytes. Using byte length over-counts for
/// multi-byte UTF-8 content (e.g. CJK text, emoji).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() / 4) as u64
}

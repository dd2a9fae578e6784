//! Deterministic ordering of listing paths.

use std::cmp::Ordering;

/// Segment-wise path comparison used to order a listing before the tree is built.
///
/// At the first differing segment, a file name that ends its path sorts after
/// a segment that continues deeper (sub-directories before files on the same
/// level); otherwise the two segments compare byte-wise. Equal prefixes put the
/// shorter path first.
///
/// Only the final segment of a leaf counts as terminating, so an explicit
/// directory entry orders like the paths it contains and the comparison stays
/// a total order.
pub fn compare_segments<S: AsRef<str>>(a: &[S], a_is_leaf: bool, b: &[S], b_is_leaf: bool) -> Ordering {
    for (i, (left, right)) in a.iter().zip(b.iter()).enumerate() {
        let left = (a_is_leaf && i + 1 == a.len(), left.as_ref());
        let right = (b_is_leaf && i + 1 == b.len(), right.as_ref());
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Split a listing path into its non-empty segments.
pub fn split_segments(path: &str) -> Vec<String> {
    path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

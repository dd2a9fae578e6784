//! Text decoding for file and blob contents.
//!
//! Content arrives as raw bytes from either the filesystem or a git object
//! store, so everything here works on byte slices:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - UTF-8 fast path with strict validation
//! - Fallback encoding detection using chardetng
//! - Binary detection

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

pub const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Detect if a byte buffer is binary (not text).
///
/// Uses two heuristics on the first `sample_size` bytes:
/// 1. Null byte check (strong binary indicator)
/// 2. Ratio of printable ASCII bytes (< 70% = likely binary)
///
/// A valid UTF-8 sample is always treated as text so non-Latin sources pass.
pub fn looks_binary(bytes: &[u8], sample_size: usize) -> bool {
    let sample = &bytes[..bytes.len().min(sample_size)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        // Multi-byte sequence cut at the sample boundary.
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let printable_count = sample
        .iter()
        .filter(|&&b| {
            (32..=126).contains(&b) || b == 9 || b == 10 || b == 13 // printable + tab, LF, CR
        })
        .count();

    (printable_count as f64 / sample.len() as f64) < 0.70
}

/// Detect the encoding of a byte buffer.
///
/// Strategy:
/// 1. Check for BOM markers first (most reliable)
/// 2. Try strict UTF-8 decoding (fast path for most modern files)
/// 3. Fall back to chardetng for non-UTF-8 content
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

/// Decode bytes to text, replacing invalid sequences.
///
/// Returns the content and the lower-cased name of the encoding used.
pub fn decode_text(bytes: &[u8]) -> (String, String) {
    let encoding = detect_encoding(bytes);
    let (decoded, used, _had_errors) = encoding.decode(bytes);
    (decoded.into_owned(), used.name().to_lowercase())
}

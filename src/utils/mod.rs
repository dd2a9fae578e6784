//! Shared helpers: decoding, token estimation, path handling.

pub mod encoding;
pub mod paths;
pub mod tokens;

pub use encoding::{decode_text, looks_binary, DEFAULT_SAMPLE_SIZE};
pub use paths::{normalize_path, relative_slash_path};
pub use tokens::estimate_tokens;

/// Format an integer with thousands separators (`1234567` → `"1,234,567"`).
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_with_commas;

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}

//! Entropy analysis for secret detection
//!
//! Shannon entropy scoring plus the false-positive shape filters applied by
//! the generic (pattern-less) high-entropy sweep.

use regex::Regex;
use std::sync::LazyLock;

/// Candidate tokenizer for the generic sweep. Minimum length 20 keeps short
/// identifiers and operators out of the scoring path.
static CANDIDATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9+/=_-]{20,}").expect("Failed to compile entropy candidate regex")
});

/// Shannon entropy of a string's byte-frequency distribution.
///
/// H = -sum(p_i * log2(p_i)). Single pass over the bytes, deterministic,
/// and a pure function of the input: `shannon_entropy("aaaa") == 0.0`.
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut histogram = [0usize; 256];
    for byte in s.bytes() {
        histogram[byte as usize] += 1;
    }

    let len = s.len() as f64;
    let mut entropy = 0.0;
    for &count in &histogram {
        if count > 0 {
            let probability = count as f64 / len;
            entropy -= probability * probability.log2();
        }
    }

    entropy
}

/// True when a token should be reported by the generic sweep: entropy at or
/// above the threshold and no false-positive shape test fires.
pub fn is_high_entropy_secret(token: &str, threshold: f64) -> bool {
    if is_false_positive_shape(token) {
        tracing::trace!(token, "rejected by false-positive shape filter");
        return false;
    }

    let entropy = shannon_entropy(token);
    tracing::trace!(token, entropy, threshold, "entropy sweep candidate");
    entropy >= threshold
}

/// Iterate candidate tokens in a line, yielding (byte offset, token).
pub fn candidate_tokens(line: &str) -> impl Iterator<Item = (usize, &str)> {
    CANDIDATE_REGEX
        .find_iter(line)
        .map(|m| (m.start(), m.as_str()))
}

/// Combined false-positive heuristic for the generic sweep.
///
/// Named patterns are unaffected; these shapes only suppress the pattern-less
/// entropy sweep, which would otherwise drown in hashes and identifiers.
pub fn is_false_positive_shape(token: &str) -> bool {
    looks_like_hash(token)
        || looks_like_encoded_uuid(token)
        || looks_like_numeric_id(token)
        || looks_like_product_code(token)
}

/// MD5/SHA1/SHA256-shaped: pure hex at the standard digest lengths.
fn looks_like_hash(token: &str) -> bool {
    matches!(token.len(), 32 | 40 | 64) && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Base64-encoded UUID length (22 without padding, 24 with) over the base64
/// alphabet.
fn looks_like_encoded_uuid(token: &str) -> bool {
    matches!(token.len(), 22 | 24)
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=' | b'-' | b'_'))
}

/// Timestamps and numeric database IDs: long pure-decimal runs.
fn looks_like_numeric_id(token: &str) -> bool {
    token.bytes().all(|b| b.is_ascii_digit())
}

/// SKU / product-code shaped: short uppercase-alphanumeric tokens mixing
/// letters and digits. Length bound 20 covers license-plate style codes.
fn looks_like_product_code(token: &str) -> bool {
    token.len() <= 20
        && token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && token.bytes().any(|b| b.is_ascii_uppercase())
        && token.bytes().any(|b| b.is_ascii_digit())
}

use crate::pipeline::chaos::chaos_stream;
use crate::pipeline::seed::derive_seed;

/// Fingerprint length in bytes (64 hex characters).
pub const FINGERPRINT_SIZE: usize = 32;

/// Password-only verification tag: the first 32 keystream bytes of the
/// password's seed, lowercase hex. Independent of any payload.
pub fn fingerprint(password: &str) -> String {
    let bytes: Vec<u8> = chaos_stream(derive_seed(password), FINGERPRINT_SIZE).collect();
    hex::encode(bytes)
}

/// Compare two hex tags without early exit on the first differing byte.
pub fn tags_match(expected: &str, actual: &str) -> bool {
    constant_time_compare(expected.as_bytes(), actual.as_bytes())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Lower bound of a derived seed. Keeps the logistic map off its fixed point at 0.
pub const SEED_MIN: f64 = 0.0001;

/// Upper bound of a derived seed. Keeps the logistic map off its fixed point at 1.
pub const SEED_MAX: f64 = 0.9999;

const NORMALIZER: f64 = 2147483647.0;

/// Derive the chaos seed for a password.
///
/// Rolls a 32-bit hash over the UTF-16 code units of the password with
/// two's-complement wrap-around (`h = h * 31 + code`, then `h ^= h >> 16`
/// with an arithmetic shift), then normalizes `|h|` into
/// `[SEED_MIN, SEED_MAX]`.
pub fn derive_seed(password: &str) -> f64 {
    let mut h: i32 = 0;
    for code in password.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(code));
        h ^= h >> 16;
    }

    // Widen before abs so i32::MIN does not overflow
    let magnitude = f64::from(h).abs();
    (magnitude / NORMALIZER).clamp(SEED_MIN, SEED_MAX)
}

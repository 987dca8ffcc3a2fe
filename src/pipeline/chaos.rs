//! Chaotic keystream generator.
//!
//! Two one-dimensional maps run side by side from the same seed: the
//! logistic map drives `x` and the tent map drives `y`. Each output byte is
//! taken from their mean. The arithmetic below is IEEE-754 double precision
//! in a fixed operation order; reordering any step changes the stream.

/// Logistic map growth rate.
pub const LOGISTIC_R: f64 = 3.99;

/// Tent map slope.
pub const TENT_MU: f64 = 1.99;

/// Iterations discarded before the first output byte.
pub const BURN_IN: usize = 100;

/// One step of the logistic map: `r * x * (1 - x)`.
#[inline]
pub fn logistic(x: f64) -> f64 {
    LOGISTIC_R * x * (1.0 - x)
}

/// One step of the tent map.
#[inline]
pub fn tent(y: f64) -> f64 {
    if y < 0.5 {
        TENT_MU * y
    } else {
        TENT_MU * (1.0 - y)
    }
}

/// Finite, deterministic stream of entropy bytes.
///
/// Construct a fresh stream for every operation; the internal state is
/// never shared. Two streams built from the same seed yield the same bytes.
#[derive(Debug, Clone)]
pub struct ChaosStream {
    x: f64,
    y: f64,
    remaining: usize,
}

impl ChaosStream {
    /// Create a stream of `count` bytes, running the burn-in up front.
    pub fn new(seed: f64, count: usize) -> Self {
        let mut x = seed;
        let mut y = tent(seed);
        for _ in 0..BURN_IN {
            x = logistic(x);
            y = tent(y);
        }
        Self {
            x,
            y,
            remaining: count,
        }
    }

    /// Bytes still to be produced.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// XOR the next `buf.len()` keystream bytes into `buf`.
    ///
    /// Stops early if the stream runs out; returns the number of bytes
    /// touched.
    pub fn apply_xor(&mut self, buf: &mut [u8]) -> usize {
        let mut touched = 0;
        for (byte, key) in buf.iter_mut().zip(self.by_ref()) {
            *byte ^= key;
            touched += 1;
        }
        touched
    }

    #[inline]
    fn step(&mut self) -> u8 {
        self.x = logistic(self.x);
        self.y = tent(self.y);
        let level = (((self.x + self.y) / 2.0) * 256.0).floor() as i64;
        (level & 0xFF) as u8
    }
}

impl Iterator for ChaosStream {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.step())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ChaosStream {}

impl std::iter::FusedIterator for ChaosStream {}

/// Lazily generate `count` entropy bytes from `seed`.
pub fn chaos_stream(seed: f64, count: usize) -> ChaosStream {
    ChaosStream::new(seed, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::seed::{derive_seed, SEED_MIN};

    #[test]
    fn test_known_keystream() {
        let bytes: Vec<u8> = chaos_stream(derive_seed("password1"), 16).collect();
        assert_eq!(
            bytes,
            vec![214, 106, 229, 59, 139, 189, 146, 126, 147, 217, 106, 183, 138, 81, 161, 68]
        );
    }

    #[test]
    fn test_known_keystream_minimum_seed() {
        let bytes: Vec<u8> = chaos_stream(SEED_MIN, 8).collect();
        assert_eq!(bytes, vec![146, 234, 48, 117, 232, 63, 157, 186]);
    }

    #[test]
    fn test_deterministic() {
        let a: Vec<u8> = chaos_stream(0.3141, 1000).collect();
        let b: Vec<u8> = chaos_stream(0.3141, 1000).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_length() {
        assert_eq!(chaos_stream(0.42, 0).count(), 0);
        let stream = chaos_stream(0.42, 77);
        assert_eq!(stream.len(), 77);
        assert_eq!(stream.count(), 77);
    }

    #[test]
    fn test_shorter_stream_is_prefix() {
        let long: Vec<u8> = chaos_stream(0.77, 256).collect();
        let short: Vec<u8> = chaos_stream(0.77, 64).collect();
        assert_eq!(&long[..64], &short[..]);
    }

    #[test]
    fn test_apply_xor_carries_state_across_chunks() {
        let expected: Vec<u8> = chaos_stream(0.61, 100).collect();

        let mut buf = vec![0u8; 100];
        let mut stream = chaos_stream(0.61, 100);
        for chunk in buf.chunks_mut(7) {
            stream.apply_xor(chunk);
        }
        assert_eq!(buf, expected);
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_apply_xor_stops_at_end() {
        let mut buf = vec![0u8; 10];
        let mut stream = chaos_stream(0.61, 4);
        assert_eq!(stream.apply_xor(&mut buf), 4);
        assert!(buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a: Vec<u8> = chaos_stream(0.2, 32).collect();
        let b: Vec<u8> = chaos_stream(0.2000001, 32).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_maps() {
        assert_eq!(logistic(0.5), LOGISTIC_R * 0.5 * 0.5);
        assert_eq!(tent(0.25), TENT_MU * 0.25);
        assert_eq!(tent(0.75), TENT_MU * 0.25);
    }
}

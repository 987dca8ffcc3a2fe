//! Diffusion digest over (bytes, password).
//!
//! A 32-byte state seeded from the password's keystream absorbs the input
//! byte by byte, with a neighbour-add diffusion pass after every 32 bytes
//! and 16 XOR/logistic mixing rounds at the end. Every in-place update runs
//! in increasing index order and later reads see earlier writes.

use crate::pipeline::chaos::{chaos_stream, logistic};
use crate::pipeline::seed::derive_seed;

/// Digest length in bytes (64 hex characters).
pub const DIGEST_SIZE: usize = 32;

/// Mixing rounds applied by [`Digester::finalize`].
pub const FINAL_ROUNDS: usize = 16;

/// Neighbour offset used by the final mixing rounds.
const MIX_OFFSET: usize = 13;

/// `floor(logistic(b / 256) * scale)` reduced to a byte.
#[inline]
fn chaos_byte(b: u8, scale: f64) -> u8 {
    let level = (logistic(f64::from(b) / 256.0) * scale).floor() as i64;
    (level & 0xFF) as u8
}

/// Incremental digest state.
///
/// Feeding the same bytes through any sequence of [`update`](Self::update)
/// calls produces the same tag as a single call to [`digest`].
#[derive(Debug, Clone)]
pub struct Digester {
    state: [u8; DIGEST_SIZE],
    processed: usize,
}

impl Digester {
    pub fn new(password: &str) -> Self {
        let mut state = [0u8; DIGEST_SIZE];
        for (slot, byte) in state
            .iter_mut()
            .zip(chaos_stream(derive_seed(password), DIGEST_SIZE))
        {
            *slot = byte;
        }
        Self {
            state,
            processed: 0,
        }
    }

    /// Total bytes absorbed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let pos = self.processed % DIGEST_SIZE;
            let current = self.state[pos];
            self.state[pos] = current ^ byte ^ chaos_byte(current, 256.0);

            if pos == DIGEST_SIZE - 1 {
                self.diffuse();
            }
            self.processed += 1;
        }
    }

    fn diffuse(&mut self) {
        for j in 0..DIGEST_SIZE {
            let next = self.state[(j + 1) % DIGEST_SIZE];
            self.state[j] = self.state[j].wrapping_add(next);
        }
    }

    /// Run the final mixing rounds and return the raw tag.
    pub fn finalize_bytes(mut self) -> [u8; DIGEST_SIZE] {
        for _ in 0..FINAL_ROUNDS {
            for j in 0..DIGEST_SIZE {
                self.state[j] ^= self.state[(j + MIX_OFFSET) % DIGEST_SIZE];
                self.state[j] = self.state[j].wrapping_add(chaos_byte(self.state[j], 128.0));
            }
        }
        self.state
    }

    /// Run the final mixing rounds and return the lowercase hex tag.
    pub fn finalize(self) -> String {
        hex::encode(self.finalize_bytes())
    }
}

/// Digest `data` under `password`, as 64 lowercase hex characters.
pub fn digest(data: &[u8], password: &str) -> String {
    let mut digester = Digester::new(password);
    digester.update(data);
    digester.finalize()
}

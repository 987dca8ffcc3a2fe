//! Byte-level run-length codec.
//!
//! Runs of three or more identical bytes become a `[MARKER, len, value]`
//! token (len capped at 255). Shorter runs are copied literally, except that
//! a literal `MARKER` byte is always escaped as `[MARKER, 1, MARKER]`.

/// Token marker byte.
pub const MARKER: u8 = 0xFE;

/// Longest run a single token can describe.
pub const MAX_RUN: usize = 255;

/// Shortest run worth encoding as a token.
pub const MIN_RUN: usize = 3;

/// Run-length encode `data`.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let value = data[i];
        let run = data[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();

        if run >= MIN_RUN {
            output.extend_from_slice(&[MARKER, run as u8, value]);
        } else if value == MARKER {
            for _ in 0..run {
                output.extend_from_slice(&[MARKER, 1, MARKER]);
            }
        } else {
            output.extend(std::iter::repeat(value).take(run));
        }
        i += run;
    }

    output
}

/// Reverse [`compress`].
///
/// A `MARKER` with fewer than two bytes after it is copied as a literal.
/// `compress` never emits that shape, so it only shows up in foreign or
/// damaged input; it is decoded rather than rejected.
pub fn decompress(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] == MARKER && i + 2 < data.len() {
            let run = data[i + 1] as usize;
            let value = data[i + 2];
            output.extend(std::iter::repeat(value).take(run));
            i += 3;
        } else {
            output.push(data[i]);
            i += 1;
        }
    }

    output
}

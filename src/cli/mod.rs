pub mod decrypt;
pub mod encrypt;
pub mod info;
pub mod verify;

pub use decrypt::*;
pub use encrypt::*;
pub use info::*;
pub use verify::*;

use crate::container::{Phase, Progress};

/// Progress printer shared by encrypt and decrypt: one stderr line per
/// phase each time another 10% completes.
pub(crate) fn progress_printer(label: &'static str) -> impl FnMut(Progress) {
    let mut last: Option<(Phase, usize)> = None;
    move |p: Progress| {
        let percent = if p.total == 0 {
            100
        } else {
            p.processed * 100 / p.total
        };
        let bucket = percent / 10;
        if last != Some((p.phase, bucket)) {
            last = Some((p.phase, bucket));
            let phase = match p.phase {
                Phase::Cipher => "keystream",
                Phase::Digest => "digest",
            };
            eprintln!("{}: {} {}% ({}/{} bytes)", label, phase, percent, p.processed, p.total);
        }
    }
}

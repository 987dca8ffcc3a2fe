use crate::stats::{append_byte_stats, detect_period};
use anyhow::{bail, Result};
use chaosvault::{chaos_stream, derive_seed, fingerprint};

/// Longest period searched for in a sampled keystream
const MAX_PERIOD: usize = 4096;

pub struct KeystreamOptions {
    pub password: String,
    pub count: usize,
}

/// Sample the keystream for a password and report its statistics.
pub fn analyze_keystream(options: &KeystreamOptions) -> Result<String> {
    if options.count == 0 {
        bail!("Sample size must be at least one byte");
    }

    let seed = derive_seed(&options.password);
    let sample: Vec<u8> = chaos_stream(seed, options.count).collect();

    let mut output = String::new();
    output.push_str("ChaosVault Keystream Analyzer\n");
    output.push_str("=============================\n\n");
    output.push_str(&format!("Seed: {:.17}\n", seed));
    output.push_str(&format!("Fingerprint: {}\n", fingerprint(&options.password)));
    output.push_str(&format!("Bytes sampled: {}\n", sample.len()));
    match detect_period(&sample, MAX_PERIOD) {
        Some(period) => output.push_str(&format!(
            "Period: {} bytes (stream has collapsed into a cycle)\n\n",
            period
        )),
        None => output.push_str(&format!("Period: none up to {} bytes\n\n", MAX_PERIOD)),
    }
    append_byte_stats(&mut output, &sample);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_keystream_reports_seed() {
        let options = KeystreamOptions {
            password: "password1".into(),
            count: 4096,
        };
        let report = analyze_keystream(&options).unwrap();
        assert!(report.contains("ChaosVault Keystream Analyzer"));
        assert!(report.contains("Bytes sampled: 4096"));
        assert!(report.contains(&fingerprint("password1")));
    }

    #[test]
    fn test_zero_count_rejected() {
        let options = KeystreamOptions {
            password: "pw".into(),
            count: 0,
        };
        assert!(analyze_keystream(&options).is_err());
    }
}

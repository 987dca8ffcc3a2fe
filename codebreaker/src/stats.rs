use anyhow::{bail, Result};
use chaosvault::envelope::read_envelope;
use chaosvault::ContainerHeader;
use std::path::Path;

#[derive(Default)]
pub struct StatsOptions {
    pub raw: bool,
}

/// Run statistics on either a raw file or an envelope's ciphertext.
pub fn run(path: &Path, options: &StatsOptions) -> Result<String> {
    if options.raw {
        analyze_raw_file(path)
    } else {
        analyze_envelope(path)
    }
}

fn analyze_raw_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    if data.is_empty() {
        bail!("File is empty");
    }

    let mut output = String::new();
    output.push_str("Codebreaker Statistics\n");
    output.push_str("======================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str("Mode: Raw bytes\n");
    output.push_str(&format!("Bytes analyzed: {}\n\n", data.len()));
    append_byte_stats(&mut output, &data);
    Ok(output)
}

fn analyze_envelope(path: &Path) -> Result<String> {
    let envelope = read_envelope(path)?;
    if envelope.container.len() <= ContainerHeader::SIZE {
        bail!("No ciphertext in {}", path.display());
    }
    let ciphertext = &envelope.container[ContainerHeader::SIZE..];

    let mut output = String::new();
    output.push_str("ChaosVault Ciphertext Statistics\n");
    output.push_str("================================\n\n");
    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Envelope id: {}\n", envelope.header.id));
    output.push_str(&format!("Bytes analyzed: {}\n\n", ciphertext.len()));
    append_byte_stats(&mut output, ciphertext);
    Ok(output)
}

/// Append the statistics table for `data` to `output`.
pub fn append_byte_stats(output: &mut String, data: &[u8]) {
    let entropy = calculate_entropy(data);
    let chi_square = calculate_chi_square(data);
    let p_value = chi_square_p_value(chi_square, 255);
    let (runs, expected_runs) = calculate_runs_test(data);
    let correlation = calculate_serial_correlation(data);
    let (longest_value, longest_run) = longest_byte_run(data);

    output.push_str("Frequency:\n");
    output.push_str(&format!("  Unique bytes: {}/256\n", count_unique_bytes(data)));
    output.push_str(&format!(
        "  Chi-square: {:.2} (p = {:.4}) - {}\n",
        chi_square,
        p_value,
        interpret_chi_square(p_value)
    ));
    output.push('\n');

    output.push_str("Entropy:\n");
    output.push_str(&format!(
        "  Shannon: {:.4} bits/byte ({:.1}% max) - {}\n",
        entropy,
        entropy / 8.0 * 100.0,
        interpret_entropy(entropy)
    ));
    output.push_str(&format!(
        "  Hamming weight bias: {:.3}%\n",
        monobit_bias(data) * 100.0
    ));
    output.push('\n');

    output.push_str("Structure:\n");
    output.push_str(&format!(
        "  Bit runs: {} (expected {:.0}) - {}\n",
        runs,
        expected_runs,
        interpret_runs(runs, expected_runs)
    ));
    output.push_str(&format!(
        "  Serial correlation: {:.4} - {}\n",
        correlation,
        interpret_correlation(correlation)
    ));
    output.push_str(&format!(
        "  Longest byte run: {} x 0x{:02X}\n",
        longest_run, longest_value
    ));
}

/// Smallest `p <= max_period` such that the second half of `data`
/// repeats with period `p`.
pub fn detect_period(data: &[u8], max_period: usize) -> Option<usize> {
    let start = data.len() / 2;
    (1..=max_period.min(start)).find(|&p| (start..data.len()).all(|i| data[i] == data[i - p]))
}

fn byte_histogram(data: &[u8]) -> [u64; 256] {
    let mut freq = [0u64; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }
    freq
}

/// Calculate Shannon entropy (bits per byte)
fn calculate_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let len = data.len() as f64;
    byte_histogram(data)
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn interpret_entropy(entropy: f64) -> &'static str {
    match entropy {
        h if h >= 7.5 => "Very high entropy (encryption or white noise)",
        h if h >= 6.5 => "High entropy (well-randomized data)",
        h if h >= 5.5 => "Moderate entropy (structured but transformed)",
        h if h >= 4.0 => "Low entropy (plain text or similar)",
        _ => "Very low entropy (highly structured)",
    }
}

/// Chi-square goodness of fit against a uniform byte distribution
fn calculate_chi_square(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let expected = data.len() as f64 / 256.0;
    byte_histogram(data)
        .iter()
        .map(|&count| {
            let diff = count as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Approximate p-value for chi-square (normal approximation)
fn chi_square_p_value(chi_square: f64, df: usize) -> f64 {
    let z = ((2.0 * chi_square).sqrt() - (2.0 * df as f64 - 1.0).sqrt()) / std::f64::consts::SQRT_2;
    0.5 * (1.0 - erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

fn interpret_chi_square(p: f64) -> &'static str {
    if !(0.01..=0.99).contains(&p) {
        "SUSPECT - significant deviation from uniform"
    } else if !(0.05..=0.95).contains(&p) {
        "Marginal - slight deviation from uniform"
    } else {
        "Consistent with uniform"
    }
}

/// Fraction of set bits minus one half, as an absolute value
fn monobit_bias(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let ones: u64 = data.iter().map(|b| u64::from(b.count_ones())).sum();
    let total = (data.len() * 8) as f64;
    (ones as f64 / total - 0.5).abs()
}

fn count_unique_bytes(data: &[u8]) -> usize {
    byte_histogram(data).iter().filter(|&&c| c > 0).count()
}

fn calculate_runs_test(data: &[u8]) -> (usize, f64) {
    if data.is_empty() {
        return (0, 0.0);
    }

    let mut current_bit = data[0] & 1;
    let mut runs = 1;
    let total_bits = data.len() * 8;
    let mut ones = 0;

    for byte in data {
        for i in 0..8 {
            let bit = (byte >> i) & 1;
            if bit != current_bit {
                runs += 1;
                current_bit = bit;
            }
            if bit == 1 {
                ones += 1;
            }
        }
    }

    let zeros = total_bits - ones;
    let expected_runs = (2 * zeros * ones) as f64 / total_bits as f64 + 1.0;

    (runs, expected_runs)
}

fn interpret_runs(actual: usize, expected: f64) -> &'static str {
    let diff = (actual as f64 - expected).abs() / expected;
    if diff < 0.1 {
        "Random-looking run lengths"
    } else if actual as f64 > expected {
        "Too many short runs (alternating pattern)"
    } else {
        "Too few runs (long streaks)"
    }
}

fn calculate_serial_correlation(data: &[u8]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    let mut sum_prod = 0f64;

    for pair in data.windows(2) {
        let x = pair[0] as f64;
        let y = pair[1] as f64;
        sum += x;
        sum_sq += x * x;
        sum_prod += x * y;
    }

    let n = (data.len() - 1) as f64;
    let numerator = n * sum_prod - sum * sum;
    let denominator = n * sum_sq - sum * sum;

    if denominator.abs() < f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

fn interpret_correlation(correlation: f64) -> &'static str {
    if correlation.abs() < 0.05 {
        "No significant correlation"
    } else if correlation > 0.0 {
        "Positive correlation (values follow similar trend)"
    } else {
        "Negative correlation (values oscillate)"
    }
}

/// Longest run of one repeated byte: (value, length)
fn longest_byte_run(data: &[u8]) -> (u8, usize) {
    let mut best = (0u8, 0usize);
    let mut i = 0;
    while i < data.len() {
        let run = data[i..].iter().take_while(|&&b| b == data[i]).count();
        if run > best.1 {
            best = (data[i], run);
        }
        i += run;
    }
    best
}

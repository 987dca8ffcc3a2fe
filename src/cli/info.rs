use crate::container::ContainerHeader;
use crate::envelope::read_envelope;
use crate::error::Result;
use std::fs;
use std::path::Path;

/// Display information about an envelope file
/// Needs no password; only plaintext metadata is shown
pub fn show_info(path: &Path) -> Result<String> {
    let envelope = read_envelope(path)?;
    let header = &envelope.header;
    let file_size = fs::metadata(path)?.len();
    let container_header = ContainerHeader::from_bytes(&envelope.container).ok();

    let mut output = String::new();

    output.push_str("ChaosVault Envelope Information\n");
    output.push_str("===============================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Actual size: {}\n", format_size(file_size)));
    output.push_str(&format!("Version: {}\n", header.version));
    output.push_str(&format!("Id: {}\n", header.id));
    output.push_str(&format!("Original filename: {}\n", header.filename));
    output.push_str(&format!("Encrypted at: {} (unix seconds)\n", header.timestamp));
    output.push('\n');

    output.push_str("Sizes:\n");
    output.push_str(&format!(
        "  Original: {}\n",
        format_size(header.original_size)
    ));
    output.push_str(&format!(
        "  Container: {}\n",
        format_size(header.encrypted_size)
    ));
    match container_header {
        Some(ch) => {
            output.push_str(&format!(
                "  Ciphertext: {}\n",
                format_size(u64::from(ch.compressed_length))
            ));
            if ch.original_length > 0 {
                let ratio = ch.compressed_length as f64 / ch.original_length as f64;
                output.push_str(&format!("  Run-length ratio: {:.3}\n", ratio));
            }
        }
        None => output.push_str("  Ciphertext: unreadable (container shorter than header)\n"),
    }
    output.push('\n');

    output.push_str("Tags:\n");
    output.push_str(&format!("  Fingerprint: {}\n", header.fingerprint));
    output.push_str(&format!("  Digest: {}\n", header.digest));
    output.push('\n');

    output.push_str("Security Model:\n");
    output.push_str("  Deterministic chaotic-map transform, not a vetted cipher.\n");
    output.push_str("  Decrypting requires the password that produced the fingerprint.\n");

    Ok(output)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

use crate::container::{encrypt_with_progress, DEFAULT_CHUNK_SIZE};
use crate::envelope::{write_envelope, Envelope, EnvelopeHeader};
use crate::error::Result;
use std::path::Path;

/// Options for the encrypt command
#[derive(Debug, Clone)]
pub struct EncryptOptions {
    pub password: String,
    /// Bytes per progress checkpoint; does not affect the output
    pub chunk_size: usize,
    /// Print progress lines to stderr
    pub progress: bool,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            password: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: false,
        }
    }
}

/// Encrypt a file into an envelope
/// Returns the header that was written
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    options: &EncryptOptions,
) -> Result<EnvelopeHeader> {
    let input_data = std::fs::read(input_path)?;

    let payload = if options.progress {
        encrypt_with_progress(
            &input_data,
            &options.password,
            options.chunk_size,
            super::progress_printer("Encrypting"),
        )?
    } else {
        encrypt_with_progress(&input_data, &options.password, options.chunk_size, |_| {})?
    };

    let filename = input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let envelope = Envelope::new(filename, payload)?;
    write_envelope(output_path, &envelope)?;

    tracing::info!(
        id = %envelope.header.id,
        original = envelope.header.original_size,
        encrypted = envelope.header.encrypted_size,
        "wrote {}",
        output_path.display()
    );
    Ok(envelope.header)
}

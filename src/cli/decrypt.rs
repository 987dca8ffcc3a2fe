use crate::container::{decrypt_with_progress, DEFAULT_CHUNK_SIZE};
use crate::envelope::read_envelope;
use crate::error::Result;
use std::path::Path;

/// Options for the decrypt command
#[derive(Debug, Clone)]
pub struct DecryptOptions {
    pub password: String,
    pub chunk_size: usize,
    pub progress: bool,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            password: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress: false,
        }
    }
}

/// Decrypt an envelope into `output_path`
/// Nothing is written unless every check passes
/// Returns the number of plaintext bytes written
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    options: &DecryptOptions,
) -> Result<usize> {
    let envelope = read_envelope(input_path)?;
    let header = &envelope.header;

    let data = if options.progress {
        decrypt_with_progress(
            &envelope.container,
            &options.password,
            &header.fingerprint,
            &header.digest,
            options.chunk_size,
            super::progress_printer("Decrypting"),
        )?
    } else {
        decrypt_with_progress(
            &envelope.container,
            &options.password,
            &header.fingerprint,
            &header.digest,
            options.chunk_size,
            |_| {},
        )?
    };

    std::fs::write(output_path, &data)?;
    tracing::info!(id = %header.id, bytes = data.len(), "decrypted to {}", output_path.display());
    Ok(data.len())
}

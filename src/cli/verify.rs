use crate::container::verify;
use crate::envelope::{read_envelope, EnvelopeHeader};
use crate::error::Result;
use std::path::Path;

/// Check a password and the container digest without writing plaintext
pub fn verify_file(path: &Path, password: &str) -> Result<EnvelopeHeader> {
    let envelope = read_envelope(path)?;
    verify(
        &envelope.container,
        password,
        &envelope.header.fingerprint,
        &envelope.header.digest,
    )?;
    Ok(envelope.header)
}

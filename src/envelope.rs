use crate::container::{ContainerHeader, EncryptedPayload};
use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Magic bytes for the envelope file format
const ENVELOPE_MAGIC: &[u8; 4] = b"CVLT";

/// Current envelope format version
pub const ENVELOPE_VERSION: u32 = 1;

/// Bytes of the BLAKE3 hash kept as the envelope id
const ID_BYTES: usize = 16;

/// Upper bound on the JSON header length accepted when reading
const MAX_HEADER_LEN: usize = 64 * 1024;

/// Envelope metadata - plaintext JSON, stored ahead of the container
/// Holds everything needed to open the container except the password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    /// Format version
    pub version: u32,
    /// Opaque identifier derived from the container bytes
    pub id: String,
    /// Name of the file that was encrypted
    pub filename: String,
    /// Password fingerprint (64 hex chars)
    pub fingerprint: String,
    /// Container digest (64 hex chars)
    pub digest: String,
    /// Payload size before encryption
    pub original_size: u64,
    /// Container size in bytes (header + ciphertext)
    pub encrypted_size: u64,
    /// Seconds since the Unix epoch at encryption time
    pub timestamp: u64,
}

impl EnvelopeHeader {
    /// Build a header for a freshly encrypted payload
    pub fn new(filename: impl Into<String>, payload: &EncryptedPayload) -> Result<Self> {
        let container_header = ContainerHeader::from_bytes(&payload.container)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Ok(Self {
            version: ENVELOPE_VERSION,
            id: container_id(&payload.container),
            filename: filename.into(),
            fingerprint: payload.fingerprint.clone(),
            digest: payload.digest.clone(),
            original_size: u64::from(container_header.original_length),
            encrypted_size: payload.container.len() as u64,
            timestamp,
        })
    }

    /// Serialize header to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize header from JSON bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Opaque identifier for a container: truncated BLAKE3, hex encoded
pub fn container_id(container: &[u8]) -> String {
    let hash = blake3::hash(container);
    hex::encode(&hash.as_bytes()[..ID_BYTES])
}

/// An envelope file: metadata header plus the raw container
#[derive(Debug, Clone)]
pub struct Envelope {
    pub header: EnvelopeHeader,
    pub container: Vec<u8>,
}

impl Envelope {
    pub fn new(filename: impl Into<String>, payload: EncryptedPayload) -> Result<Self> {
        let header = EnvelopeHeader::new(filename, &payload)?;
        Ok(Self {
            header,
            container: payload.container,
        })
    }
}

fn read_header_from<R: Read>(reader: &mut R) -> Result<EnvelopeHeader> {
    // Read and verify magic
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != ENVELOPE_MAGIC {
        return Err(VaultError::InvalidFormat(
            "Invalid envelope magic bytes".into(),
        ));
    }

    // Read header length (4 bytes, little-endian)
    let mut header_len_bytes = [0u8; 4];
    reader.read_exact(&mut header_len_bytes)?;
    let header_len = u32::from_le_bytes(header_len_bytes) as usize;
    if header_len > MAX_HEADER_LEN {
        return Err(VaultError::InvalidFormat(format!(
            "Envelope header length {} exceeds {}",
            header_len, MAX_HEADER_LEN
        )));
    }

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header = EnvelopeHeader::from_bytes(&header_bytes)?;

    if header.version != ENVELOPE_VERSION {
        return Err(VaultError::InvalidFormat(format!(
            "Unsupported envelope version {}",
            header.version
        )));
    }
    Ok(header)
}

/// Read an envelope file from disk
pub fn read_envelope(path: &Path) -> Result<Envelope> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let header = read_header_from(&mut reader)?;

    let mut container = Vec::new();
    reader.read_to_end(&mut container)?;
    if container.len() as u64 != header.encrypted_size {
        tracing::warn!(
            path = %path.display(),
            expected = header.encrypted_size,
            actual = container.len(),
            "envelope container size differs from header"
        );
    }

    Ok(Envelope { header, container })
}

/// Read just the header from an envelope file (without loading the container)
pub fn read_envelope_header(path: &Path) -> Result<EnvelopeHeader> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_header_from(&mut reader)
}

/// Write an envelope file to disk (creates new file or overwrites)
pub fn write_envelope(path: &Path, envelope: &Envelope) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(ENVELOPE_MAGIC)?;

    let header_bytes = envelope.header.to_bytes()?;
    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| VaultError::InvalidFormat("Envelope header too large".into()))?;
    writer.write_all(&header_len.to_le_bytes())?;
    writer.write_all(&header_bytes)?;

    writer.write_all(&envelope.container)?;

    writer.flush()?;
    Ok(())
}

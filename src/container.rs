//! Cipher container: encrypt/decrypt orchestration and byte layout.
//!
//! ```text
//! offset 0 : original_length   (u32 BE)
//! offset 4 : compressed_length (u32 BE)
//! offset 8 : ciphertext        (compressed_length bytes)
//! ```
//!
//! Encryption: `compress -> XOR keystream -> prepend header -> digest`.
//! Decryption checks the fingerprint, then the digest, before touching the
//! ciphertext, and never returns partial plaintext.

use crate::error::{Result, VaultError};
use crate::pipeline::{
    chaos_stream, compress, decompress, derive_seed, fingerprint, tags_match, Digester,
};

/// Bytes processed between progress callbacks when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Length header at the start of every container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Payload length before compression
    pub original_length: u32,
    /// Ciphertext length (equals compressed payload length)
    pub compressed_length: u32,
}

impl ContainerHeader {
    /// Header size: 4 bytes (original) + 4 bytes (compressed)
    pub const SIZE: usize = 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.original_length.to_be_bytes());
        buf[4..8].copy_from_slice(&self.compressed_length.to_be_bytes());
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(VaultError::MalformedContainer(format!(
                "{} bytes is shorter than the {}-byte header",
                data.len(),
                Self::SIZE
            )));
        }
        let original_length = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let compressed_length = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        Ok(Self {
            original_length,
            compressed_length,
        })
    }
}

/// Output of [`encrypt`]: the container plus the tags needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub container: Vec<u8>,
    pub fingerprint: String,
    pub digest: String,
}

/// Which part of the pipeline a progress report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Cipher,
    Digest,
}

/// Progress checkpoint emitted between chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub processed: usize,
    pub total: usize,
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| VaultError::PayloadTooLarge(len))
}

/// XOR the keystream into `buf` chunk by chunk, reporting progress.
/// One generator instance runs across all chunks.
fn apply_keystream<F>(buf: &mut [u8], seed: f64, chunk_size: usize, on_progress: &mut F)
where
    F: FnMut(Progress),
{
    let total = buf.len();
    let mut stream = chaos_stream(seed, total);
    let mut processed = 0;
    for chunk in buf.chunks_mut(chunk_size) {
        processed += stream.apply_xor(chunk);
        tracing::trace!(processed, total, "keystream chunk applied");
        on_progress(Progress {
            phase: Phase::Cipher,
            processed,
            total,
        });
    }
}

/// Digest `data` chunk by chunk, reporting progress.
fn digest_chunked<F>(data: &[u8], password: &str, chunk_size: usize, on_progress: &mut F) -> String
where
    F: FnMut(Progress),
{
    let total = data.len();
    let mut digester = Digester::new(password);
    for chunk in data.chunks(chunk_size) {
        digester.update(chunk);
        on_progress(Progress {
            phase: Phase::Digest,
            processed: digester.processed(),
            total,
        });
    }
    digester.finalize()
}

/// Encrypt `data` under `password`.
pub fn encrypt(data: &[u8], password: &str) -> Result<EncryptedPayload> {
    encrypt_with_progress(data, password, DEFAULT_CHUNK_SIZE, |_| {})
}

/// [`encrypt`] with progress checkpoints every `chunk_size` bytes.
///
/// The output is identical to [`encrypt`] for every chunk size.
pub fn encrypt_with_progress<F>(
    data: &[u8],
    password: &str,
    chunk_size: usize,
    mut on_progress: F,
) -> Result<EncryptedPayload>
where
    F: FnMut(Progress),
{
    let chunk_size = chunk_size.max(1);
    let seed = derive_seed(password);
    let fp = fingerprint(password);

    let compressed = compress(data);
    let header = ContainerHeader {
        original_length: to_u32(data.len())?,
        compressed_length: to_u32(compressed.len())?,
    };

    let mut container = Vec::with_capacity(ContainerHeader::SIZE + compressed.len());
    container.extend_from_slice(&header.to_bytes());
    container.extend_from_slice(&compressed);
    apply_keystream(
        &mut container[ContainerHeader::SIZE..],
        seed,
        chunk_size,
        &mut on_progress,
    );

    let digest = digest_chunked(&container, password, chunk_size, &mut on_progress);

    tracing::debug!(
        original = data.len(),
        compressed = compressed.len(),
        container = container.len(),
        "encrypted payload"
    );

    Ok(EncryptedPayload {
        container,
        fingerprint: fp,
        digest,
    })
}

/// Decrypt `container`, verifying the fingerprint and digest first.
pub fn decrypt(
    container: &[u8],
    password: &str,
    expected_fingerprint: &str,
    expected_digest: &str,
) -> Result<Vec<u8>> {
    decrypt_with_progress(
        container,
        password,
        expected_fingerprint,
        expected_digest,
        DEFAULT_CHUNK_SIZE,
        |_| {},
    )
}

/// [`decrypt`] with progress checkpoints every `chunk_size` bytes.
pub fn decrypt_with_progress<F>(
    container: &[u8],
    password: &str,
    expected_fingerprint: &str,
    expected_digest: &str,
    chunk_size: usize,
    mut on_progress: F,
) -> Result<Vec<u8>>
where
    F: FnMut(Progress),
{
    let result = open_container(
        container,
        password,
        expected_fingerprint,
        expected_digest,
        chunk_size.max(1),
        &mut on_progress,
    );
    if let Err(e) = &result {
        tracing::debug!(error = %e, "container rejected");
    }
    result
}

fn open_container<F>(
    container: &[u8],
    password: &str,
    expected_fingerprint: &str,
    expected_digest: &str,
    chunk_size: usize,
    on_progress: &mut F,
) -> Result<Vec<u8>>
where
    F: FnMut(Progress),
{
    // Cheap, payload-independent check first
    verify_password(password, expected_fingerprint)?;

    let actual_digest = digest_chunked(container, password, chunk_size, on_progress);
    if !tags_match(expected_digest, &actual_digest) {
        return Err(VaultError::IntegrityFailure);
    }

    let header = ContainerHeader::from_bytes(container)?;
    let ciphertext = &container[ContainerHeader::SIZE..];
    if ciphertext.len() != header.compressed_length as usize {
        return Err(VaultError::MalformedContainer(format!(
            "header declares {} ciphertext bytes, found {}",
            header.compressed_length,
            ciphertext.len()
        )));
    }

    let mut compressed = ciphertext.to_vec();
    apply_keystream(
        &mut compressed,
        derive_seed(password),
        chunk_size,
        on_progress,
    );

    let plaintext = decompress(&compressed);
    let expected = header.original_length as usize;
    if plaintext.len() != expected {
        return Err(VaultError::LengthMismatch {
            expected,
            actual: plaintext.len(),
        });
    }

    tracing::debug!(
        container = container.len(),
        plaintext = plaintext.len(),
        "decrypted container"
    );
    Ok(plaintext)
}

/// Check `password` against a stored fingerprint.
pub fn verify_password(password: &str, expected_fingerprint: &str) -> Result<()> {
    if tags_match(expected_fingerprint, &fingerprint(password)) {
        Ok(())
    } else {
        Err(VaultError::WrongPassword)
    }
}

/// Check `password` and the container digest without decrypting.
pub fn verify(
    container: &[u8],
    password: &str,
    expected_fingerprint: &str,
    expected_digest: &str,
) -> Result<()> {
    verify_password(password, expected_fingerprint)?;
    let mut digester = Digester::new(password);
    digester.update(container);
    if tags_match(expected_digest, &digester.finalize()) {
        Ok(())
    } else {
        Err(VaultError::IntegrityFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::digest;

    fn roundtrip(data: &[u8], password: &str) -> Vec<u8> {
        let sealed = encrypt(data, password).unwrap();
        decrypt(&sealed.container, password, &sealed.fingerprint, &sealed.digest).unwrap()
    }

    #[test]
    fn test_known_container() {
        let sealed = encrypt(&[1, 2, 3], "password1").unwrap();
        assert_eq!(
            sealed.container,
            vec![0, 0, 0, 3, 0, 0, 0, 3, 0xd7, 0x68, 0xe6]
        );
        assert_eq!(
            sealed.fingerprint,
            "d66ae53b8bbd927e93d96ab78a51a1447e2362b776317df21c3d8ca7aa9e4490"
        );
        assert_eq!(
            sealed.digest,
            "0d1b1186bf174b17cc1d11fc18e81d051dc60a1714cc13d0cea71de10068000d"
        );
    }

    #[test]
    fn test_run_is_compressed_before_cipher() {
        let sealed = encrypt(b"AAAA", "password1").unwrap();
        assert_eq!(
            sealed.container,
            vec![0, 0, 0, 4, 0, 0, 0, 3, 0x28, 0x6e, 0xa4]
        );
        assert_eq!(roundtrip(b"AAAA", "password1"), b"AAAA");
    }

    #[test]
    fn test_empty_payload() {
        let sealed = encrypt(&[], "password1").unwrap();
        assert_eq!(sealed.container, vec![0u8; 8]);
        assert_eq!(
            sealed.digest,
            "a50dc18b3ea714c60014f8070e1e0a031a1f14f12d0893141a00f8550fcc1911"
        );
        let plain =
            decrypt(&sealed.container, "password1", &sealed.fingerprint, &sealed.digest).unwrap();
        assert!(plain.is_empty());
    }

    #[test]
    fn test_wrong_password() {
        let sealed = encrypt(&[1, 2, 3], "password1").unwrap();
        let err = decrypt(&sealed.container, "wrongpass", &sealed.fingerprint, &sealed.digest)
            .unwrap_err();
        assert!(matches!(err, VaultError::WrongPassword));
    }

    #[test]
    fn test_wrong_password_short_circuits_malformed_container() {
        let fp = fingerprint("password1");
        let err = decrypt(&[1, 2], "wrongpass", &fp, "00").unwrap_err();
        assert!(matches!(err, VaultError::WrongPassword));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let sealed = encrypt(&[1, 2, 3], "password1").unwrap();
        let mut container = sealed.container.clone();
        container[9] ^= 0x01;
        let err =
            decrypt(&container, "password1", &sealed.fingerprint, &sealed.digest).unwrap_err();
        assert!(matches!(err, VaultError::IntegrityFailure));
    }

    #[test]
    fn test_tampered_digest() {
        let sealed = encrypt(b"hello", "pw-for-digest").unwrap();
        let mut bad = sealed.digest.clone().into_bytes();
        bad[0] = if bad[0] == b'0' { b'1' } else { b'0' };
        let bad = String::from_utf8(bad).unwrap();
        let err = decrypt(&sealed.container, "pw-for-digest", &sealed.fingerprint, &bad)
            .unwrap_err();
        assert!(matches!(err, VaultError::IntegrityFailure));
    }

    #[test]
    fn test_short_container_is_malformed() {
        let container = [0u8, 0, 0];
        let fp = fingerprint("secret");
        let tag = digest(&container, "secret");
        let err = decrypt(&container, "secret", &fp, &tag).unwrap_err();
        assert!(matches!(err, VaultError::MalformedContainer(_)));
    }

    #[test]
    fn test_truncated_ciphertext_is_malformed() {
        let sealed = encrypt(b"abcdefgh", "secret").unwrap();
        let container = &sealed.container[..sealed.container.len() - 1];
        let tag = digest(container, "secret");
        let err = decrypt(container, "secret", &sealed.fingerprint, &tag).unwrap_err();
        assert!(matches!(err, VaultError::MalformedContainer(_)));
    }

    #[test]
    fn test_forged_original_length_is_length_mismatch() {
        let sealed = encrypt(b"abcdefgh", "secret").unwrap();
        let mut container = sealed.container.clone();
        container[3] = 9;
        let tag = digest(&container, "secret");
        let err = decrypt(&container, "secret", &sealed.fingerprint, &tag).unwrap_err();
        match err {
            VaultError::LengthMismatch { expected, actual } => {
                assert_eq!(expected, 9);
                assert_eq!(actual, 8);
            }
            other => panic!("unexpected error type: {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_varied_payloads() {
        let mut mixed: Vec<u8> = (0..5000u32).map(|i| (i % 7) as u8).collect();
        mixed.extend(vec![0xFE; 700]);
        mixed.extend(b"tail text with \xFE marker");

        for data in [
            b"plain text".to_vec(),
            vec![0u8; 10_000],
            vec![0xFE],
            mixed,
        ] {
            assert_eq!(roundtrip(&data, "correct horse"), data);
        }
    }

    #[test]
    fn test_progress_does_not_change_output() {
        let data: Vec<u8> = (0..3000u32).map(|i| (i * 13 % 256) as u8).collect();
        let plain = encrypt(&data, "progress").unwrap();

        let mut reports = Vec::new();
        let chunked = encrypt_with_progress(&data, "progress", 100, |p| reports.push(p)).unwrap();
        assert_eq!(plain, chunked);

        let cipher_total = plain.container.len() - ContainerHeader::SIZE;
        let last_cipher = reports
            .iter()
            .rev()
            .find(|p| p.phase == Phase::Cipher)
            .unwrap();
        assert_eq!(last_cipher.processed, cipher_total);
        let last_digest = reports.last().unwrap();
        assert_eq!(last_digest.phase, Phase::Digest);
        assert_eq!(last_digest.processed, plain.container.len());
    }

    #[test]
    fn test_zero_chunk_size_is_accepted() {
        let sealed = encrypt_with_progress(b"xyz", "pw", 0, |_| {}).unwrap();
        assert_eq!(sealed, encrypt(b"xyz", "pw").unwrap());
        let plain = decrypt_with_progress(
            &sealed.container,
            "pw",
            &sealed.fingerprint,
            &sealed.digest,
            0,
            |_| {},
        )
        .unwrap();
        assert_eq!(plain, b"xyz");
    }

    #[test]
    fn test_verify() {
        let sealed = encrypt(b"verify me", "pw").unwrap();
        assert!(verify(&sealed.container, "pw", &sealed.fingerprint, &sealed.digest).is_ok());
        assert!(matches!(
            verify(&sealed.container, "nope", &sealed.fingerprint, &sealed.digest),
            Err(VaultError::WrongPassword)
        ));
        let mut tampered = sealed.container.clone();
        tampered[0] ^= 0x80;
        assert!(matches!(
            verify(&tampered, "pw", &sealed.fingerprint, &sealed.digest),
            Err(VaultError::IntegrityFailure)
        ));
    }

    #[test]
    fn test_header_bytes() {
        let header = ContainerHeader {
            original_length: 0x01020304,
            compressed_length: 0x0A0B0C0D,
        };
        assert_eq!(header.to_bytes(), [1, 2, 3, 4, 0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(ContainerHeader::from_bytes(&header.to_bytes()).unwrap(), header);
        assert!(ContainerHeader::from_bytes(&[0; 7]).is_err());
    }
}

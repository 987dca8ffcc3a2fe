//! ChaosVault - password-seeded chaotic-map cipher container
//!
//! Turns a byte payload plus a password into a tamper-evident container and
//! back. Everything is deterministic: the same payload and password always
//! give the same container, fingerprint and digest.
//!
//! This is a teaching cipher. It is not cryptographically secure.
//!
//! ## Transform Pipeline
//!
//! ```text
//! Input → RLE compress → XOR chaos keystream → Length header → Digest → Output
//! ```
//!
//! - **Seed**: 32-bit rolling hash of the password, normalized into [0.0001, 0.9999]
//! - **ChaosStream**: logistic + tent maps, 100-step burn-in, one byte per step
//! - **Fingerprint**: first 32 keystream bytes (password check, payload-free)
//! - **RLE**: `[0xFE, len, value]` run tokens, literal `0xFE` escaped
//! - **Digest**: 32-byte diffusion hash of (container, password)
//!
//! ## Example
//!
//! ```
//! use chaosvault::{decrypt, encrypt};
//!
//! let sealed = encrypt(b"attack at dawn", "hunter2").unwrap();
//! let plain = decrypt(
//!     &sealed.container,
//!     "hunter2",
//!     &sealed.fingerprint,
//!     &sealed.digest,
//! )
//! .unwrap();
//! assert_eq!(plain, b"attack at dawn");
//!
//! assert!(decrypt(&sealed.container, "hunter3", &sealed.fingerprint, &sealed.digest).is_err());
//! ```

pub mod cli;
pub mod container;
pub mod envelope;
pub mod error;
pub mod pipeline;

pub use container::{
    decrypt, decrypt_with_progress, encrypt, encrypt_with_progress, verify, ContainerHeader,
    EncryptedPayload, Phase, Progress, DEFAULT_CHUNK_SIZE,
};
pub use envelope::{read_envelope, read_envelope_header, write_envelope, Envelope, EnvelopeHeader};
pub use error::{Result, VaultError};
pub use pipeline::{chaos_stream, compress, decompress, derive_seed, digest, fingerprint, ChaosStream};

use thiserror::Error;

/// Message shown to outer layers for any decrypt rejection, so callers
/// cannot tell which check failed.
pub const REJECTION_MESSAGE: &str = "wrong password or corrupted data";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wrong password: fingerprint mismatch")]
    WrongPassword,

    #[error("Integrity failure: digest mismatch")]
    IntegrityFailure,

    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    #[error("Length mismatch: header says {expected} bytes, decompressed {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Payload requires {0} bytes, exceeding the 32-bit container length field")]
    PayloadTooLarge(usize),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}

impl VaultError {
    /// True for the failure kinds a decrypt can reject with.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::WrongPassword
                | Self::IntegrityFailure
                | Self::MalformedContainer(_)
                | Self::LengthMismatch { .. }
        )
    }

    /// Text safe to show to whoever supplied the password.
    pub fn public_message(&self) -> String {
        if self.is_rejection() {
            REJECTION_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;

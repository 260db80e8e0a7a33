use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SignatureError {
    #[error("Signature must be 65 bytes (r || s || v), got {0}")]
    InvalidLength(usize),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("Hash must be 32 bytes, got {0}")]
    InvalidHashLength(usize),

    #[error("Public key recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("Invalid signer address: {0}")]
    InvalidSignerAddr(String),
}

use std::{fmt, str::FromStr};

use cosmwasm_schema::cw_serde;

use crate::{error::SignatureError, signature::keccak256};

pub const SIGNER_ADDR_LEN: usize = 20;

/// Identity of an off-band secp256k1 key holder: the last 20 bytes of the
/// keccak256 hash of its uncompressed public key (without the 0x04 tag).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignerAddr([u8; SIGNER_ADDR_LEN]);

impl SignerAddr {
    pub const fn new(bytes: [u8; SIGNER_ADDR_LEN]) -> Self {
        SignerAddr(bytes)
    }

    pub fn from_uncompressed_pubkey(pubkey: &[u8]) -> Result<Self, SignatureError> {
        if pubkey.len() != 65 || pubkey[0] != 0x04 {
            return Err(SignatureError::RecoveryFailed(
                "expected a 65 byte uncompressed public key".to_string(),
            ));
        }
        let hash = keccak256(&pubkey[1..]);
        let mut bytes = [0u8; SIGNER_ADDR_LEN];
        bytes.copy_from_slice(&hash[32 - SIGNER_ADDR_LEN..]);
        Ok(SignerAddr(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let bytes: [u8; SIGNER_ADDR_LEN] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidSignerAddr(hex::encode(bytes)))?;
        Ok(SignerAddr(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for SignerAddr {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded =
            hex::decode(stripped).map_err(|_| SignatureError::InvalidSignerAddr(s.to_string()))?;
        if decoded.len() != SIGNER_ADDR_LEN {
            return Err(SignatureError::InvalidSignerAddr(s.to_string()));
        }
        SignerAddr::from_slice(&decoded)
    }
}

impl fmt::Display for SignerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cw_serde]
#[derive(Copy, Eq, Default)]
pub enum SignerRole {
    #[default]
    None,
    Guardian,
    Owner,
}

impl SignerRole {
    /// Owners and guardians may sign batch items.
    pub fn can_sign(&self) -> bool {
        !matches!(self, SignerRole::None)
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerRole::None => write!(f, "none"),
            SignerRole::Guardian => write!(f, "guardian"),
            SignerRole::Owner => write!(f, "owner"),
        }
    }
}

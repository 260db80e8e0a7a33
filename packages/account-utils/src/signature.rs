use cosmwasm_std::{Api, Uint128};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

use crate::{error::SignatureError, signer::SignerAddr};

/// Prefix wallets prepend when signing a 32 byte hash as a message.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
pub const SIGNATURE_LEN: usize = 65;
pub const HASH_LEN: usize = 32;

pub fn keccak256(bytes: &[u8]) -> [u8; HASH_LEN] {
    Keccak256::digest(bytes).into()
}

fn u256_be(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Digest that is actually signed for a given 32 byte hash.
pub fn to_signed_message_hash(hash: &[u8; HASH_LEN]) -> [u8; HASH_LEN] {
    let mut hasher = Keccak256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(hash);
    hasher.finalize().into()
}

/// Hash each batch item signature commits to. The nonce is the account nonce
/// at validation time, shared by every item of the batch.
pub fn execution_hash(
    data: &[u8],
    reward: Uint128,
    value: Uint128,
    target: &str,
    nonce: u64,
) -> [u8; HASH_LEN] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.update(u256_be(reward.u128()));
    hasher.update(u256_be(value.u128()));
    hasher.update(target.as_bytes());
    hasher.update(u256_be(nonce as u128));
    hasher.finalize().into()
}

/// Hash an administrative action signature commits to.
pub fn action_hash(subject: &SignerAddr) -> [u8; HASH_LEN] {
    keccak256(subject.as_slice())
}

/// Hash a user signs to authorize a relayed call to `target`.
pub fn target_hash(target: &str) -> [u8; HASH_LEN] {
    keccak256(target.as_bytes())
}

/// Instantiate2 salt of the account controlled by `user`.
pub fn account_salt(user: &SignerAddr) -> [u8; HASH_LEN] {
    Sha256::digest(user.as_slice()).into()
}

fn recovery_param(v: u8) -> Result<u8, SignatureError> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - 27),
        _ => Err(SignatureError::InvalidRecoveryId(v)),
    }
}

/// Recovers the signer of `hash` from a `r || s || v` signature made over the
/// prefixed message hash.
pub fn recover_signer(
    api: &dyn Api,
    hash: &[u8],
    signature: &[u8],
) -> Result<SignerAddr, SignatureError> {
    let hash: &[u8; HASH_LEN] = hash
        .try_into()
        .map_err(|_| SignatureError::InvalidHashLength(hash.len()))?;
    if signature.len() != SIGNATURE_LEN {
        return Err(SignatureError::InvalidLength(signature.len()));
    }
    let param = recovery_param(signature[SIGNATURE_LEN - 1])?;

    let digest = to_signed_message_hash(hash);
    let pubkey = api
        .secp256k1_recover_pubkey(&digest, &signature[..SIGNATURE_LEN - 1], param)
        .map_err(|e| SignatureError::RecoveryFailed(e.to_string()))?;

    SignerAddr::from_uncompressed_pubkey(&pubkey)
}

use cosmwasm_std::{OverflowError, StdError, Uint128};
use counterfact_account_utils::{error::SignatureError, signer::SignerRole};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] UnauthorizedReason),

    #[error("Invalid signer address: {0}")]
    InvalidSignerAddr(String),

    #[error("Account is already initialized")]
    AlreadyInitialized,

    #[error("Account is not initialized")]
    NotInitialized,

    #[error("Batch must contain at least one item")]
    EmptyBatch,

    #[error("Batch fields differ in length: {targets} targets, {rewards} rewards, {values} values, {datas} datas, {signatures} signatures")]
    BatchLengthMismatch {
        targets: usize,
        rewards: usize,
        values: usize,
        datas: usize,
        signatures: usize,
    },

    #[error("Batch item {index} calls execute on the account itself")]
    SelfRecursiveBatch { index: usize },

    #[error("Batch item {index} is signed for nonce {nonce}, which was already consumed")]
    ReplayRejected { index: usize, nonce: u64 },

    #[error("Insufficient balance: batch needs {required}{denom}, account holds {available}{denom}")]
    InsufficientBalance {
        required: Uint128,
        available: Uint128,
        denom: String,
    },

    #[error("Action hash does not match the subject signer")]
    ActionHashMismatch,

    #[error("Signer {signer} is {actual}, expected {expected}")]
    SignerRoleMismatch {
        signer: String,
        expected: SignerRole,
        actual: SignerRole,
    },

    #[error("The account must keep at least one owner")]
    LastOwner,
}

#[derive(Error, Debug, PartialEq)]
pub enum UnauthorizedReason {
    #[error("Batch item {index} is signed by {signer}, which is neither owner nor guardian")]
    UnknownSigner { index: usize, signer: String },

    #[error("Signer management can only be called by the account itself")]
    NotSelfDelegated,

    #[error("Batch item {index} is signed by {item_signer} but carries an action signed by {action_signer}")]
    ForeignActionSignature {
        index: usize,
        item_signer: String,
        action_signer: String,
    },

    #[error("{signer} is {role} and cannot {action}")]
    InsufficientRole {
        signer: String,
        role: SignerRole,
        action: String,
    },
}

use cosmwasm_std::{Instantiate2AddressError, StdError, Uint128};
use counterfact_account_utils::error::SignatureError;
use cw_ownable::OwnershipError;
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    Instantiate2Address(#[from] Instantiate2AddressError),

    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Invalid user address: {0}")]
    InvalidUserAddr(String),

    #[error("Withdraw amount must be greater than zero")]
    ZeroAmount,

    #[error("Requested {requested}, relayer only holds {available} in refunds")]
    InsufficientRefunds {
        requested: Uint128,
        available: Uint128,
    },
}

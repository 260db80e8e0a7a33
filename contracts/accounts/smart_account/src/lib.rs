pub mod contract;
pub mod error;
mod helpers;
pub mod state;

pub mod msg {
    pub use counterfact_account_utils::msg::{
        BatchItem, ConfigResponse, ExecuteMsg, InstantiateMsg, QueryMsg, SignerInfo,
    };
}

pub use crate::error::ContractError;

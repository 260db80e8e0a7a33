use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin, Uint128};
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

use crate::state::Config;

#[cw_serde]
pub struct InstantiateMsg {
    // Defaults to the instantiator
    pub owner: Option<String>,
    // Smart account template deployed for each user
    pub account_code_id: u64,
    pub denom: String,
}

#[cw_ownable_execute]
#[cw_serde]
pub enum ExecuteMsg {
    /// Deploys the signer's account if needed and forwards `payload` to `target`
    Relay {
        target: String,
        signature: Binary,
        payload: Binary,
    },
    /// Pays out accumulated refunds
    Withdraw { recipient: String, amount: Uint128 },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Deterministic account address of `user`, deployed or not
    #[returns(Addr)]
    AddressFor { user: String },
    #[returns(Config)]
    Config {},
    #[returns(Option<Addr>)]
    DeployedFor { user: String },
    #[returns(Coin)]
    Refunds {},
}

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{to_json_binary, Binary, Coin, CosmosMsg, StdResult, Uint128, WasmMsg};

use crate::{policy::SignerAction, signer::SignerRole};

pub const DEFAULT_PAGE_LIMIT: u32 = 30;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[cw_serde]
pub struct InstantiateMsg {
    // Native denom used for item values and relayer rewards
    pub denom: String,
    // When set, the account is initialized with this signer as its first owner
    pub owner: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// One-time set-up seeding the first owner
    Initialize { owner: String },
    /// Runs a batch of individually signed calls under the current nonce
    Execute {
        targets: Vec<String>,
        rewards: Vec<Uint128>,
        values: Vec<Uint128>,
        datas: Vec<Binary>,
        signatures: Vec<Binary>,
    },
    // Signer management, reachable only through a self-targeted batch item
    AddOwner {
        signer: String,
        action_hash: Binary,
        action_signature: Binary,
    },
    RemoveOwner {
        signer: String,
        action_hash: Binary,
        action_signature: Binary,
    },
    AddGuardian {
        signer: String,
        action_hash: Binary,
        action_signature: Binary,
    },
    RemoveGuardian {
        signer: String,
        action_hash: Binary,
        action_signature: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(SignerRole)]
    RoleOf { address: String },
    #[returns(u64)]
    Nonce {},
    #[returns(ConfigResponse)]
    Config {},
    #[returns(Vec<SignerInfo>)]
    ListSigners {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// Address that produced `signature` over the prefixed `hash`
    #[returns(String)]
    RecoverSigner { hash: Binary, signature: Binary },
}

#[cw_serde]
pub struct ConfigResponse {
    pub denom: String,
    pub initialized: bool,
}

#[cw_serde]
pub struct SignerInfo {
    pub address: String,
    pub role: SignerRole,
}

/// A single signed call of a batch.
#[cw_serde]
pub struct BatchItem {
    pub target: String,
    pub reward: Uint128,
    pub value: Uint128,
    pub data: Binary,
    pub signature: Binary,
}

impl ExecuteMsg {
    /// Splits batch items into the parallel vectors `Execute` expects.
    pub fn batch(items: Vec<BatchItem>) -> Self {
        let mut targets = Vec::with_capacity(items.len());
        let mut rewards = Vec::with_capacity(items.len());
        let mut values = Vec::with_capacity(items.len());
        let mut datas = Vec::with_capacity(items.len());
        let mut signatures = Vec::with_capacity(items.len());

        for item in items {
            targets.push(item.target);
            rewards.push(item.reward);
            values.push(item.value);
            datas.push(item.data);
            signatures.push(item.signature);
        }

        ExecuteMsg::Execute {
            targets,
            rewards,
            values,
            datas,
            signatures,
        }
    }
}

impl ExecuteMsg {
    pub fn signer_action(
        action: SignerAction,
        signer: impl Into<String>,
        action_hash: Binary,
        action_signature: Binary,
    ) -> Self {
        let signer = signer.into();
        match action {
            SignerAction::AddOwner => ExecuteMsg::AddOwner {
                signer,
                action_hash,
                action_signature,
            },
            SignerAction::RemoveOwner => ExecuteMsg::RemoveOwner {
                signer,
                action_hash,
                action_signature,
            },
            SignerAction::AddGuardian => ExecuteMsg::AddGuardian {
                signer,
                action_hash,
                action_signature,
            },
            SignerAction::RemoveGuardian => ExecuteMsg::RemoveGuardian {
                signer,
                action_hash,
                action_signature,
            },
        }
    }

    /// The action with its signed hash and signature, for signer management
    /// messages only.
    pub fn as_signer_action(&self) -> Option<(SignerAction, &Binary, &Binary)> {
        let (action, action_hash, action_signature) = match self {
            ExecuteMsg::AddOwner {
                action_hash,
                action_signature,
                ..
            } => (SignerAction::AddOwner, action_hash, action_signature),
            ExecuteMsg::RemoveOwner {
                action_hash,
                action_signature,
                ..
            } => (SignerAction::RemoveOwner, action_hash, action_signature),
            ExecuteMsg::AddGuardian {
                action_hash,
                action_signature,
                ..
            } => (SignerAction::AddGuardian, action_hash, action_signature),
            ExecuteMsg::RemoveGuardian {
                action_hash,
                action_signature,
                ..
            } => (SignerAction::RemoveGuardian, action_hash, action_signature),
            ExecuteMsg::Initialize { .. } | ExecuteMsg::Execute { .. } => return None,
        };
        Some((action, action_hash, action_signature))
    }
}

pub fn execute_batch_msg(
    account: impl Into<String>,
    items: Vec<BatchItem>,
    funds: Vec<Coin>,
) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: account.into(),
        msg: to_json_binary(&ExecuteMsg::batch(items))?,
        funds,
    }))
}

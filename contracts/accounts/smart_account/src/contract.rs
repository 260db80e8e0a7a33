#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    ensure, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Order, Response, StdError,
    StdResult,
};
use counterfact_account_utils::{
    msg::{
        ConfigResponse, ExecuteMsg, InstantiateMsg, QueryMsg, SignerInfo, DEFAULT_PAGE_LIMIT,
        MAX_PAGE_LIMIT,
    },
    policy::SignerAction,
    signature::recover_signer,
    signer::SignerAddr,
};
use cw2::set_contract_version;
use cw_storage_plus::Bound;

use crate::{
    error::ContractError,
    helpers::{role_of, seed_owner},
    state::{DENOM, NONCE, OWNER_COUNT, SIGNERS},
};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    ensure!(
        !msg.denom.is_empty(),
        StdError::generic_err("denom must not be empty")
    );
    DENOM.save(deps.storage, &msg.denom)?;
    NONCE.save(deps.storage, &0)?;

    let mut response = Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("denom", msg.denom);

    // Accounts created by the relayer are initialized in the same transaction
    if let Some(owner) = msg.owner {
        let owner = seed_owner(deps.storage, &owner)?;
        response = response.add_attribute("owner", owner.to_string());
    }

    Ok(response)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Initialize { owner } => execute::initialize(deps, owner),
        ExecuteMsg::Execute {
            targets,
            rewards,
            values,
            datas,
            signatures,
        } => {
            let items = execute::zip_batch(targets, rewards, values, datas, signatures)?;
            execute::execute_batch(deps, env, info, items)
        }
        ExecuteMsg::AddOwner {
            signer,
            action_hash,
            action_signature,
        } => execute::signer_action(
            deps,
            env,
            info,
            SignerAction::AddOwner,
            signer,
            action_hash,
            action_signature,
        ),
        ExecuteMsg::RemoveOwner {
            signer,
            action_hash,
            action_signature,
        } => execute::signer_action(
            deps,
            env,
            info,
            SignerAction::RemoveOwner,
            signer,
            action_hash,
            action_signature,
        ),
        ExecuteMsg::AddGuardian {
            signer,
            action_hash,
            action_signature,
        } => execute::signer_action(
            deps,
            env,
            info,
            SignerAction::AddGuardian,
            signer,
            action_hash,
            action_signature,
        ),
        ExecuteMsg::RemoveGuardian {
            signer,
            action_hash,
            action_signature,
        } => execute::signer_action(
            deps,
            env,
            info,
            SignerAction::RemoveGuardian,
            signer,
            action_hash,
            action_signature,
        ),
    }
}

mod execute {
    use cosmwasm_std::{
        coins, ensure, from_json, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Env, Event,
        MessageInfo, Response, Uint128, Uint64, WasmMsg,
    };
    use counterfact_account_utils::{
        msg::{BatchItem, ExecuteMsg},
        policy::{is_permitted, SignerAction},
        signature::{action_hash, execution_hash, recover_signer},
        signer::SignerAddr,
    };

    use crate::{
        error::{ContractError, UnauthorizedReason},
        helpers::{ensure_initialized, parse_signer, role_of, seed_owner, set_role},
        state::{DENOM, NONCE},
    };

    pub fn initialize(deps: DepsMut, owner: String) -> Result<Response, ContractError> {
        let owner = seed_owner(deps.storage, &owner)?;

        Ok(Response::new()
            .add_attribute("method", "initialize")
            .add_attribute("owner", owner.to_string()))
    }

    pub fn zip_batch(
        targets: Vec<String>,
        rewards: Vec<Uint128>,
        values: Vec<Uint128>,
        datas: Vec<Binary>,
        signatures: Vec<Binary>,
    ) -> Result<Vec<BatchItem>, ContractError> {
        let len = targets.len();
        ensure!(
            [rewards.len(), values.len(), datas.len(), signatures.len()]
                .iter()
                .all(|l| *l == len),
            ContractError::BatchLengthMismatch {
                targets: len,
                rewards: rewards.len(),
                values: values.len(),
                datas: datas.len(),
                signatures: signatures.len(),
            }
        );
        ensure!(len > 0, ContractError::EmptyBatch);

        Ok(targets
            .into_iter()
            .zip(rewards)
            .zip(values)
            .zip(datas)
            .zip(signatures)
            .map(
                |((((target, reward), value), data), signature)| BatchItem {
                    target,
                    reward,
                    value,
                    data,
                    signature,
                },
            )
            .collect())
    }

    pub fn execute_batch(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        items: Vec<BatchItem>,
    ) -> Result<Response, ContractError> {
        ensure_initialized(deps.storage)?;

        // Nested batches are refused before any signature is looked at
        if let Some(index) = items
            .iter()
            .position(|item| is_self_recursive(&env, item))
        {
            return Err(ContractError::SelfRecursiveBatch { index });
        }

        let nonce = NONCE.load(deps.storage)?;
        let denom = DENOM.load(deps.storage)?;

        let mut signers = Vec::with_capacity(items.len());
        let mut required = Uint128::zero();
        for (index, item) in items.iter().enumerate() {
            deps.api.addr_validate(&item.target)?;
            let signer = authorize_item(deps.as_ref(), index, item, nonce)?;
            ensure_own_action(deps.as_ref(), &env, index, item, &signer)?;
            signers.push(signer);
            required = required.checked_add(item.value)?.checked_add(item.reward)?;
        }

        let available = deps
            .querier
            .query_balance(&env.contract.address, &denom)?
            .amount;
        ensure!(
            required <= available,
            ContractError::InsufficientBalance {
                required,
                available,
                denom,
            }
        );

        let next_nonce = Uint64::new(nonce).checked_add(Uint64::one())?;
        NONCE.save(deps.storage, &next_nonce.u64())?;

        let mut response = Response::new()
            .add_attribute("method", "execute")
            .add_attribute("nonce", nonce.to_string())
            .add_attribute("items", items.len().to_string());

        for (index, (item, signer)) in items.into_iter().zip(signers).enumerate() {
            if let Some(msg) = item_msg(&item, &denom) {
                response = response.add_message(msg);
            }
            // Reimburse whoever submitted the batch
            if !item.reward.is_zero() {
                response = response.add_message(BankMsg::Send {
                    to_address: info.sender.to_string(),
                    amount: coins(item.reward.u128(), &denom),
                });
            }
            response = response.add_event(
                Event::new("action_executed")
                    .add_attribute("index", index.to_string())
                    .add_attribute("target", item.target)
                    .add_attribute("signer", signer.to_string())
                    .add_attribute("value", item.value)
                    .add_attribute("reward", item.reward),
            );
        }

        Ok(response)
    }

    fn is_self_recursive(env: &Env, item: &BatchItem) -> bool {
        item.target == env.contract.address.as_str()
            && matches!(
                from_json::<ExecuteMsg>(&item.data),
                Ok(ExecuteMsg::Execute { .. })
            )
    }

    fn authorize_item(
        deps: Deps,
        index: usize,
        item: &BatchItem,
        nonce: u64,
    ) -> Result<SignerAddr, ContractError> {
        let hash = execution_hash(&item.data, item.reward, item.value, &item.target, nonce);
        let recovered = recover_signer(deps.api, &hash, &item.signature);
        if let Ok(signer) = recovered {
            if role_of(deps.storage, &signer)?.can_sign() {
                return Ok(signer);
            }
        }

        // A signature that still verifies against the previous nonce is a replay
        if let Some(previous) = nonce.checked_sub(1) {
            let stale = execution_hash(
                &item.data,
                item.reward,
                item.value,
                &item.target,
                previous,
            );
            if let Ok(stale_signer) = recover_signer(deps.api, &stale, &item.signature) {
                if role_of(deps.storage, &stale_signer)?.can_sign() {
                    return Err(ContractError::ReplayRejected {
                        index,
                        nonce: previous,
                    });
                }
            }
        }

        let signer = recovered?;
        Err(UnauthorizedReason::UnknownSigner {
            index,
            signer: signer.to_string(),
        }
        .into())
    }

    /// Action signatures only depend on the subject, so a signer management
    /// item must carry an action signed by the same key that signed the item.
    fn ensure_own_action(
        deps: Deps,
        env: &Env,
        index: usize,
        item: &BatchItem,
        item_signer: &SignerAddr,
    ) -> Result<(), ContractError> {
        if item.target != env.contract.address.as_str() {
            return Ok(());
        }
        let Ok(msg) = from_json::<ExecuteMsg>(&item.data) else {
            return Ok(());
        };
        let Some((_, action_hash, action_signature)) = msg.as_signer_action() else {
            return Ok(());
        };

        let action_signer = recover_signer(deps.api, action_hash, action_signature)?;
        ensure!(
            action_signer == *item_signer,
            UnauthorizedReason::ForeignActionSignature {
                index,
                item_signer: item_signer.to_string(),
                action_signer: action_signer.to_string(),
            }
        );
        Ok(())
    }

    fn item_msg(item: &BatchItem, denom: &str) -> Option<CosmosMsg> {
        let funds = if item.value.is_zero() {
            vec![]
        } else {
            coins(item.value.u128(), denom)
        };

        if item.data.is_empty() {
            if funds.is_empty() {
                return None;
            }
            return Some(
                BankMsg::Send {
                    to_address: item.target.clone(),
                    amount: funds,
                }
                .into(),
            );
        }

        Some(
            WasmMsg::Execute {
                contract_addr: item.target.clone(),
                msg: item.data.clone(),
                funds,
            }
            .into(),
        )
    }

    /// Signer management. The call arrives from the account itself, so the
    /// authorizing signer is recovered from `action_signature` instead of the
    /// message sender.
    pub fn signer_action(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        action: SignerAction,
        signer: String,
        signed_hash: Binary,
        action_signature: Binary,
    ) -> Result<Response, ContractError> {
        ensure!(
            info.sender == env.contract.address,
            UnauthorizedReason::NotSelfDelegated
        );

        let subject = parse_signer(&signer)?;
        ensure!(
            signed_hash.as_slice() == action_hash(&subject).as_slice(),
            ContractError::ActionHashMismatch
        );

        let actor = recover_signer(deps.api, &signed_hash, &action_signature)?;
        let actor_role = role_of(deps.storage, &actor)?;
        ensure!(
            is_permitted(action, actor_role),
            UnauthorizedReason::InsufficientRole {
                signer: actor.to_string(),
                role: actor_role,
                action: action.as_str().to_string(),
            }
        );

        if let Some(expected) = action.required_subject_role() {
            let actual = role_of(deps.storage, &subject)?;
            ensure!(
                actual == expected,
                ContractError::SignerRoleMismatch {
                    signer: subject.to_string(),
                    expected,
                    actual,
                }
            );
        }

        let previous = set_role(deps.storage, &subject, action.resulting_role())?;

        Ok(Response::new()
            .add_attribute("method", action.as_str())
            .add_attribute("signer", subject.to_string())
            .add_attribute("previous_role", previous.to_string())
            .add_attribute("authorized_by", actor.to_string()))
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::RoleOf { address } => {
            let signer = parse_query_signer(&address)?;
            to_json_binary(&role_of(deps.storage, &signer)?)
        }
        QueryMsg::Nonce {} => to_json_binary(&NONCE.load(deps.storage)?),
        QueryMsg::Config {} => to_json_binary(&ConfigResponse {
            denom: DENOM.load(deps.storage)?,
            initialized: OWNER_COUNT.exists(deps.storage),
        }),
        QueryMsg::ListSigners { start_after, limit } => {
            let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT) as usize;
            let start_after = start_after
                .map(|address| parse_query_signer(&address))
                .transpose()?;
            let min = start_after
                .as_ref()
                .map(|signer| Bound::exclusive(signer.as_slice()));

            let signers = SIGNERS
                .range(deps.storage, min, None, Order::Ascending)
                .take(limit)
                .map(|entry| -> StdResult<SignerInfo> {
                    let (key, role) = entry?;
                    let signer = SignerAddr::from_slice(&key)
                        .map_err(|e| StdError::generic_err(e.to_string()))?;
                    Ok(SignerInfo {
                        address: signer.to_string(),
                        role,
                    })
                })
                .collect::<StdResult<Vec<_>>>()?;
            to_json_binary(&signers)
        }
        QueryMsg::RecoverSigner { hash, signature } => {
            let signer = recover_signer(deps.api, &hash, &signature)
                .map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&signer.to_string())
        }
    }
}

fn parse_query_signer(address: &str) -> StdResult<SignerAddr> {
    address
        .parse()
        .map_err(|e: counterfact_account_utils::error::SignatureError| {
            StdError::generic_err(e.to_string())
        })
}

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    instantiate2_address, to_json_binary, Addr, Binary, CodeInfoResponse, Deps, DepsMut, Env,
    MessageInfo, Response, StdError, StdResult,
};
use counterfact_account_utils::{signature::account_salt, signer::SignerAddr};
use cw2::set_contract_version;

use crate::{
    error::ContractError,
    msg::{ExecuteMsg, InstantiateMsg, QueryMsg},
    state::{Config, CONFIG, DEPLOYED_FOR},
};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = msg.owner.unwrap_or_else(|| info.sender.to_string());
    cw_ownable::initialize_owner(deps.storage, deps.api, Some(&owner))?;

    if msg.denom.is_empty() {
        return Err(StdError::generic_err("denom must not be empty").into());
    }
    // Fails early on an unknown template
    deps.querier.query_wasm_code_info(msg.account_code_id)?;

    CONFIG.save(
        deps.storage,
        &Config {
            account_code_id: msg.account_code_id,
            denom: msg.denom.clone(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", owner)
        .add_attribute("account_code_id", msg.account_code_id.to_string())
        .add_attribute("denom", msg.denom))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Relay {
            target,
            signature,
            payload,
        } => execute::relay(deps, env, info, target, signature, payload),
        ExecuteMsg::Withdraw { recipient, amount } => {
            execute::withdraw(deps, env, info, recipient, amount)
        }
        ExecuteMsg::UpdateOwnership(action) => {
            let ownership = cw_ownable::update_ownership(deps, &env.block, &info.sender, action)?;
            Ok(Response::new().add_attributes(ownership.into_attributes()))
        }
    }
}

mod execute {
    use cosmwasm_std::{
        coins, ensure, to_json_binary, BankMsg, Binary, DepsMut, Env, Event, MessageInfo,
        Response, Uint128, WasmMsg,
    };
    use counterfact_account_utils::{
        msg::InstantiateMsg as AccountInstantiateMsg,
        signature::{account_salt, recover_signer, target_hash},
    };

    use crate::{
        error::ContractError,
        state::{CONFIG, DEPLOYED_FOR},
    };

    pub fn relay(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        target: String,
        signature: Binary,
        payload: Binary,
    ) -> Result<Response, ContractError> {
        let target = deps.api.addr_validate(&target)?;
        let user = recover_signer(deps.api, &target_hash(target.as_str()), &signature)?;

        let account = super::address_for(deps.as_ref(), &env, &user)?;
        let mut response = Response::new()
            .add_attribute("method", "relay")
            .add_attribute("user", user.to_string())
            .add_attribute("account", account.as_str())
            .add_attribute("target", target.as_str());

        // Deploy on first use; the forward below runs after the account exists
        if !DEPLOYED_FOR.has(deps.storage, user.as_slice()) {
            let config = CONFIG.load(deps.storage)?;
            response = response
                .add_message(WasmMsg::Instantiate2 {
                    admin: None,
                    code_id: config.account_code_id,
                    label: format!("smart-account-{user}"),
                    msg: to_json_binary(&AccountInstantiateMsg {
                        denom: config.denom,
                        owner: Some(user.to_string()),
                    })?,
                    funds: vec![],
                    salt: Binary::from(account_salt(&user).to_vec()),
                })
                .add_attribute("deployed", "true");
            DEPLOYED_FOR.save(deps.storage, user.as_slice(), &account)?;
        }

        Ok(response.add_message(WasmMsg::Execute {
            contract_addr: target.to_string(),
            msg: payload,
            funds: info.funds,
        }))
    }

    pub fn withdraw(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        recipient: String,
        amount: Uint128,
    ) -> Result<Response, ContractError> {
        cw_ownable::assert_owner(deps.storage, &info.sender)?;
        cw_utils::nonpayable(&info)?;
        ensure!(!amount.is_zero(), ContractError::ZeroAmount);

        let recipient = deps.api.addr_validate(&recipient)?;
        let denom = CONFIG.load(deps.storage)?.denom;
        let available = deps
            .querier
            .query_balance(&env.contract.address, &denom)?
            .amount;
        ensure!(
            amount <= available,
            ContractError::InsufficientRefunds {
                requested: amount,
                available,
            }
        );

        Ok(Response::new()
            .add_attribute("method", "withdraw")
            .add_message(BankMsg::Send {
                to_address: recipient.to_string(),
                amount: coins(amount.u128(), &denom),
            })
            .add_event(
                Event::new("withdraw")
                    .add_attribute("recipient", recipient)
                    .add_attribute("amount", amount)
                    .add_attribute("denom", denom),
            ))
    }
}

/// Instantiate2 address of `user`'s account under this relayer. Does not
/// depend on whether the account was deployed yet.
pub fn address_for(deps: Deps, env: &Env, user: &SignerAddr) -> Result<Addr, ContractError> {
    let account_code_id = CONFIG.load(deps.storage)?.account_code_id;
    let CodeInfoResponse { checksum, .. } = deps.querier.query_wasm_code_info(account_code_id)?;
    let creator = deps.api.addr_canonicalize(env.contract.address.as_str())?;

    let canonical = instantiate2_address(checksum.as_slice(), &creator, &account_salt(user))?;
    Ok(deps.api.addr_humanize(&canonical)?)
}

fn parse_user(user: &str) -> Result<SignerAddr, ContractError> {
    user.parse()
        .map_err(|_| ContractError::InvalidUserAddr(user.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::AddressFor { user } => {
            let account = parse_user(&user)
                .and_then(|user| address_for(deps, &env, &user))
                .map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&account)
        }
        QueryMsg::Config {} => to_json_binary(&CONFIG.load(deps.storage)?),
        QueryMsg::DeployedFor { user } => {
            let user = parse_user(&user).map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&DEPLOYED_FOR.may_load(deps.storage, user.as_slice())?)
        }
        QueryMsg::Refunds {} => {
            let denom = CONFIG.load(deps.storage)?.denom;
            to_json_binary(&deps.querier.query_balance(&env.contract.address, denom)?)
        }
        QueryMsg::Ownership {} => to_json_binary(&cw_ownable::get_ownership(deps.storage)?),
    }
}

#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError, StdResult,
    Uint128,
};
use cw2::set_contract_version;
use thiserror::Error;

use crate::{
    msg::{ExecuteMsg, InstantiateMsg, PurchaseResponse, QueryMsg},
    state::PURCHASES,
};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Mock target asked to fail")]
    Forced {},
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    _msg: InstantiateMsg,
) -> StdResult<Response> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("method", "instantiate"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Buy { item } => {
            let paid: Uint128 = info.funds.iter().map(|c| c.amount).sum();
            PURCHASES.save(deps.storage, item.clone(), &(info.sender.clone(), paid))?;

            Ok(Response::new()
                .add_attribute("method", "buy")
                .add_attribute("item", item)
                .add_attribute("buyer", info.sender)
                .add_attribute("paid", paid))
        }
        ExecuteMsg::Fail {} => Err(ContractError::Forced {}),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Bought { item } => to_json_binary(&PURCHASES.has(deps.storage, item)),
        QueryMsg::Purchase { item } => {
            let purchase = PURCHASES
                .may_load(deps.storage, item)?
                .map(|(buyer, paid)| PurchaseResponse {
                    buyer: buyer.to_string(),
                    paid,
                });
            to_json_binary(&purchase)
        }
    }
}

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

#[cw_serde]
pub struct Config {
    // Code id of the smart account template
    pub account_code_id: u64,
    // Denom the relayer is refunded in
    pub denom: String,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Accounts created so far, keyed by the 20-byte user address.
pub const DEPLOYED_FOR: Map<&[u8], Addr> = Map::new("deployed_for");

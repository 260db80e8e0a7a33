use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::Map;

// item -> buyer and amount paid
pub const PURCHASES: Map<String, (Addr, Uint128)> = Map::new("purchases");

use counterfact_account_utils::signer::SignerRole;
use cw_storage_plus::{Item, Map};

// Signer address bytes -> role. Only guardians and owners are stored.
pub const SIGNERS: Map<&[u8], SignerRole> = Map::new("signers");

// Number of owners. Present once the account is initialized.
pub const OWNER_COUNT: Item<u32> = Item::new("owner_count");

// Consumed once per successful batch
pub const NONCE: Item<u64> = Item::new("nonce");

pub const DENOM: Item<String> = Item::new("denom");

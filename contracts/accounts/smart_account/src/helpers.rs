use cosmwasm_std::{ensure, StdResult, Storage};
use counterfact_account_utils::signer::{SignerAddr, SignerRole};

use crate::{
    state::{OWNER_COUNT, SIGNERS},
    ContractError,
};

pub fn parse_signer(signer: &str) -> Result<SignerAddr, ContractError> {
    signer
        .parse()
        .map_err(|_| ContractError::InvalidSignerAddr(signer.to_string()))
}

pub fn role_of(storage: &dyn Storage, signer: &SignerAddr) -> StdResult<SignerRole> {
    Ok(SIGNERS
        .may_load(storage, signer.as_slice())?
        .unwrap_or_default())
}

pub fn ensure_initialized(storage: &dyn Storage) -> Result<(), ContractError> {
    ensure!(OWNER_COUNT.exists(storage), ContractError::NotInitialized);
    Ok(())
}

/// Seeds the first owner. Fails once any owner was ever seeded.
pub fn seed_owner(storage: &mut dyn Storage, owner: &str) -> Result<SignerAddr, ContractError> {
    ensure!(
        !OWNER_COUNT.exists(storage),
        ContractError::AlreadyInitialized
    );

    let owner = parse_signer(owner)?;
    SIGNERS.save(storage, owner.as_slice(), &SignerRole::Owner)?;
    OWNER_COUNT.save(storage, &1)?;
    Ok(owner)
}

/// Moves `signer` to `role`, keeping the owner count in sync. Returns the
/// previous role.
pub fn set_role(
    storage: &mut dyn Storage,
    signer: &SignerAddr,
    role: SignerRole,
) -> Result<SignerRole, ContractError> {
    let previous = role_of(storage, signer)?;
    if previous == role {
        return Ok(previous);
    }

    let mut owners = OWNER_COUNT.load(storage)?;
    if previous == SignerRole::Owner {
        owners = owners.saturating_sub(1);
        ensure!(owners > 0, ContractError::LastOwner);
    }
    if role == SignerRole::Owner {
        owners += 1;
    }
    OWNER_COUNT.save(storage, &owners)?;

    match role {
        SignerRole::None => SIGNERS.remove(storage, signer.as_slice()),
        role => SIGNERS.save(storage, signer.as_slice(), &role)?,
    }

    Ok(previous)
}

use cosmwasm_schema::cw_serde;

use crate::signer::SignerRole;

/// Administrative actions an account performs on its own signer set.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum SignerAction {
    AddOwner,
    RemoveOwner,
    AddGuardian,
    RemoveGuardian,
}

impl SignerAction {
    /// Role the subject holds after the action is applied.
    pub fn resulting_role(&self) -> SignerRole {
        match self {
            SignerAction::AddOwner => SignerRole::Owner,
            SignerAction::AddGuardian => SignerRole::Guardian,
            SignerAction::RemoveOwner | SignerAction::RemoveGuardian => SignerRole::None,
        }
    }

    /// Role the subject must currently hold, for removals.
    pub fn required_subject_role(&self) -> Option<SignerRole> {
        match self {
            SignerAction::RemoveOwner => Some(SignerRole::Owner),
            SignerAction::RemoveGuardian => Some(SignerRole::Guardian),
            SignerAction::AddOwner | SignerAction::AddGuardian => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignerAction::AddOwner => "add_owner",
            SignerAction::RemoveOwner => "remove_owner",
            SignerAction::AddGuardian => "add_guardian",
            SignerAction::RemoveGuardian => "remove_guardian",
        }
    }
}

/// Guardians may promote and demote owners (social recovery) but only owners
/// manage the guardian set.
pub fn is_permitted(action: SignerAction, actor: SignerRole) -> bool {
    match (action, actor) {
        (_, SignerRole::None) => false,
        (SignerAction::AddOwner | SignerAction::RemoveOwner, _) => true,
        (SignerAction::AddGuardian | SignerAction::RemoveGuardian, role) => {
            role == SignerRole::Owner
        }
    }
}

//! # Role-Based Access Control
//!
//! Every principal carries a set of [`Role`]s, stored as a bit set under
//! `DataKey::Roles(address)`. A principal may hold any combination of roles.
//!
//! | Role             | Gates                                                  |
//! |------------------|--------------------------------------------------------|
//! | `Verifier`       | verify/reject contributions, complete bond milestones  |
//! | `ReasoningAgent` | agent awards                                           |
//! | `Governance`     | parameters, vesting, protocol-level role management    |
//! | `Minter`         | direct mints                                           |
//! | `Burner`         | burns                                                  |
//! | `Administrator`  | all role management, identity activation               |
//!
//! Gated entry points call [`require_role`] before touching any other state,
//! so a rejected caller learns nothing about the rest of the ledger and
//! leaves no trace.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::storage;
use crate::Error;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Verifier = 0,
    ReasoningAgent = 1,
    Governance = 2,
    Minter = 3,
    Burner = 4,
    Administrator = 5,
}

const ALL_ROLES: [Role; 6] = [
    Role::Verifier,
    Role::ReasoningAgent,
    Role::Governance,
    Role::Minter,
    Role::Burner,
    Role::Administrator,
];

impl Role {
    fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Roles that Governance may hand out and take back on its own.
    fn is_protocol_level(self) -> bool {
        matches!(self, Role::Minter | Role::Burner | Role::ReasoningAgent)
    }
}

pub fn has_role(env: &Env, principal: &Address, role: Role) -> bool {
    storage::role_bits(env, principal) & role.bit() != 0
}

pub fn roles_of(env: &Env, principal: &Address) -> Vec<Role> {
    let bits = storage::role_bits(env, principal);
    let mut roles = Vec::new(env);
    for role in ALL_ROLES {
        if bits & role.bit() != 0 {
            roles.push_back(role);
        }
    }
    roles
}

/// Fail with `UnauthorizedCaller` unless `caller` holds `role`.
pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    if has_role(env, caller, role) {
        Ok(())
    } else {
        Err(Error::UnauthorizedCaller)
    }
}

/// Fail unless `caller` may manage `role`.
fn require_can_manage(env: &Env, caller: &Address, role: Role) -> Result<(), Error> {
    if has_role(env, caller, Role::Administrator) {
        return Ok(());
    }
    if role.is_protocol_level() && has_role(env, caller, Role::Governance) {
        return Ok(());
    }
    Err(Error::UnauthorizedCaller)
}

/// Grant `Administrator` to the bootstrap principal.
pub fn init_admin(env: &Env, admin: &Address) {
    set_role(env, admin, Role::Administrator, true);
}

/// Grant `role` to `target`. Returns `false` if `target` already held it.
pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<bool, Error> {
    require_can_manage(env, caller, role)?;
    Ok(set_role(env, target, role, true))
}

/// Revoke `role` from `target`. Returns `false` if `target` did not hold it.
///
/// The last remaining Administrator cannot be removed.
pub fn revoke_role(env: &Env, caller: &Address, target: &Address, role: Role) -> Result<bool, Error> {
    require_can_manage(env, caller, role)?;
    if role == Role::Administrator
        && has_role(env, target, Role::Administrator)
        && storage::admin_count(env) <= 1
    {
        return Err(Error::LastAdministrator);
    }
    Ok(set_role(env, target, role, false))
}

fn set_role(env: &Env, target: &Address, role: Role, granted: bool) -> bool {
    let bits = storage::role_bits(env, target);
    let held = bits & role.bit() != 0;
    if held == granted {
        return false;
    }

    let bits = if granted {
        bits | role.bit()
    } else {
        bits & !role.bit()
    };
    storage::set_role_bits(env, target, bits);

    if role == Role::Administrator {
        let admins = storage::admin_count(env);
        storage::set_admin_count(env, if granted { admins + 1 } else { admins - 1 });
    }
    true
}

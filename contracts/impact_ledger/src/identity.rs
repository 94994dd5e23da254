//! Identity registry: one identity per owner, username and DID.

use soroban_sdk::{Address, Env, String};

use crate::storage::{self, DataKey};
use crate::types::Identity;
use crate::validation::validate_reference;
use crate::Error;

/// Create, index and persist a new active identity.
///
/// Shape checks run before uniqueness checks; nothing is written unless all
/// of them pass.
pub fn create(
    env: &Env,
    owner: &Address,
    username: String,
    did: String,
    metadata_ref: String,
) -> Result<Identity, Error> {
    if username.len() == 0 {
        return Err(Error::EmptyUsername);
    }
    if did.len() == 0 {
        return Err(Error::EmptyDid);
    }
    validate_reference(&metadata_ref)?;

    if storage::identity_by_username(env, &username).is_some() {
        return Err(Error::DuplicateUsername);
    }
    if storage::identity_by_did(env, &did).is_some() {
        return Err(Error::DuplicateDid);
    }
    if storage::identity_by_owner(env, owner).is_some() {
        return Err(Error::DuplicateOwner);
    }

    let now = env.ledger().timestamp();
    let identity = Identity {
        id: storage::next_id(env, DataKey::IdentityCount),
        owner: owner.clone(),
        username,
        did,
        metadata_ref,
        reputation_score: 0,
        token_balance: storage::balance(env, owner),
        active: true,
        created_at: now,
        last_activity: now,
    };

    storage::save_identity(env, &identity);
    storage::index_identity(env, &identity);
    Ok(identity)
}

pub fn get(env: &Env, id: u64) -> Result<Identity, Error> {
    storage::load_identity(env, id).ok_or(Error::NotFound)
}

pub fn get_by_username(env: &Env, username: &String) -> Result<Identity, Error> {
    let id = storage::identity_by_username(env, username).ok_or(Error::NotFound)?;
    get(env, id)
}

pub fn get_by_did(env: &Env, did: &String) -> Result<Identity, Error> {
    let id = storage::identity_by_did(env, did).ok_or(Error::NotFound)?;
    get(env, id)
}

pub fn get_by_owner(env: &Env, owner: &Address) -> Result<Identity, Error> {
    let id = storage::identity_by_owner(env, owner).ok_or(Error::NotFound)?;
    get(env, id)
}

/// Resolve the identity a caller acts through.
///
/// Fails with `NoIdentity` rather than `NotFound`: the caller has not
/// registered, as opposed to asking about someone else's record.
pub fn require_owned(env: &Env, owner: &Address) -> Result<Identity, Error> {
    get_by_owner(env, owner).map_err(|_| Error::NoIdentity)
}

/// Like [`require_owned`], additionally requiring the identity to be active.
pub fn require_active_owned(env: &Env, owner: &Address) -> Result<Identity, Error> {
    let identity = require_owned(env, owner)?;
    if !identity.active {
        return Err(Error::InactiveIdentity);
    }
    Ok(identity)
}

pub fn update_metadata(env: &Env, owner: &Address, metadata_ref: String) -> Result<Identity, Error> {
    let mut identity = require_owned(env, owner)?;
    validate_reference(&metadata_ref)?;
    identity.metadata_ref = metadata_ref;
    identity.last_activity = env.ledger().timestamp();
    storage::save_identity(env, &identity);
    Ok(identity)
}

pub fn set_active(env: &Env, id: u64, active: bool) -> Result<Identity, Error> {
    let mut identity = get(env, id)?;
    identity.active = active;
    storage::save_identity(env, &identity);
    Ok(identity)
}

/// Refresh `last_activity`. Internal only.
pub fn touch_activity(env: &Env, id: u64) -> Result<(), Error> {
    let mut identity = get(env, id)?;
    identity.last_activity = env.ledger().timestamp();
    storage::save_identity(env, &identity);
    Ok(())
}

/// Reputation after an award of `tokens`, checked against overflow.
pub fn reputation_after_award(
    identity: &Identity,
    tokens: i128,
    reputation_per_token: i128,
) -> Result<(u64, u64), Error> {
    let gained = u64::try_from(tokens / reputation_per_token).map_err(|_| Error::Overflow)?;
    let score = identity
        .reputation_score
        .checked_add(gained)
        .ok_or(Error::Overflow)?;
    Ok((gained, score))
}

/// Store a new reputation score and touch activity. Reloads the record so
/// that a balance mirror written earlier in the same invocation survives.
pub fn record_award(env: &Env, id: u64, reputation_score: u64) -> Result<Identity, Error> {
    let mut identity = get(env, id)?;
    identity.reputation_score = reputation_score;
    identity.last_activity = env.ledger().timestamp();
    storage::save_identity(env, &identity);
    Ok(identity)
}

/// Keep the identity's `token_balance` mirror in step with the ledger.
/// Principals without an identity are ignored.
pub fn mirror_balance(env: &Env, owner: &Address, balance: i128) {
    if let Some(id) = storage::identity_by_owner(env, owner) {
        if let Some(mut identity) = storage::load_identity(env, id) {
            identity.token_balance = balance;
            storage::save_identity(env, &identity);
        }
    }
}

//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the ledger:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key                 | Type     | Description                         |
//! |---------------------|----------|-------------------------------------|
//! | `Params`            | `Params` | Governance configuration            |
//! | `TotalSupply`       | `i128`   | Tokens in circulation               |
//! | `AdminCount`        | `u32`    | Principals holding `Administrator`  |
//! | `IdentityCount`     | `u64`    | Auto-increment identity ID counter  |
//! | `ContributionCount` | `u64`    | Auto-increment contribution counter |
//! | `DistributionCount` | `u64`    | Auto-increment distribution counter |
//! | `BondCount`         | `u64`    | Auto-increment bond counter         |
//! | `EventCount`        | `u64`    | Next event log sequence number      |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! Records (`Identity`, `Contribution`, `Distribution`, indexed `Vesting`
//! schedules, bond entries, log entries), the uniqueness indexes (`Username`, `Did`, `Owner`),
//! balances and role sets.
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, IntoVal, String, TryFromVal, Val};

use crate::types::{
    BondConfig, BondState, Contribution, Distribution, Identity, Params, VestingSchedule,
};
use crate::events::LogEntry;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Governance parameters; presence marks the contract initialised (Instance).
    Params,
    /// Circulating supply (Instance).
    TotalSupply,
    /// Number of Administrators (Instance).
    AdminCount,
    IdentityCount,
    ContributionCount,
    DistributionCount,
    BondCount,
    EventCount,
    /// Role bit set of a principal (Persistent).
    Roles(Address),
    /// Token balance of a principal (Persistent).
    Balance(Address),
    Identity(u64),
    /// username → identity id
    Username(String),
    /// did → identity id
    Did(String),
    /// owner → identity id
    Owner(Address),
    Contribution(u64),
    Distribution(u64),
    /// Number of schedules ever created for a beneficiary.
    VestingCount(Address),
    /// One vesting schedule, keyed by beneficiary and creation index.
    Vesting(Address, u32),
    BondConfig(u64),
    BondState(u64),
    /// Cumulative amount invested by one investor in one bond.
    Investment(u64, Address),
    /// Event log entry keyed by sequence number.
    Event(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Atomically reads, increments, and stores the counter under `key`.
/// Returns the ID to use for the *current* record (pre-increment value).
pub fn next_id(env: &Env, key: DataKey) -> u64 {
    bump_instance(env);
    let current: u64 = env.storage().instance().get(&key).unwrap_or(0);
    env.storage().instance().set(&key, &(current + 1));
    current
}

/// Read a counter without advancing it.
pub fn count(env: &Env, key: DataKey) -> u64 {
    env.storage().instance().get(&key).unwrap_or(0)
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Params)
}

/// Load the governance parameters.
/// Fails with `NotInitialized` before `init`.
pub fn load_params(env: &Env) -> Result<Params, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Params)
        .ok_or(Error::NotInitialized)
}

pub fn save_params(env: &Env, params: &Params) {
    env.storage().instance().set(&DataKey::Params, params);
    bump_instance(env);
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn set_total_supply(env: &Env, supply: i128) {
    env.storage().instance().set(&DataKey::TotalSupply, &supply);
}

pub fn admin_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::AdminCount)
        .unwrap_or(0)
}

pub fn set_admin_count(env: &Env, count: u32) {
    env.storage().instance().set(&DataKey::AdminCount, &count);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read<V: TryFromVal<Env, Val>>(env: &Env, key: &DataKey) -> Option<V> {
    let value: Option<V> = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn write<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

// Roles and balances

pub fn role_bits(env: &Env, principal: &Address) -> u32 {
    read(env, &DataKey::Roles(principal.clone())).unwrap_or(0)
}

pub fn set_role_bits(env: &Env, principal: &Address, bits: u32) {
    write(env, &DataKey::Roles(principal.clone()), &bits);
}

pub fn balance(env: &Env, principal: &Address) -> i128 {
    read(env, &DataKey::Balance(principal.clone())).unwrap_or(0)
}

pub fn set_balance(env: &Env, principal: &Address, amount: i128) {
    write(env, &DataKey::Balance(principal.clone()), &amount);
}

// Identities and their uniqueness indexes

pub fn load_identity(env: &Env, id: u64) -> Option<Identity> {
    read(env, &DataKey::Identity(id))
}

pub fn save_identity(env: &Env, identity: &Identity) {
    write(env, &DataKey::Identity(identity.id), identity);
}

pub fn identity_by_username(env: &Env, username: &String) -> Option<u64> {
    read(env, &DataKey::Username(username.clone()))
}

pub fn identity_by_did(env: &Env, did: &String) -> Option<u64> {
    read(env, &DataKey::Did(did.clone()))
}

pub fn identity_by_owner(env: &Env, owner: &Address) -> Option<u64> {
    read(env, &DataKey::Owner(owner.clone()))
}

/// Write all three uniqueness indexes for a freshly created identity.
pub fn index_identity(env: &Env, identity: &Identity) {
    write(env, &DataKey::Username(identity.username.clone()), &identity.id);
    write(env, &DataKey::Did(identity.did.clone()), &identity.id);
    write(env, &DataKey::Owner(identity.owner.clone()), &identity.id);
}

// Contributions and distributions

pub fn load_contribution(env: &Env, id: u64) -> Option<Contribution> {
    read(env, &DataKey::Contribution(id))
}

pub fn save_contribution(env: &Env, contribution: &Contribution) {
    write(env, &DataKey::Contribution(contribution.id), contribution);
}

pub fn load_distribution(env: &Env, id: u64) -> Option<Distribution> {
    read(env, &DataKey::Distribution(id))
}

pub fn save_distribution(env: &Env, distribution: &Distribution) {
    write(env, &DataKey::Distribution(distribution.id), distribution);
}

// Vesting

// Schedules are never overwritten by a newer grant: each one keeps its own
// index, and only the latest can be active.

pub fn vesting_count(env: &Env, beneficiary: &Address) -> u32 {
    read(env, &DataKey::VestingCount(beneficiary.clone())).unwrap_or(0)
}

pub fn load_vesting_at(env: &Env, beneficiary: &Address, index: u32) -> Option<VestingSchedule> {
    read(env, &DataKey::Vesting(beneficiary.clone(), index))
}

/// The most recently created schedule for `beneficiary`.
pub fn load_vesting(env: &Env, beneficiary: &Address) -> Option<VestingSchedule> {
    let latest = vesting_count(env, beneficiary).checked_sub(1)?;
    load_vesting_at(env, beneficiary, latest)
}

/// Append a new schedule. Returns its index.
pub fn push_vesting(env: &Env, schedule: &VestingSchedule) -> u32 {
    let index = vesting_count(env, &schedule.beneficiary);
    write(env, &DataKey::Vesting(schedule.beneficiary.clone(), index), schedule);
    write(env, &DataKey::VestingCount(schedule.beneficiary.clone()), &(index + 1));
    index
}

/// Overwrite the latest schedule in place.
pub fn save_vesting(env: &Env, schedule: &VestingSchedule) {
    let latest = vesting_count(env, &schedule.beneficiary).saturating_sub(1);
    write(env, &DataKey::Vesting(schedule.beneficiary.clone(), latest), schedule);
}

// Bonds

/// Save both the immutable config and initial mutable state for a new bond.
pub fn save_bond(env: &Env, config: &BondConfig, state: &BondState) {
    write(env, &DataKey::BondConfig(config.id), config);
    save_bond_state(env, config.id, state);
}

/// Load config and state together; `None` when the bond does not exist.
pub fn load_bond_pair(env: &Env, id: u64) -> Option<(BondConfig, BondState)> {
    let config: BondConfig = read(env, &DataKey::BondConfig(id))?;
    let state: BondState = read(env, &DataKey::BondState(id))?;
    Some((config, state))
}

/// Save only the mutable bond state.
pub fn save_bond_state(env: &Env, id: u64, state: &BondState) {
    write(env, &DataKey::BondState(id), state);
}

pub fn investment(env: &Env, bond_id: u64, investor: &Address) -> i128 {
    read(env, &DataKey::Investment(bond_id, investor.clone())).unwrap_or(0)
}

pub fn set_investment(env: &Env, bond_id: u64, investor: &Address, amount: i128) {
    write(env, &DataKey::Investment(bond_id, investor.clone()), &amount);
}

// Event log

pub fn load_event(env: &Env, seq: u64) -> Option<LogEntry> {
    read(env, &DataKey::Event(seq))
}

pub fn save_event(env: &Env, entry: &LogEntry) {
    write(env, &DataKey::Event(entry.seq), entry);
}

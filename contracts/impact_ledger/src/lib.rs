//! # Impact Ledger Contract
//!
//! A single Soroban contract, `ImpactLedger`, that keeps identities, verified
//! contributions, a capped token supply with vesting, and impact bonds.
//! Every mutation is role-gated and recorded in an append-only event log.
//!
//! | Phase          | Entry Point(s)                                                  |
//! |----------------|-----------------------------------------------------------------|
//! | Bootstrap      | [`ImpactLedger::init`]                                          |
//! | Role admin     | `grant_role`, `revoke_role`, `has_role`, `roles_of`             |
//! | Identities     | `create_identity`, `update_identity_metadata`, `set_identity_active`, lookups |
//! | Contributions  | `submit_contribution`, `verify_contribution`, `reject_contribution`, `execute_agent_award` |
//! | Tokens         | `mint`, `burn`, `balance`, `total_supply`                       |
//! | Vesting        | `create_vesting_schedule`, `claim_vested`, `revoke_vesting_schedule` |
//! | Governance     | `update_parameter`, `params`                                    |
//! | Impact bonds   | `create_bond`, `invest`, `complete_milestone`, `close_bond`     |
//! | Event log      | `event_count`, `events_since`                                   |
//!
//! ## Architecture
//!
//! Authorization is delegated to [`rbac`], storage access to `storage`, and
//! each ledger lives in its own module. Entry points authenticate the caller,
//! check the caller's role before reading anything else, and delegate.
//!
//! ## Atomicity
//!
//! Each entry point validates every precondition before its first write.
//! On top of that, the Soroban host discards all writes of an invocation
//! that returns an `Err`, so no failed call leaves partial state behind.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Symbol, Vec};

mod bond;
mod contribution;
pub mod events;
mod identity;
pub mod rbac;
mod storage;
mod token;
mod types;
mod validation;

#[cfg(test)]
mod test_token;

use bond::NewBond;
use contribution::AgentAward;
use token::MintRequest;

pub use events::{EventBody, LogEntry};
pub use rbac::Role;
pub use types::{
    Contribution, ContributionStatus, Distribution, Identity, ImpactBond, Milestone, Params,
    VestingSchedule,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    UnauthorizedCaller = 3,
    DuplicateUsername = 4,
    DuplicateDid = 5,
    DuplicateOwner = 6,
    EmptyDid = 7,
    EmptyUsername = 8,
    InvalidReference = 9,
    NotFound = 10,
    NoIdentity = 11,
    InactiveIdentity = 12,
    AlreadyVerified = 13,
    AlreadyRejected = 14,
    ConfidenceOutOfRange = 15,
    ConfidenceBelowThreshold = 16,
    ConfidenceBelowMinimum = 17,
    ZeroAmount = 18,
    InvalidAmount = 19,
    InvalidRecipient = 20,
    AmountExceedsPerTxCap = 21,
    SupplyExceeded = 22,
    InsufficientBalance = 23,
    InvalidBeneficiary = 24,
    ZeroDuration = 25,
    ScheduleAlreadyActive = 26,
    NoActiveSchedule = 27,
    VestingNotStarted = 28,
    NothingClaimable = 29,
    UnknownParameter = 30,
    InvalidParameterValue = 31,
    MaturityInPast = 32,
    BondInactive = 33,
    BondMatured = 34,
    MilestoneAlreadyComplete = 35,
    MilestoneNotFound = 36,
    InvalidMilestones = 37,
    OperationBudgetExceeded = 38,
    LastAdministrator = 39,
    Overflow = 40,
}

#[contract]
pub struct ImpactLedger;

#[contractimpl]
impl ImpactLedger {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract with its first Administrator and parameters.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls fail with `Error::AlreadyInitialized`.
    pub fn init(env: Env, admin: Address, params: Params) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        token::validate_params(&params)?;

        storage::save_params(&env, &params);
        storage::set_total_supply(&env, 0);
        rbac::init_admin(&env, &admin);
        events::emit_role_granted(&env, Role::Administrator, &admin, &admin);
        Ok(())
    }

    pub fn params(env: Env) -> Result<Params, Error> {
        storage::load_params(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant `role` to `target`.
    ///
    /// - Administrators may grant any role.
    /// - Governance may grant `Minter`, `Burner` and `ReasoningAgent`.
    pub fn grant_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        caller.require_auth();
        if rbac::grant_role(&env, &caller, &target, role)? {
            events::emit_role_granted(&env, role, &target, &caller);
        }
        Ok(())
    }

    /// Revoke `role` from `target`. Same permissions as `grant_role`.
    ///
    /// The last Administrator cannot be revoked.
    pub fn revoke_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        caller.require_auth();
        if rbac::revoke_role(&env, &caller, &target, role)? {
            events::emit_role_revoked(&env, role, &target, &caller);
        }
        Ok(())
    }

    pub fn has_role(env: Env, principal: Address, role: Role) -> bool {
        rbac::has_role(&env, &principal, role)
    }

    pub fn roles_of(env: Env, principal: Address) -> Vec<Role> {
        rbac::roles_of(&env, &principal)
    }

    // ─────────────────────────────────────────────────────────
    // Identity registry
    // ─────────────────────────────────────────────────────────

    /// Register the caller's identity.
    ///
    /// `username`, `did` and `owner` must each be unused; `metadata_ref` must
    /// be a well-formed reference.
    pub fn create_identity(
        env: Env,
        owner: Address,
        username: String,
        did: String,
        metadata_ref: String,
    ) -> Result<Identity, Error> {
        owner.require_auth();
        storage::load_params(&env)?;
        let identity = identity::create(&env, &owner, username, did, metadata_ref)?;
        events::emit_identity_created(&env, &identity);
        Ok(identity)
    }

    pub fn update_identity_metadata(
        env: Env,
        owner: Address,
        metadata_ref: String,
    ) -> Result<Identity, Error> {
        owner.require_auth();
        let identity = identity::update_metadata(&env, &owner, metadata_ref)?;
        events::emit_identity_updated(&env, &identity);
        Ok(identity)
    }

    /// Activate or deactivate an identity. Administrator only.
    pub fn set_identity_active(
        env: Env,
        caller: Address,
        identity_id: u64,
        active: bool,
    ) -> Result<Identity, Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Administrator)?;
        let identity = identity::set_active(&env, identity_id, active)?;
        events::emit_identity_status_changed(&env, identity.id, active);
        Ok(identity)
    }

    pub fn get_identity(env: Env, id: u64) -> Result<Identity, Error> {
        identity::get(&env, id)
    }

    pub fn get_by_username(env: Env, username: String) -> Result<Identity, Error> {
        identity::get_by_username(&env, &username)
    }

    pub fn get_by_did(env: Env, did: String) -> Result<Identity, Error> {
        identity::get_by_did(&env, &did)
    }

    pub fn get_by_owner(env: Env, owner: Address) -> Result<Identity, Error> {
        identity::get_by_owner(&env, &owner)
    }

    pub fn identity_count(env: Env) -> u64 {
        storage::count(&env, storage::DataKey::IdentityCount)
    }

    // ─────────────────────────────────────────────────────────
    // Contributions
    // ─────────────────────────────────────────────────────────

    /// Submit a contribution on behalf of the caller's active identity.
    /// Returns the new contribution id.
    pub fn submit_contribution(
        env: Env,
        owner: Address,
        category: String,
        description: String,
        evidence_ref: String,
    ) -> Result<u64, Error> {
        owner.require_auth();
        let contribution = contribution::submit(&env, &owner, category, description, evidence_ref)?;
        Ok(contribution.id)
    }

    /// Verify a pending contribution, mint `tokens_to_award` to its owner and
    /// raise their reputation. Verifier only.
    ///
    /// Emits `contribution_verified`, then `tokens_distributed` when tokens
    /// are minted, then `tokens_awarded` (with a zero amount if none were).
    pub fn verify_contribution(
        env: Env,
        verifier: Address,
        contribution_id: u64,
        tokens_to_award: i128,
        confidence: u32,
    ) -> Result<Contribution, Error> {
        verifier.require_auth();
        rbac::require_role(&env, &verifier, Role::Verifier)?;
        let params = storage::load_params(&env)?;
        contribution::verify(&env, &params, &verifier, contribution_id, tokens_to_award, confidence)
    }

    /// Move a pending contribution to the terminal `Rejected` state. Verifier only.
    pub fn reject_contribution(
        env: Env,
        verifier: Address,
        contribution_id: u64,
        reason: String,
    ) -> Result<Contribution, Error> {
        verifier.require_auth();
        rbac::require_role(&env, &verifier, Role::Verifier)?;
        contribution::reject(&env, &verifier, contribution_id, reason)
    }

    /// Award tokens to an identity on the strength of a reasoning-agent rule.
    /// ReasoningAgent only. Returns the amount minted.
    #[allow(clippy::too_many_arguments)]
    pub fn execute_agent_award(
        env: Env,
        agent: Address,
        identity_id: u64,
        tokens_to_award: i128,
        confidence: u32,
        rule_id: Symbol,
        description: String,
        proof_ref: String,
    ) -> Result<i128, Error> {
        agent.require_auth();
        rbac::require_role(&env, &agent, Role::ReasoningAgent)?;
        let params = storage::load_params(&env)?;
        contribution::execute_agent_award(
            &env,
            &params,
            &agent,
            AgentAward {
                identity_id,
                tokens_to_award,
                confidence,
                rule_id,
                description,
                proof_ref,
            },
        )
    }

    pub fn get_contribution(env: Env, id: u64) -> Result<Contribution, Error> {
        contribution::get(&env, id)
    }

    pub fn contribution_count(env: Env) -> u64 {
        storage::count(&env, storage::DataKey::ContributionCount)
    }

    // ─────────────────────────────────────────────────────────
    // Token ledger
    // ─────────────────────────────────────────────────────────

    /// Mint `amount` to `recipient`. Minter only. Returns the distribution id.
    #[allow(clippy::too_many_arguments)]
    pub fn mint(
        env: Env,
        caller: Address,
        recipient: Address,
        amount: i128,
        reason: String,
        proof_ref: String,
        confidence: u32,
        category: String,
    ) -> Result<u64, Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Minter)?;
        let params = storage::load_params(&env)?;
        validation::validate_reference(&proof_ref)?;
        let distribution = token::mint(
            &env,
            &params,
            MintRequest {
                recipient,
                amount,
                reason,
                proof_ref,
                confidence,
                category,
            },
        )?;
        Ok(distribution.id)
    }

    /// Burn from `from` at the configured burn rate. Burner only.
    /// Returns the amount actually destroyed.
    pub fn burn(
        env: Env,
        caller: Address,
        from: Address,
        amount: i128,
        reason: String,
    ) -> Result<i128, Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Burner)?;
        let params = storage::load_params(&env)?;
        token::burn(&env, &params, &from, amount, reason)
    }

    pub fn balance(env: Env, principal: Address) -> i128 {
        storage::balance(&env, &principal)
    }

    pub fn total_supply(env: Env) -> i128 {
        storage::total_supply(&env)
    }

    pub fn max_supply(env: Env) -> Result<i128, Error> {
        Ok(storage::load_params(&env)?.max_supply)
    }

    pub fn get_distribution(env: Env, id: u64) -> Result<Distribution, Error> {
        storage::load_distribution(&env, id).ok_or(Error::NotFound)
    }

    pub fn distribution_count(env: Env) -> u64 {
        storage::count(&env, storage::DataKey::DistributionCount)
    }

    // ─────────────────────────────────────────────────────────
    // Vesting
    // ─────────────────────────────────────────────────────────

    /// Create a linear vesting schedule. Governance only.
    ///
    /// `duration` defaults to the `vestingDuration` parameter, `start_time`
    /// to the current ledger timestamp.
    pub fn create_vesting_schedule(
        env: Env,
        caller: Address,
        beneficiary: Address,
        total_amount: i128,
        duration: Option<u64>,
        start_time: Option<u64>,
    ) -> Result<VestingSchedule, Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Governance)?;
        let params = storage::load_params(&env)?;
        token::create_vesting(&env, &params, &beneficiary, total_amount, duration, start_time)
    }

    /// Mint everything vested and not yet released. Returns the amount claimed.
    pub fn claim_vested(env: Env, beneficiary: Address) -> Result<i128, Error> {
        beneficiary.require_auth();
        let params = storage::load_params(&env)?;
        token::claim_vested(&env, &params, &beneficiary)
    }

    /// Deactivate a schedule, forfeiting the unreleased remainder.
    /// Governance only. Returns the forfeited amount.
    pub fn revoke_vesting_schedule(
        env: Env,
        caller: Address,
        beneficiary: Address,
    ) -> Result<i128, Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Governance)?;
        token::revoke_vesting(&env, &beneficiary)
    }

    /// The beneficiary's most recent schedule.
    pub fn get_vesting_schedule(env: Env, beneficiary: Address) -> Result<VestingSchedule, Error> {
        storage::load_vesting(&env, &beneficiary).ok_or(Error::NotFound)
    }

    /// A past or current schedule by creation index, starting at 0.
    pub fn get_vesting_schedule_at(
        env: Env,
        beneficiary: Address,
        index: u32,
    ) -> Result<VestingSchedule, Error> {
        storage::load_vesting_at(&env, &beneficiary, index).ok_or(Error::NotFound)
    }

    pub fn vesting_schedule_count(env: Env, beneficiary: Address) -> u32 {
        storage::vesting_count(&env, &beneficiary)
    }

    /// Amount currently claimable by `beneficiary`.
    pub fn vested_amount(env: Env, beneficiary: Address) -> Result<i128, Error> {
        let schedule = storage::load_vesting(&env, &beneficiary).ok_or(Error::NotFound)?;
        if !schedule.active {
            return Ok(0);
        }
        let vested = token::vested_at(&schedule, env.ledger().timestamp())?;
        Ok(vested - schedule.released_amount)
    }

    // ─────────────────────────────────────────────────────────
    // Governance
    // ─────────────────────────────────────────────────────────

    /// Change a whitelisted parameter. Governance only.
    pub fn update_parameter(
        env: Env,
        caller: Address,
        name: Symbol,
        value: i128,
    ) -> Result<(), Error> {
        caller.require_auth();
        rbac::require_role(&env, &caller, Role::Governance)?;
        token::update_parameter(&env, &name, value)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Impact bonds
    // ─────────────────────────────────────────────────────────

    /// Create a bond. The creator must hold an identity.
    #[allow(clippy::too_many_arguments)]
    pub fn create_bond(
        env: Env,
        creator: Address,
        title: String,
        description: String,
        metadata_ref: String,
        target_amount: i128,
        maturity_date: u64,
        milestones: Vec<String>,
    ) -> Result<ImpactBond, Error> {
        creator.require_auth();
        storage::load_params(&env)?;
        bond::create(
            &env,
            &creator,
            NewBond {
                title,
                description,
                metadata_ref,
                target_amount,
                maturity_date,
                milestones,
            },
        )
    }

    /// Record an investment. Returns the investor's cumulative total.
    pub fn invest(env: Env, investor: Address, bond_id: u64, amount: i128) -> Result<i128, Error> {
        investor.require_auth();
        bond::invest(&env, &investor, bond_id, amount)
    }

    /// Mark a milestone complete. Verifier only.
    pub fn complete_milestone(
        env: Env,
        verifier: Address,
        bond_id: u64,
        label: String,
    ) -> Result<ImpactBond, Error> {
        verifier.require_auth();
        rbac::require_role(&env, &verifier, Role::Verifier)?;
        bond::complete_milestone(&env, bond_id, label)
    }

    /// Close a bond. Creator or Governance.
    pub fn close_bond(env: Env, caller: Address, bond_id: u64) -> Result<ImpactBond, Error> {
        caller.require_auth();
        bond::close(&env, &caller, bond_id)
    }

    pub fn get_bond(env: Env, id: u64) -> Result<ImpactBond, Error> {
        bond::get(&env, id)
    }

    pub fn get_investment(env: Env, bond_id: u64, investor: Address) -> Result<i128, Error> {
        bond::investment(&env, bond_id, &investor)
    }

    pub fn bond_count(env: Env) -> u64 {
        storage::count(&env, storage::DataKey::BondCount)
    }

    // ─────────────────────────────────────────────────────────
    // Event log
    // ─────────────────────────────────────────────────────────

    pub fn event_count(env: Env) -> u64 {
        events::event_count(&env)
    }

    /// Up to `limit` (max 100) log entries starting at sequence `from`.
    pub fn events_since(env: Env, from: u64, limit: u32) -> Vec<LogEntry> {
        events::events_since(&env, from, limit)
    }
}

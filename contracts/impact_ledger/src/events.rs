//! # Events
//!
//! Every committed state transition is recorded twice:
//!
//! 1. As a [`LogEntry`] in persistent storage, keyed by a sequence number
//!    that starts at 0 and increases by one per event. Entries are never
//!    rewritten or removed; readers page through them with
//!    [`events_since`] from their last-seen sequence number.
//! 2. As a Soroban contract event with topics `(event_name, seq)` and the
//!    event struct as data, for off-chain indexers.
//!
//! | Topic                      | Data struct              |
//! |----------------------------|--------------------------|
//! | `identity_created`         | [`IdentityCreated`]      |
//! | `identity_updated`         | [`IdentityUpdated`]      |
//! | `identity_status`          | [`IdentityStatusChanged`]|
//! | `contribution_added`       | [`ContributionAdded`]    |
//! | `contribution_verified`    | [`ContributionVerified`] |
//! | `contribution_rejected`    | [`ContributionRejected`] |
//! | `tokens_awarded`           | [`TokensAwarded`]        |
//! | `agent_rule_executed`      | [`AgentRuleExecuted`]    |
//! | `tokens_distributed`       | [`TokensDistributed`]    |
//! | `tokens_burned`            | [`TokensBurned`]         |
//! | `vesting_created`          | [`VestingScheduleCreated`]|
//! | `vesting_revoked`          | [`VestingScheduleRevoked`]|
//! | `tokens_claimed`           | [`TokensClaimed`]        |
//! | `parameter_updated`        | [`ParameterUpdated`]     |
//! | `bond_created`             | [`ImpactBondCreated`]    |
//! | `bond_investment`          | [`BondInvestment`]       |
//! | `milestone_completed`      | [`MilestoneCompleted`]   |
//! | `bond_closed`              | [`BondClosed`]           |
//! | `role_granted`             | [`RoleGranted`]          |
//! | `role_revoked`             | [`RoleRevoked`]          |

use soroban_sdk::{contracttype, Address, Env, IntoVal, String, Symbol, Val, Vec};

use crate::rbac::Role;
use crate::storage::{self, DataKey};
use crate::types::{Contribution, Distribution, Identity, VestingSchedule};

/// Largest page returned by [`events_since`].
pub const MAX_EVENTS_PAGE: u32 = 100;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdentityCreated {
    pub id: u64,
    pub username: String,
    pub owner: Address,
    pub did: String,
    pub metadata_ref: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdentityUpdated {
    pub id: u64,
    pub metadata_ref: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdentityStatusChanged {
    pub id: u64,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionAdded {
    pub id: u64,
    pub identity_id: u64,
    pub category: String,
    pub evidence_ref: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionVerified {
    pub id: u64,
    pub verifier: Address,
    pub tokens_awarded: i128,
    pub confidence: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionRejected {
    pub id: u64,
    pub verifier: Address,
    pub reason: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensAwarded {
    pub identity_id: u64,
    pub recipient: Address,
    pub amount: i128,
    pub reputation_gained: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AgentRuleExecuted {
    pub rule_id: Symbol,
    pub description: String,
    pub agent: Address,
    pub identity_id: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensDistributed {
    pub distribution_id: u64,
    pub recipient: Address,
    pub amount: i128,
    pub reason: String,
    pub confidence: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensBurned {
    pub from: Address,
    pub amount: i128,
    pub reason: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingScheduleCreated {
    pub beneficiary: Address,
    pub total_amount: i128,
    pub duration: u64,
    pub start_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingScheduleRevoked {
    pub beneficiary: Address,
    /// Unreleased amount that will never be minted.
    pub forfeited: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensClaimed {
    pub beneficiary: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParameterUpdated {
    pub name: Symbol,
    pub old_value: i128,
    pub new_value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImpactBondCreated {
    pub id: u64,
    pub creator: Address,
    pub target_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondInvestment {
    pub id: u64,
    pub investor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneCompleted {
    pub id: u64,
    pub label: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondClosed {
    pub id: u64,
    pub closed_by: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleGranted {
    pub role: Role,
    pub target: Address,
    pub caller: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRevoked {
    pub role: Role,
    pub target: Address,
    pub caller: Address,
}

/// Payload of a log entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EventBody {
    IdentityCreated(IdentityCreated),
    IdentityUpdated(IdentityUpdated),
    IdentityStatusChanged(IdentityStatusChanged),
    ContributionAdded(ContributionAdded),
    ContributionVerified(ContributionVerified),
    ContributionRejected(ContributionRejected),
    TokensAwarded(TokensAwarded),
    AgentRuleExecuted(AgentRuleExecuted),
    TokensDistributed(TokensDistributed),
    TokensBurned(TokensBurned),
    VestingScheduleCreated(VestingScheduleCreated),
    VestingScheduleRevoked(VestingScheduleRevoked),
    TokensClaimed(TokensClaimed),
    ParameterUpdated(ParameterUpdated),
    ImpactBondCreated(ImpactBondCreated),
    BondInvestment(BondInvestment),
    MilestoneCompleted(MilestoneCompleted),
    BondClosed(BondClosed),
    RoleGranted(RoleGranted),
    RoleRevoked(RoleRevoked),
}

/// One committed transition in the event log.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
    pub seq: u64,
    pub timestamp: u64,
    pub ledger: u32,
    pub body: EventBody,
}

// ── Log access ───────────────────────────────────────────────────────

fn record<D>(env: &Env, topic: &str, data: D, body: EventBody) -> u64
where
    D: IntoVal<Env, Val>,
{
    let seq = storage::next_id(env, DataKey::EventCount);
    let entry = LogEntry {
        seq,
        timestamp: env.ledger().timestamp(),
        ledger: env.ledger().sequence(),
        body,
    };
    storage::save_event(env, &entry);
    env.events().publish((Symbol::new(env, topic), seq), data);
    seq
}

/// Number of entries in the log; also the next sequence number.
pub fn event_count(env: &Env) -> u64 {
    storage::count(env, DataKey::EventCount)
}

/// Up to `limit` entries starting at sequence number `from`.
pub fn events_since(env: &Env, from: u64, limit: u32) -> Vec<LogEntry> {
    let end = event_count(env);
    let limit = limit.min(MAX_EVENTS_PAGE) as u64;
    let mut page = Vec::new(env);
    let mut seq = from;
    while seq < end && (page.len() as u64) < limit {
        if let Some(entry) = storage::load_event(env, seq) {
            page.push_back(entry);
        }
        seq += 1;
    }
    page
}

// ── Emitters ─────────────────────────────────────────────────────────

pub fn emit_identity_created(env: &Env, identity: &Identity) {
    let data = IdentityCreated {
        id: identity.id,
        username: identity.username.clone(),
        owner: identity.owner.clone(),
        did: identity.did.clone(),
        metadata_ref: identity.metadata_ref.clone(),
    };
    record(env, "identity_created", data.clone(), EventBody::IdentityCreated(data));
}

pub fn emit_identity_updated(env: &Env, identity: &Identity) {
    let data = IdentityUpdated {
        id: identity.id,
        metadata_ref: identity.metadata_ref.clone(),
    };
    record(env, "identity_updated", data.clone(), EventBody::IdentityUpdated(data));
}

pub fn emit_identity_status_changed(env: &Env, id: u64, active: bool) {
    let data = IdentityStatusChanged { id, active };
    record(env, "identity_status", data.clone(), EventBody::IdentityStatusChanged(data));
}

pub fn emit_contribution_added(env: &Env, contribution: &Contribution) {
    let data = ContributionAdded {
        id: contribution.id,
        identity_id: contribution.identity_id,
        category: contribution.category.clone(),
        evidence_ref: contribution.evidence_ref.clone(),
    };
    record(env, "contribution_added", data.clone(), EventBody::ContributionAdded(data));
}

pub fn emit_contribution_verified(env: &Env, contribution: &Contribution, verifier: &Address) {
    let data = ContributionVerified {
        id: contribution.id,
        verifier: verifier.clone(),
        tokens_awarded: contribution.tokens_awarded,
        confidence: contribution.confidence,
    };
    record(env, "contribution_verified", data.clone(), EventBody::ContributionVerified(data));
}

pub fn emit_contribution_rejected(env: &Env, id: u64, verifier: &Address, reason: String) {
    let data = ContributionRejected {
        id,
        verifier: verifier.clone(),
        reason,
    };
    record(env, "contribution_rejected", data.clone(), EventBody::ContributionRejected(data));
}

pub fn emit_tokens_awarded(
    env: &Env,
    identity: &Identity,
    amount: i128,
    reputation_gained: u64,
) {
    let data = TokensAwarded {
        identity_id: identity.id,
        recipient: identity.owner.clone(),
        amount,
        reputation_gained,
    };
    record(env, "tokens_awarded", data.clone(), EventBody::TokensAwarded(data));
}

pub fn emit_agent_rule_executed(
    env: &Env,
    rule_id: Symbol,
    description: String,
    agent: &Address,
    identity_id: u64,
) {
    let data = AgentRuleExecuted {
        rule_id,
        description,
        agent: agent.clone(),
        identity_id,
    };
    record(env, "agent_rule_executed", data.clone(), EventBody::AgentRuleExecuted(data));
}

pub fn emit_tokens_distributed(env: &Env, distribution: &Distribution) {
    let data = TokensDistributed {
        distribution_id: distribution.id,
        recipient: distribution.recipient.clone(),
        amount: distribution.amount,
        reason: distribution.reason.clone(),
        confidence: distribution.confidence,
    };
    record(env, "tokens_distributed", data.clone(), EventBody::TokensDistributed(data));
}

pub fn emit_tokens_burned(env: &Env, from: &Address, amount: i128, reason: String) {
    let data = TokensBurned {
        from: from.clone(),
        amount,
        reason,
    };
    record(env, "tokens_burned", data.clone(), EventBody::TokensBurned(data));
}

pub fn emit_vesting_created(env: &Env, schedule: &VestingSchedule) {
    let data = VestingScheduleCreated {
        beneficiary: schedule.beneficiary.clone(),
        total_amount: schedule.total_amount,
        duration: schedule.duration,
        start_time: schedule.start_time,
    };
    record(env, "vesting_created", data.clone(), EventBody::VestingScheduleCreated(data));
}

pub fn emit_vesting_revoked(env: &Env, beneficiary: &Address, forfeited: i128) {
    let data = VestingScheduleRevoked {
        beneficiary: beneficiary.clone(),
        forfeited,
    };
    record(env, "vesting_revoked", data.clone(), EventBody::VestingScheduleRevoked(data));
}

pub fn emit_tokens_claimed(env: &Env, beneficiary: &Address, amount: i128) {
    let data = TokensClaimed {
        beneficiary: beneficiary.clone(),
        amount,
    };
    record(env, "tokens_claimed", data.clone(), EventBody::TokensClaimed(data));
}

pub fn emit_parameter_updated(env: &Env, name: Symbol, old_value: i128, new_value: i128) {
    let data = ParameterUpdated {
        name,
        old_value,
        new_value,
    };
    record(env, "parameter_updated", data.clone(), EventBody::ParameterUpdated(data));
}

pub fn emit_bond_created(env: &Env, id: u64, creator: &Address, target_amount: i128) {
    let data = ImpactBondCreated {
        id,
        creator: creator.clone(),
        target_amount,
    };
    record(env, "bond_created", data.clone(), EventBody::ImpactBondCreated(data));
}

pub fn emit_bond_investment(env: &Env, id: u64, investor: &Address, amount: i128) {
    let data = BondInvestment {
        id,
        investor: investor.clone(),
        amount,
    };
    record(env, "bond_investment", data.clone(), EventBody::BondInvestment(data));
}

pub fn emit_milestone_completed(env: &Env, id: u64, label: String) {
    let data = MilestoneCompleted { id, label };
    record(env, "milestone_completed", data.clone(), EventBody::MilestoneCompleted(data));
}

pub fn emit_bond_closed(env: &Env, id: u64, closed_by: &Address) {
    let data = BondClosed {
        id,
        closed_by: closed_by.clone(),
    };
    record(env, "bond_closed", data.clone(), EventBody::BondClosed(data));
}

pub fn emit_role_granted(env: &Env, role: Role, target: &Address, caller: &Address) {
    let data = RoleGranted {
        role,
        target: target.clone(),
        caller: caller.clone(),
    };
    record(env, "role_granted", data.clone(), EventBody::RoleGranted(data));
}

pub fn emit_role_revoked(env: &Env, role: Role, target: &Address, caller: &Address) {
    let data = RoleRevoked {
        role,
        target: target.clone(),
        caller: caller.clone(),
    };
    record(env, "role_revoked", data.clone(), EventBody::RoleRevoked(data));
}

//! # Types
//!
//! Shared data structures used across all modules of the Impact Ledger.
//!
//! ## Design decisions
//!
//! ### Config / State split for bonds
//!
//! An `ImpactBond` is internally stored as separate ledger entries:
//!
//! - [`BondConfig`]: written once at creation; never mutated.
//! - [`BondState`]: written on every investment, milestone and close.
//! - One investment entry per `(bond, investor)` pair, so an investment only
//!   touches the investor's own entry instead of rewriting a growing map.
//!
//! The public API exposes the reconstructed [`ImpactBond`] struct.
//!
//! ### Contribution status as a Finite-State Machine
//!
//! [`ContributionStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Pending ──► Verified
//!     └─────► Rejected
//! ```
//!
//! Both `Verified` and `Rejected` are terminal. A contribution can never be
//! un-verified.

use soroban_sdk::{contracttype, Address, String, Vec};

/// Seconds in a day, used for the default vesting duration.
pub const DAY_IN_SECONDS: u64 = 86_400;

/// Denominator for basis-point rates.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Upper bound for every confidence value.
pub const MAX_CONFIDENCE: u32 = 100;

/// Governance-tunable configuration.
///
/// Written at `init` and afterwards only through `update_parameter`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Params {
    /// Hard cap on total supply. Fixed at init.
    pub max_supply: i128,
    /// Tokens needed per reputation point.
    pub reputation_per_token: i128,
    /// Minimum confidence for reasoning-agent awards.
    pub min_confidence_threshold: u32,
    /// Minimum confidence attached to any policy-checked mint.
    pub min_confidence_for_mint: u32,
    /// Largest amount a single policy-checked mint may create.
    pub max_mint_per_transaction: i128,
    /// Share of a burn request actually destroyed, in basis points.
    pub burn_rate_bps: u32,
    /// Default vesting duration in seconds.
    pub vesting_duration: u64,
    /// Largest award a single agent-triggered operation may carry.
    pub max_operation_cost_budget: i128,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            max_supply: 1_000_000_000,
            reputation_per_token: 10,
            min_confidence_threshold: 70,
            min_confidence_for_mint: 50,
            max_mint_per_transaction: 1_000_000,
            burn_rate_bps: 100,
            vesting_duration: 365 * DAY_IN_SECONDS,
            max_operation_cost_budget: 10_000,
        }
    }
}

/// A uniquely-owned identity record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    /// Unique identifier (auto-incremented).
    pub id: u64,
    /// Principal that owns this identity. One identity per owner.
    pub owner: Address,
    /// Unique, non-empty handle.
    pub username: String,
    /// Unique, non-empty decentralized identifier.
    pub did: String,
    /// Validated pointer to off-ledger profile metadata.
    pub metadata_ref: String,
    pub reputation_score: u64,
    /// Mirror of the owner's ledger balance, refreshed on mint and burn.
    pub token_balance: i128,
    pub active: bool,
    pub created_at: u64,
    pub last_activity: u64,
}

/// Lifecycle status of a contribution.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContributionStatus {
    /// Submitted, awaiting a verifier.
    Pending,
    /// Verified and rewarded. Terminal.
    Verified,
    /// Rejected by a verifier. Terminal.
    Rejected,
}

/// A contribution submitted against an identity.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contribution {
    pub id: u64,
    /// Back-reference to the submitting identity.
    pub identity_id: u64,
    pub category: String,
    pub description: String,
    pub evidence_ref: String,
    pub status: ContributionStatus,
    /// Set when the contribution leaves `Pending`.
    pub verifier: Option<Address>,
    pub tokens_awarded: i128,
    /// Confidence recorded at verification, 0 until then.
    pub confidence: u32,
    pub timestamp: u64,
}

impl Contribution {
    pub fn is_verified(&self) -> bool {
        self.status == ContributionStatus::Verified
    }
}

/// Append-only audit record written on every mint.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Distribution {
    pub id: u64,
    pub recipient: Address,
    pub amount: i128,
    pub reason: String,
    pub proof_ref: String,
    pub confidence: u32,
    pub category: String,
    pub timestamp: u64,
}

/// Linear vesting grant for one beneficiary.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingSchedule {
    pub beneficiary: Address,
    pub total_amount: i128,
    /// Never decreases, never exceeds `total_amount`.
    pub released_amount: i128,
    pub start_time: u64,
    pub duration: u64,
    pub active: bool,
}

impl VestingSchedule {
    pub fn is_fully_released(&self) -> bool {
        self.released_amount >= self.total_amount
    }
}

/// A labelled bond milestone.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Milestone {
    pub label: String,
    pub completed: bool,
}

/// Immutable bond configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondConfig {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub metadata_ref: String,
    pub target_amount: i128,
    pub maturity_date: u64,
}

/// Mutable bond state, updated on investments, milestones and close.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BondState {
    pub current_amount: i128,
    pub active: bool,
    pub milestones: Vec<Milestone>,
    /// Number of distinct investors.
    pub investor_count: u32,
}

/// Full representation of an impact bond.
///
/// Used as the public API return type; reconstructed internally from
/// the split `BondConfig` + `BondState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImpactBond {
    /// Unique identifier (auto-incremented).
    pub id: u64,
    /// Address that created the bond. Must own an identity.
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub metadata_ref: String,
    /// Funding target.
    pub target_amount: i128,
    /// Sum of all investments.
    pub current_amount: i128,
    /// Ledger timestamp after which investments are refused.
    pub maturity_date: u64,
    pub active: bool,
    /// Ordered milestone list.
    pub milestones: Vec<Milestone>,
    pub investor_count: u32,
}

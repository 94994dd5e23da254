//! # Token ledger
//!
//! Fungible balances under a hard supply cap, burns at a governance-set rate,
//! linear vesting schedules and the governance parameter table.
//!
//! ## Minting in two steps
//!
//! Every mint path goes through [`stage_mint`] and then [`commit_mint`].
//! Staging validates the request against the active [`MintPolicy`] and
//! computes the post-mint supply and balance without writing anything.
//! Callers that mutate other records in the same invocation (contribution
//! verification, agent awards, vesting claims) stage the mint first, so any
//! failure surfaces before the first write.

use soroban_sdk::{Address, Env, String, Symbol};

use crate::events;
use crate::identity;
use crate::storage::{self, DataKey};
use crate::types::{Distribution, Params, VestingSchedule, BPS_DENOMINATOR, MAX_CONFIDENCE};
use crate::Error;

/// Which limits a mint is held to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MintPolicy {
    /// Per-transaction cap, confidence minimum and supply cap.
    Checked,
    /// Supply cap only. Used for governance-approved vesting grants.
    SupplyOnly,
}

pub struct MintRequest {
    pub recipient: Address,
    pub amount: i128,
    pub reason: String,
    pub proof_ref: String,
    pub confidence: u32,
    pub category: String,
}

/// A validated mint, ready to be written.
pub struct StagedMint {
    request: MintRequest,
    supply_after: i128,
    balance_after: i128,
}

impl StagedMint {
    pub fn amount(&self) -> i128 {
        self.request.amount
    }
}

pub fn stage_mint(
    env: &Env,
    params: &Params,
    request: MintRequest,
    policy: MintPolicy,
) -> Result<StagedMint, Error> {
    if request.recipient == env.current_contract_address() {
        return Err(Error::InvalidRecipient);
    }
    if request.amount <= 0 {
        return Err(Error::ZeroAmount);
    }
    if request.confidence > MAX_CONFIDENCE {
        return Err(Error::ConfidenceOutOfRange);
    }
    if policy == MintPolicy::Checked {
        if request.amount > params.max_mint_per_transaction {
            return Err(Error::AmountExceedsPerTxCap);
        }
        if request.confidence < params.min_confidence_for_mint {
            return Err(Error::ConfidenceBelowMinimum);
        }
    }

    let supply_after = storage::total_supply(env)
        .checked_add(request.amount)
        .ok_or(Error::Overflow)?;
    if supply_after > params.max_supply {
        return Err(Error::SupplyExceeded);
    }
    let balance_after = storage::balance(env, &request.recipient)
        .checked_add(request.amount)
        .ok_or(Error::Overflow)?;

    Ok(StagedMint {
        request,
        supply_after,
        balance_after,
    })
}

/// Write a staged mint: supply, balance, identity mirror and the
/// distribution record. Emits `TokensDistributed`.
pub fn commit_mint(env: &Env, staged: StagedMint) -> Distribution {
    let StagedMint {
        request,
        supply_after,
        balance_after,
    } = staged;

    storage::set_total_supply(env, supply_after);
    storage::set_balance(env, &request.recipient, balance_after);
    identity::mirror_balance(env, &request.recipient, balance_after);

    let distribution = Distribution {
        id: storage::next_id(env, DataKey::DistributionCount),
        recipient: request.recipient,
        amount: request.amount,
        reason: request.reason,
        proof_ref: request.proof_ref,
        confidence: request.confidence,
        category: request.category,
        timestamp: env.ledger().timestamp(),
    };
    storage::save_distribution(env, &distribution);
    events::emit_tokens_distributed(env, &distribution);
    distribution
}

pub fn mint(env: &Env, params: &Params, request: MintRequest) -> Result<Distribution, Error> {
    let staged = stage_mint(env, params, request, MintPolicy::Checked)?;
    Ok(commit_mint(env, staged))
}

/// Amount actually destroyed by a burn request of `amount`:
/// `amount * burn_rate_bps / 10_000`, but never less than one unit.
pub fn burn_amount(amount: i128, burn_rate_bps: u32) -> Result<i128, Error> {
    let scaled = amount
        .checked_mul(burn_rate_bps as i128)
        .ok_or(Error::Overflow)?
        / BPS_DENOMINATOR;
    Ok(if scaled == 0 { 1 } else { scaled })
}

/// Burn from `from`. Returns the amount destroyed.
pub fn burn(
    env: &Env,
    params: &Params,
    from: &Address,
    amount: i128,
    reason: String,
) -> Result<i128, Error> {
    if amount <= 0 {
        return Err(Error::ZeroAmount);
    }
    let balance = storage::balance(env, from);
    if balance < amount {
        return Err(Error::InsufficientBalance);
    }

    let burned = burn_amount(amount, params.burn_rate_bps)?;
    let balance_after = balance - burned;
    let supply_after = storage::total_supply(env)
        .checked_sub(burned)
        .ok_or(Error::Overflow)?;

    storage::set_balance(env, from, balance_after);
    storage::set_total_supply(env, supply_after);
    identity::mirror_balance(env, from, balance_after);
    events::emit_tokens_burned(env, from, burned, reason);
    Ok(burned)
}

// ── Vesting ──────────────────────────────────────────────────────────

/// Proof reference carried by distributions minted from vesting claims.
pub const VESTING_PROOF_REF: &str = "ref://vesting";

pub fn create_vesting(
    env: &Env,
    params: &Params,
    beneficiary: &Address,
    total_amount: i128,
    duration: Option<u64>,
    start_time: Option<u64>,
) -> Result<VestingSchedule, Error> {
    if *beneficiary == env.current_contract_address() {
        return Err(Error::InvalidBeneficiary);
    }
    if total_amount <= 0 {
        return Err(Error::ZeroAmount);
    }
    let duration = duration.unwrap_or(params.vesting_duration);
    if duration == 0 {
        return Err(Error::ZeroDuration);
    }
    if let Some(existing) = storage::load_vesting(env, beneficiary) {
        if existing.active {
            return Err(Error::ScheduleAlreadyActive);
        }
    }

    let schedule = VestingSchedule {
        beneficiary: beneficiary.clone(),
        total_amount,
        released_amount: 0,
        start_time: start_time.unwrap_or_else(|| env.ledger().timestamp()),
        duration,
        active: true,
    };
    storage::push_vesting(env, &schedule);
    events::emit_vesting_created(env, &schedule);
    Ok(schedule)
}

/// Amount vested at `now` on a linear curve, ignoring what was released.
pub fn vested_at(schedule: &VestingSchedule, now: u64) -> Result<i128, Error> {
    if now < schedule.start_time {
        return Ok(0);
    }
    let elapsed = now - schedule.start_time;
    if elapsed >= schedule.duration {
        return Ok(schedule.total_amount);
    }
    let vested = schedule
        .total_amount
        .checked_mul(elapsed as i128)
        .ok_or(Error::Overflow)?
        / schedule.duration as i128;
    Ok(vested)
}

fn active_schedule(env: &Env, beneficiary: &Address) -> Result<VestingSchedule, Error> {
    match storage::load_vesting(env, beneficiary) {
        Some(schedule) if schedule.active => Ok(schedule),
        _ => Err(Error::NoActiveSchedule),
    }
}

/// Release everything vested so far. Returns the amount minted.
///
/// The claim that releases the last unit closes the schedule, so a new grant
/// can follow without a revocation. Claiming against a closed schedule that
/// was fully released reports `NothingClaimable`.
pub fn claim_vested(env: &Env, params: &Params, beneficiary: &Address) -> Result<i128, Error> {
    let mut schedule = match storage::load_vesting(env, beneficiary) {
        Some(schedule) if schedule.active => schedule,
        Some(schedule) if schedule.is_fully_released() => return Err(Error::NothingClaimable),
        _ => return Err(Error::NoActiveSchedule),
    };
    let now = env.ledger().timestamp();
    if now < schedule.start_time {
        return Err(Error::VestingNotStarted);
    }

    let claimable = vested_at(&schedule, now)? - schedule.released_amount;
    if claimable <= 0 {
        return Err(Error::NothingClaimable);
    }

    let staged = stage_mint(
        env,
        params,
        MintRequest {
            recipient: beneficiary.clone(),
            amount: claimable,
            reason: String::from_str(env, "vesting_claim"),
            proof_ref: String::from_str(env, VESTING_PROOF_REF),
            confidence: MAX_CONFIDENCE,
            category: String::from_str(env, "vesting"),
        },
        MintPolicy::SupplyOnly,
    )?;

    schedule.released_amount += claimable;
    if schedule.is_fully_released() {
        schedule.active = false;
    }
    storage::save_vesting(env, &schedule);
    commit_mint(env, staged);
    events::emit_tokens_claimed(env, beneficiary, claimable);
    Ok(claimable)
}

/// Deactivate a schedule. Returns the unreleased remainder, which is forfeited.
pub fn revoke_vesting(env: &Env, beneficiary: &Address) -> Result<i128, Error> {
    let mut schedule = active_schedule(env, beneficiary)?;
    let forfeited = schedule.total_amount - schedule.released_amount;
    schedule.active = false;
    storage::save_vesting(env, &schedule);
    events::emit_vesting_revoked(env, beneficiary, forfeited);
    Ok(forfeited)
}

// ── Governance parameters ────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Parameter {
    ReputationPerToken,
    MinConfidenceThreshold,
    MinConfidenceForMint,
    MaxMintPerTransaction,
    BurnRate,
    VestingDuration,
    MaxOperationCostBudget,
}

const PARAMETER_NAMES: [(&str, Parameter); 7] = [
    ("reputationPerToken", Parameter::ReputationPerToken),
    ("minConfidenceThreshold", Parameter::MinConfidenceThreshold),
    ("minConfidenceForMint", Parameter::MinConfidenceForMint),
    ("maxMintPerTransaction", Parameter::MaxMintPerTransaction),
    ("burnRate", Parameter::BurnRate),
    ("vestingDuration", Parameter::VestingDuration),
    ("maxOperationCostBudget", Parameter::MaxOperationCostBudget),
];

fn parse_parameter(env: &Env, name: &Symbol) -> Option<Parameter> {
    PARAMETER_NAMES
        .iter()
        .find(|(candidate, _)| Symbol::new(env, candidate) == *name)
        .map(|(_, parameter)| *parameter)
}

fn read_parameter(params: &Params, parameter: Parameter) -> i128 {
    match parameter {
        Parameter::ReputationPerToken => params.reputation_per_token,
        Parameter::MinConfidenceThreshold => params.min_confidence_threshold as i128,
        Parameter::MinConfidenceForMint => params.min_confidence_for_mint as i128,
        Parameter::MaxMintPerTransaction => params.max_mint_per_transaction,
        Parameter::BurnRate => params.burn_rate_bps as i128,
        Parameter::VestingDuration => params.vesting_duration as i128,
        Parameter::MaxOperationCostBudget => params.max_operation_cost_budget,
    }
}

fn in_range(value: i128, min: i128, max: i128) -> Result<i128, Error> {
    if value < min || value > max {
        Err(Error::InvalidParameterValue)
    } else {
        Ok(value)
    }
}

fn write_parameter(params: &mut Params, parameter: Parameter, value: i128) -> Result<(), Error> {
    let confidence_max = MAX_CONFIDENCE as i128;
    match parameter {
        Parameter::ReputationPerToken => {
            params.reputation_per_token = in_range(value, 1, i128::MAX)?;
        }
        Parameter::MinConfidenceThreshold => {
            params.min_confidence_threshold = in_range(value, 0, confidence_max)? as u32;
        }
        Parameter::MinConfidenceForMint => {
            params.min_confidence_for_mint = in_range(value, 0, confidence_max)? as u32;
        }
        Parameter::MaxMintPerTransaction => {
            params.max_mint_per_transaction = in_range(value, 1, i128::MAX)?;
        }
        Parameter::BurnRate => {
            params.burn_rate_bps = in_range(value, 0, BPS_DENOMINATOR)? as u32;
        }
        Parameter::VestingDuration => {
            params.vesting_duration = in_range(value, 1, u64::MAX as i128)? as u64;
        }
        Parameter::MaxOperationCostBudget => {
            params.max_operation_cost_budget = in_range(value, 0, i128::MAX)?;
        }
    }
    Ok(())
}

/// Check a full parameter set, as supplied to `init`.
pub fn validate_params(params: &Params) -> Result<(), Error> {
    if params.max_supply <= 0 {
        return Err(Error::InvalidParameterValue);
    }
    let mut scratch = params.clone();
    for (_, parameter) in PARAMETER_NAMES {
        write_parameter(&mut scratch, parameter, read_parameter(params, parameter))?;
    }
    Ok(())
}

/// Apply a named parameter change. Returns `(old, new)`.
pub fn update_parameter(env: &Env, name: &Symbol, value: i128) -> Result<(i128, i128), Error> {
    let parameter = parse_parameter(env, name).ok_or(Error::UnknownParameter)?;
    let mut params = storage::load_params(env)?;
    let old_value = read_parameter(&params, parameter);
    write_parameter(&mut params, parameter, value)?;
    storage::save_params(env, &params);
    events::emit_parameter_updated(env, name.clone(), old_value, value);
    Ok((old_value, value))
}

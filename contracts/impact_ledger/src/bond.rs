//! Impact bond ledger: creation, investment bookkeeping, milestones, close.
//!
//! Investments are recorded, not custodied: the ledger tracks who committed
//! how much and does not move tokens. Completing a milestone flips its flag
//! and releases nothing.

use soroban_sdk::{Address, Env, String, Vec};

use crate::events;
use crate::identity;
use crate::rbac::{self, Role};
use crate::storage::{self, DataKey};
use crate::types::{BondConfig, BondState, ImpactBond, Milestone};
use crate::validation::validate_reference;
use crate::Error;

/// Upper bound on milestones per bond.
pub const MAX_MILESTONES: u32 = 20;

pub struct NewBond {
    pub title: String,
    pub description: String,
    pub metadata_ref: String,
    pub target_amount: i128,
    pub maturity_date: u64,
    pub milestones: Vec<String>,
}

fn build_milestones(env: &Env, labels: &Vec<String>) -> Result<Vec<Milestone>, Error> {
    if labels.len() > MAX_MILESTONES {
        return Err(Error::InvalidMilestones);
    }
    let mut milestones: Vec<Milestone> = Vec::new(env);
    for label in labels.iter() {
        if label.len() == 0 || milestones.iter().any(|m| m.label == label) {
            return Err(Error::InvalidMilestones);
        }
        milestones.push_back(Milestone {
            label,
            completed: false,
        });
    }
    Ok(milestones)
}

fn assemble(config: BondConfig, state: BondState) -> ImpactBond {
    ImpactBond {
        id: config.id,
        creator: config.creator,
        title: config.title,
        description: config.description,
        metadata_ref: config.metadata_ref,
        target_amount: config.target_amount,
        current_amount: state.current_amount,
        maturity_date: config.maturity_date,
        active: state.active,
        milestones: state.milestones,
        investor_count: state.investor_count,
    }
}

pub fn create(env: &Env, creator: &Address, bond: NewBond) -> Result<ImpactBond, Error> {
    identity::require_owned(env, creator)?;
    if bond.maturity_date <= env.ledger().timestamp() {
        return Err(Error::MaturityInPast);
    }
    validate_reference(&bond.metadata_ref)?;
    if bond.target_amount <= 0 {
        return Err(Error::ZeroAmount);
    }
    let milestones = build_milestones(env, &bond.milestones)?;

    let config = BondConfig {
        id: storage::next_id(env, DataKey::BondCount),
        creator: creator.clone(),
        title: bond.title,
        description: bond.description,
        metadata_ref: bond.metadata_ref,
        target_amount: bond.target_amount,
        maturity_date: bond.maturity_date,
    };
    let state = BondState {
        current_amount: 0,
        active: true,
        milestones,
        investor_count: 0,
    };
    storage::save_bond(env, &config, &state);
    events::emit_bond_created(env, config.id, creator, config.target_amount);
    Ok(assemble(config, state))
}

pub fn get(env: &Env, id: u64) -> Result<ImpactBond, Error> {
    let (config, state) = storage::load_bond_pair(env, id).ok_or(Error::NotFound)?;
    Ok(assemble(config, state))
}

fn load_active(env: &Env, id: u64) -> Result<(BondConfig, BondState), Error> {
    let (config, state) = storage::load_bond_pair(env, id).ok_or(Error::NotFound)?;
    if !state.active {
        return Err(Error::BondInactive);
    }
    Ok((config, state))
}

/// Record an investment. Returns the investor's new cumulative total.
pub fn invest(env: &Env, investor: &Address, id: u64, amount: i128) -> Result<i128, Error> {
    let (config, mut state) = load_active(env, id)?;
    if amount <= 0 {
        return Err(Error::ZeroAmount);
    }
    if env.ledger().timestamp() >= config.maturity_date {
        return Err(Error::BondMatured);
    }

    let previous = storage::investment(env, id, investor);
    let cumulative = previous.checked_add(amount).ok_or(Error::Overflow)?;
    state.current_amount = state
        .current_amount
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    if previous == 0 {
        state.investor_count += 1;
    }

    storage::set_investment(env, id, investor, cumulative);
    storage::save_bond_state(env, id, &state);
    events::emit_bond_investment(env, id, investor, amount);
    Ok(cumulative)
}

pub fn complete_milestone(env: &Env, id: u64, label: String) -> Result<ImpactBond, Error> {
    let (config, mut state) = load_active(env, id)?;

    let index = state
        .milestones
        .iter()
        .position(|m| m.label == label)
        .ok_or(Error::MilestoneNotFound)? as u32;
    let mut milestone = state.milestones.get(index).ok_or(Error::MilestoneNotFound)?;
    if milestone.completed {
        return Err(Error::MilestoneAlreadyComplete);
    }
    milestone.completed = true;
    state.milestones.set(index, milestone);

    storage::save_bond_state(env, id, &state);
    events::emit_milestone_completed(env, id, label);
    Ok(assemble(config, state))
}

/// Close a bond to further investment and milestone updates.
/// Allowed for the bond creator and for Governance.
pub fn close(env: &Env, caller: &Address, id: u64) -> Result<ImpactBond, Error> {
    let is_governance = rbac::has_role(env, caller, Role::Governance);
    let (config, mut state) = match storage::load_bond_pair(env, id) {
        Some(pair) => pair,
        None if is_governance => return Err(Error::NotFound),
        None => return Err(Error::UnauthorizedCaller),
    };
    if config.creator != *caller && !is_governance {
        return Err(Error::UnauthorizedCaller);
    }
    if !state.active {
        return Err(Error::BondInactive);
    }

    state.active = false;
    storage::save_bond_state(env, id, &state);
    events::emit_bond_closed(env, id, caller);
    Ok(assemble(config, state))
}

pub fn investment(env: &Env, id: u64, investor: &Address) -> Result<i128, Error> {
    if storage::load_bond_pair(env, id).is_none() {
        return Err(Error::NotFound);
    }
    Ok(storage::investment(env, id, investor))
}

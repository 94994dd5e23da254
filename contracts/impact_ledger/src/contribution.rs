//! Contribution ledger: submission, verification, rejection and agent awards.
//!
//! Verification and agent awards touch three records (contribution, token
//! ledger, identity). Both stage the mint before the first write so that a
//! failing policy check leaves every record as it was.

use soroban_sdk::{Address, Env, String, Symbol};

use crate::events;
use crate::identity;
use crate::storage::{self, DataKey};
use crate::token::{self, MintPolicy, MintRequest};
use crate::types::{Contribution, ContributionStatus, Params, MAX_CONFIDENCE};
use crate::validation::validate_reference;
use crate::Error;

pub fn submit(
    env: &Env,
    owner: &Address,
    category: String,
    description: String,
    evidence_ref: String,
) -> Result<Contribution, Error> {
    let identity = identity::require_active_owned(env, owner)?;
    validate_reference(&evidence_ref)?;

    let contribution = Contribution {
        id: storage::next_id(env, DataKey::ContributionCount),
        identity_id: identity.id,
        category,
        description,
        evidence_ref,
        status: ContributionStatus::Pending,
        verifier: None,
        tokens_awarded: 0,
        confidence: 0,
        timestamp: env.ledger().timestamp(),
    };
    storage::save_contribution(env, &contribution);
    identity::touch_activity(env, identity.id)?;
    events::emit_contribution_added(env, &contribution);
    Ok(contribution)
}

pub fn get(env: &Env, id: u64) -> Result<Contribution, Error> {
    storage::load_contribution(env, id).ok_or(Error::NotFound)
}

fn load_pending(env: &Env, id: u64) -> Result<Contribution, Error> {
    let contribution = get(env, id)?;
    match contribution.status {
        ContributionStatus::Pending => Ok(contribution),
        ContributionStatus::Verified => Err(Error::AlreadyVerified),
        ContributionStatus::Rejected => Err(Error::AlreadyRejected),
    }
}

fn check_confidence(confidence: u32) -> Result<(), Error> {
    if confidence > MAX_CONFIDENCE {
        Err(Error::ConfidenceOutOfRange)
    } else {
        Ok(())
    }
}

pub fn verify(
    env: &Env,
    params: &Params,
    verifier: &Address,
    id: u64,
    tokens_to_award: i128,
    confidence: u32,
) -> Result<Contribution, Error> {
    // Stage.
    let mut contribution = load_pending(env, id)?;
    check_confidence(confidence)?;
    if tokens_to_award < 0 {
        return Err(Error::InvalidAmount);
    }
    let owner = identity::get(env, contribution.identity_id)?;
    let (reputation_gained, reputation_score) =
        identity::reputation_after_award(&owner, tokens_to_award, params.reputation_per_token)?;

    let staged = if tokens_to_award > 0 {
        Some(token::stage_mint(
            env,
            params,
            MintRequest {
                recipient: owner.owner.clone(),
                amount: tokens_to_award,
                reason: String::from_str(env, "contribution_verified"),
                proof_ref: contribution.evidence_ref.clone(),
                confidence,
                category: contribution.category.clone(),
            },
            MintPolicy::Checked,
        )?)
    } else {
        None
    };

    // Commit.
    contribution.status = ContributionStatus::Verified;
    contribution.verifier = Some(verifier.clone());
    contribution.tokens_awarded = tokens_to_award;
    contribution.confidence = confidence;
    storage::save_contribution(env, &contribution);
    events::emit_contribution_verified(env, &contribution, verifier);

    if let Some(staged) = staged {
        token::commit_mint(env, staged);
    }
    let owner = identity::record_award(env, owner.id, reputation_score)?;
    events::emit_tokens_awarded(env, &owner, tokens_to_award, reputation_gained);
    Ok(contribution)
}

pub fn reject(env: &Env, verifier: &Address, id: u64, reason: String) -> Result<Contribution, Error> {
    let mut contribution = load_pending(env, id)?;
    contribution.status = ContributionStatus::Rejected;
    contribution.verifier = Some(verifier.clone());
    storage::save_contribution(env, &contribution);
    events::emit_contribution_rejected(env, id, verifier, reason);
    Ok(contribution)
}

/// Everything the reasoning service hands over with an agent award.
pub struct AgentAward {
    pub identity_id: u64,
    pub tokens_to_award: i128,
    pub confidence: u32,
    pub rule_id: Symbol,
    pub description: String,
    pub proof_ref: String,
}

/// Award tokens straight to an identity on behalf of a reasoning agent.
/// Returns the amount minted.
pub fn execute_agent_award(
    env: &Env,
    params: &Params,
    agent: &Address,
    award: AgentAward,
) -> Result<i128, Error> {
    let target = identity::get(env, award.identity_id)?;
    if !target.active {
        return Err(Error::InactiveIdentity);
    }
    check_confidence(award.confidence)?;
    if award.confidence < params.min_confidence_threshold {
        return Err(Error::ConfidenceBelowThreshold);
    }
    if award.tokens_to_award < 0 {
        return Err(Error::InvalidAmount);
    }
    if award.tokens_to_award > params.max_operation_cost_budget {
        return Err(Error::OperationBudgetExceeded);
    }
    validate_reference(&award.proof_ref)?;

    let (reputation_gained, reputation_score) = identity::reputation_after_award(
        &target,
        award.tokens_to_award,
        params.reputation_per_token,
    )?;
    let staged = if award.tokens_to_award > 0 {
        Some(token::stage_mint(
            env,
            params,
            MintRequest {
                recipient: target.owner.clone(),
                amount: award.tokens_to_award,
                reason: award.description.clone(),
                proof_ref: award.proof_ref,
                confidence: award.confidence,
                category: String::from_str(env, "agent_award"),
            },
            MintPolicy::Checked,
        )?)
    } else {
        None
    };

    events::emit_agent_rule_executed(env, award.rule_id, award.description, agent, target.id);
    match staged {
        Some(staged) => {
            token::commit_mint(env, staged);
            let target = identity::record_award(env, target.id, reputation_score)?;
            events::emit_tokens_awarded(env, &target, award.tokens_to_award, reputation_gained);
        }
        None => identity::touch_activity(env, target.id)?,
    }
    Ok(award.tokens_to_award)
}

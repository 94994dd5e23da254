extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String, Symbol,
};

use crate::invariants;
use crate::types::DAY_IN_SECONDS;
use crate::validation::validate_reference;
use crate::{Error, EventBody, ImpactLedger, ImpactLedgerClient, Params, Role};

struct Actors {
    admin: Address,
    governance: Address,
    minter: Address,
    burner: Address,
}

fn setup_with_params(params: Params) -> (Env, ImpactLedgerClient<'static>, Actors) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_000);
    let contract_id = env.register(ImpactLedger, ());
    let client = ImpactLedgerClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.init(&admin, &params);
    let actors = Actors {
        governance: Address::generate(&env),
        minter: Address::generate(&env),
        burner: Address::generate(&env),
        admin,
    };
    client.grant_role(&actors.admin, &actors.governance, &Role::Governance);
    client.grant_role(&actors.admin, &actors.minter, &Role::Minter);
    client.grant_role(&actors.admin, &actors.burner, &Role::Burner);
    (env, client, actors)
}

fn setup() -> (Env, ImpactLedgerClient<'static>, Actors) {
    setup_with_params(Params::default())
}

fn s(env: &Env, value: &str) -> String {
    String::from_str(env, value)
}

fn mint(env: &Env, client: &ImpactLedgerClient, minter: &Address, to: &Address, amount: i128) -> u64 {
    client.mint(
        minter,
        to,
        &amount,
        &s(env, "grant"),
        &s(env, "ipfs://proof"),
        &80,
        &s(env, "community"),
    )
}

// ── Minting ──────────────────────────────────────────────────────────

#[test]
fn test_mint_records_distribution() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);

    let id = mint(&env, &client, &actors.minter, &holder, 250);
    assert_eq!(id, 0);
    assert_eq!(client.balance(&holder), 250);
    assert_eq!(client.total_supply(), 250);
    assert_eq!(client.distribution_count(), 1);

    let distribution = client.get_distribution(&id);
    assert_eq!(distribution.recipient, holder);
    assert_eq!(distribution.amount, 250);
    assert_eq!(distribution.reason, s(&env, "grant"));
    assert_eq!(distribution.proof_ref, s(&env, "ipfs://proof"));
    assert_eq!(distribution.confidence, 80);
    assert_eq!(distribution.category, s(&env, "community"));
    assert_eq!(distribution.timestamp, 1_000);
    assert_eq!(client.try_get_distribution(&1), Err(Ok(Error::NotFound)));
}

#[test]
fn test_mint_over_per_tx_cap_fails() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    client.update_parameter(&actors.governance, &Symbol::new(&env, "maxMintPerTransaction"), &50);

    let result = client.try_mint(
        &actors.minter,
        &holder,
        &51,
        &s(&env, "grant"),
        &s(&env, "ipfs://proof"),
        &80,
        &s(&env, "community"),
    );
    assert_eq!(result, Err(Ok(Error::AmountExceedsPerTxCap)));
    assert_eq!(client.balance(&holder), 0);

    mint(&env, &client, &actors.minter, &holder, 50);
    assert_eq!(client.balance(&holder), 50);
}

#[test]
fn test_supply_never_exceeds_cap() {
    let params = Params {
        max_supply: 1_000,
        ..Params::default()
    };
    let (env, client, actors) = setup_with_params(params);
    let a = Address::generate(&env);
    let b = Address::generate(&env);

    mint(&env, &client, &actors.minter, &a, 600);
    mint(&env, &client, &actors.minter, &b, 400);
    invariants::assert_supply_within_cap(client.total_supply(), client.max_supply());

    let result = client.try_mint(
        &actors.minter,
        &a,
        &1,
        &s(&env, "grant"),
        &s(&env, "ipfs://proof"),
        &80,
        &s(&env, "community"),
    );
    assert_eq!(result, Err(Ok(Error::SupplyExceeded)));
    assert_eq!(client.total_supply(), 1_000);
    invariants::assert_supply_matches_balances(
        client.total_supply(),
        &[client.balance(&a), client.balance(&b)],
    );
}

#[test]
fn test_mint_input_checks() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    let call = |to: &Address, amount: i128, proof: &str, confidence: u32| {
        client.try_mint(
            &actors.minter,
            to,
            &amount,
            &s(&env, "grant"),
            &s(&env, proof),
            &confidence,
            &s(&env, "community"),
        )
    };

    assert_eq!(call(&client.address, 10, "ipfs://p", 80), Err(Ok(Error::InvalidRecipient)));
    assert_eq!(call(&holder, 0, "ipfs://p", 80), Err(Ok(Error::ZeroAmount)));
    assert_eq!(call(&holder, -3, "ipfs://p", 80), Err(Ok(Error::ZeroAmount)));
    assert_eq!(call(&holder, 10, "ipfs://p", 101), Err(Ok(Error::ConfidenceOutOfRange)));
    assert_eq!(call(&holder, 10, "ipfs://p", 49), Err(Ok(Error::ConfidenceBelowMinimum)));
    assert_eq!(call(&holder, 10, "p", 80), Err(Ok(Error::InvalidReference)));
    assert_eq!(client.total_supply(), 0);
    assert_eq!(client.distribution_count(), 0);
}

#[test]
fn test_only_minter_can_mint() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    let events_before = client.event_count();

    let result = client.try_mint(
        &actors.governance,
        &holder,
        &10,
        &s(&env, "grant"),
        &s(&env, "ipfs://proof"),
        &80,
        &s(&env, "community"),
    );
    assert_eq!(result, Err(Ok(Error::UnauthorizedCaller)));
    assert_eq!(client.event_count(), events_before);
}

#[test]
fn test_mint_mirrors_identity_balance() {
    let (env, client, actors) = setup();
    let owner = Address::generate(&env);
    let identity = client.create_identity(&owner, &s(&env, "alice"), &s(&env, "did:ex:1"), &s(&env, "ref://m"));

    mint(&env, &client, &actors.minter, &owner, 300);
    assert_eq!(client.get_identity(&identity.id).token_balance, 300);

    client.burn(&actors.burner, &owner, &300, &s(&env, "fee"));
    assert_eq!(client.get_identity(&identity.id).token_balance, 297);
}

// ── Burning ──────────────────────────────────────────────────────────

#[test]
fn test_burn_applies_rate_with_floor() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    mint(&env, &client, &actors.minter, &holder, 1_000);

    // 1% of 150 rounds to 1.
    assert_eq!(client.burn(&actors.burner, &holder, &150, &s(&env, "fee")), 1);
    // 1% of 50 rounds to 0 and is floored at 1.
    assert_eq!(client.burn(&actors.burner, &holder, &50, &s(&env, "fee")), 1);
    // 1% of 900 is 9.
    assert_eq!(client.burn(&actors.burner, &holder, &900, &s(&env, "fee")), 9);

    assert_eq!(client.balance(&holder), 989);
    assert_eq!(client.total_supply(), 989);

    let last = client.events_since(&(client.event_count() - 1), &1).get(0).unwrap();
    match last.body {
        EventBody::TokensBurned(ev) => {
            assert_eq!(ev.from, holder);
            assert_eq!(ev.amount, 9);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_burn_checks() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    mint(&env, &client, &actors.minter, &holder, 100);

    assert_eq!(
        client.try_burn(&actors.burner, &holder, &101, &s(&env, "fee")),
        Err(Ok(Error::InsufficientBalance))
    );
    assert_eq!(
        client.try_burn(&actors.burner, &holder, &0, &s(&env, "fee")),
        Err(Ok(Error::ZeroAmount))
    );
    assert_eq!(
        client.try_burn(&actors.minter, &holder, &10, &s(&env, "fee")),
        Err(Ok(Error::UnauthorizedCaller))
    );
    assert_eq!(client.balance(&holder), 100);
}

#[test]
fn test_burn_rate_is_governed() {
    let (env, client, actors) = setup();
    let holder = Address::generate(&env);
    mint(&env, &client, &actors.minter, &holder, 1_000);

    client.update_parameter(&actors.governance, &Symbol::new(&env, "burnRate"), &10_000);
    assert_eq!(client.burn(&actors.burner, &holder, &400, &s(&env, "full")), 400);
    assert_eq!(client.balance(&holder), 600);
}

// ── Vesting ──────────────────────────────────────────────────────────

#[test]
fn test_vesting_claims_follow_linear_curve() {
    let (env, client, actors) = setup();
    let bob = Address::generate(&env);

    let schedule = client.create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(100), &None);
    assert_eq!(schedule.start_time, 1_000);
    assert_eq!(schedule.released_amount, 0);

    env.ledger().set_timestamp(1_050);
    assert_eq!(client.vested_amount(&bob), 500);
    assert_eq!(client.claim_vested(&bob), 500);
    let after_first = client.get_vesting_schedule(&bob);
    assert_eq!(after_first.released_amount, 500);
    invariants::assert_vesting_within_bounds(&after_first);

    env.ledger().set_timestamp(1_100);
    assert_eq!(client.claim_vested(&bob), 500);
    let after_second = client.get_vesting_schedule(&bob);
    invariants::assert_release_monotonic(after_first.released_amount, after_second.released_amount);
    invariants::assert_vesting_within_bounds(&after_second);
    assert_eq!(after_second.released_amount, 1_000);

    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::NothingClaimable)));
    assert_eq!(client.balance(&bob), 1_000);
    assert_eq!(client.total_supply(), 1_000);

    // Claims mint with a well-formed proof reference.
    let claim = client.get_distribution(&(client.distribution_count() - 1));
    assert_eq!(claim.proof_ref, s(&env, "ref://vesting"));
    assert_eq!(validate_reference(&claim.proof_ref), Ok(()));
}

#[test]
fn test_fully_claimed_schedule_closes_and_allows_a_new_grant() {
    let (env, client, actors) = setup();
    let bob = Address::generate(&env);
    client.create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(100), &None);

    env.ledger().set_timestamp(1_200);
    assert_eq!(client.claim_vested(&bob), 1_000);
    let finished = client.get_vesting_schedule(&bob);
    assert!(!finished.active);
    assert_eq!(finished.released_amount, 1_000);
    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::NothingClaimable)));
    assert_eq!(client.vested_amount(&bob), 0);
    assert_eq!(
        client.try_revoke_vesting_schedule(&actors.governance, &bob),
        Err(Ok(Error::NoActiveSchedule))
    );

    let events_before = client.event_count();
    let next = client.create_vesting_schedule(&actors.governance, &bob, &300, &Some(30), &None);
    assert!(next.active);
    assert_eq!(next.start_time, 1_200);
    assert_eq!(client.event_count(), events_before + 1);
    assert_eq!(client.vesting_schedule_count(&bob), 2);
    assert_eq!(client.get_vesting_schedule_at(&bob, &0), finished);

    env.ledger().set_timestamp(1_230);
    assert_eq!(client.claim_vested(&bob), 300);
    assert_eq!(client.balance(&bob), 1_300);
}

#[test]
fn test_vesting_claim_ignores_per_tx_cap_but_not_supply_cap() {
    let params = Params {
        max_supply: 700,
        max_mint_per_transaction: 50,
        ..Params::default()
    };
    let (env, client, actors) = setup_with_params(params);
    let bob = Address::generate(&env);
    client.create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(100), &None);

    env.ledger().set_timestamp(1_060);
    assert_eq!(client.claim_vested(&bob), 600);

    env.ledger().set_timestamp(1_100);
    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::SupplyExceeded)));
    assert_eq!(client.get_vesting_schedule(&bob).released_amount, 600);
}

#[test]
fn test_vesting_not_started() {
    let (env, client, actors) = setup();
    let bob = Address::generate(&env);
    client.create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(100), &Some(5_000));

    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::VestingNotStarted)));
    assert_eq!(client.vested_amount(&bob), 0);
    env.ledger().set_timestamp(5_010);
    assert_eq!(client.claim_vested(&bob), 100);
}

#[test]
fn test_vesting_schedule_checks() {
    let (env, client, actors) = setup();
    let bob = Address::generate(&env);

    assert_eq!(
        client.try_create_vesting_schedule(&actors.governance, &bob, &0, &Some(100), &None),
        Err(Ok(Error::ZeroAmount))
    );
    assert_eq!(
        client.try_create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(0), &None),
        Err(Ok(Error::ZeroDuration))
    );
    assert_eq!(
        client.try_create_vesting_schedule(&actors.governance, &client.address, &1_000, &None, &None),
        Err(Ok(Error::InvalidBeneficiary))
    );
    assert_eq!(
        client.try_create_vesting_schedule(&actors.minter, &bob, &1_000, &None, &None),
        Err(Ok(Error::UnauthorizedCaller))
    );
    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::NoActiveSchedule)));

    let schedule = client.create_vesting_schedule(&actors.governance, &bob, &1_000, &None, &None);
    assert_eq!(schedule.duration, 365 * DAY_IN_SECONDS);
    assert_eq!(
        client.try_create_vesting_schedule(&actors.governance, &bob, &500, &None, &None),
        Err(Ok(Error::ScheduleAlreadyActive))
    );
}

#[test]
fn test_revoke_vesting_forfeits_remainder() {
    let (env, client, actors) = setup();
    let bob = Address::generate(&env);
    client.create_vesting_schedule(&actors.governance, &bob, &1_000, &Some(100), &None);

    env.ledger().set_timestamp(1_025);
    client.claim_vested(&bob);
    assert_eq!(client.revoke_vesting_schedule(&actors.governance, &bob), 750);
    let revoked = client.get_vesting_schedule(&bob);
    assert!(!revoked.active);
    assert_eq!(revoked.released_amount, 250);
    assert_eq!(client.try_claim_vested(&bob), Err(Ok(Error::NoActiveSchedule)));
    assert_eq!(client.vested_amount(&bob), 0);
    assert_eq!(
        client.try_revoke_vesting_schedule(&actors.governance, &bob),
        Err(Ok(Error::NoActiveSchedule))
    );

    // A fresh schedule may replace the revoked one.
    let fresh = client.create_vesting_schedule(&actors.governance, &bob, &200, &Some(10), &None);
    assert!(fresh.active);
    assert_eq!(fresh.released_amount, 0);
    assert_eq!(client.get_vesting_schedule(&bob), fresh);

    // The revoked grant stays readable after replacement.
    assert_eq!(client.vesting_schedule_count(&bob), 2);
    assert_eq!(client.get_vesting_schedule_at(&bob, &0), revoked);
    assert_eq!(client.get_vesting_schedule_at(&bob, &0).total_amount, 1_000);
    assert_eq!(client.get_vesting_schedule_at(&bob, &1), fresh);
    assert_eq!(client.try_get_vesting_schedule_at(&bob, &2), Err(Ok(Error::NotFound)));
}

// ── Parameters ───────────────────────────────────────────────────────

#[test]
fn test_update_parameter_whitelist() {
    let (env, client, actors) = setup();

    client.update_parameter(&actors.governance, &Symbol::new(&env, "minConfidenceForMint"), &65);
    client.update_parameter(&actors.governance, &Symbol::new(&env, "vestingDuration"), &3_600);
    client.update_parameter(&actors.governance, &Symbol::new(&env, "reputationPerToken"), &4);
    client.update_parameter(&actors.governance, &Symbol::new(&env, "minConfidenceThreshold"), &80);
    client.update_parameter(&actors.governance, &Symbol::new(&env, "maxOperationCostBudget"), &5);

    let params = client.params();
    assert_eq!(params.min_confidence_for_mint, 65);
    assert_eq!(params.vesting_duration, 3_600);
    assert_eq!(params.reputation_per_token, 4);
    assert_eq!(params.min_confidence_threshold, 80);
    assert_eq!(params.max_operation_cost_budget, 5);

    assert_eq!(
        client.try_update_parameter(&actors.governance, &Symbol::new(&env, "maxSupply"), &1),
        Err(Ok(Error::UnknownParameter))
    );
    assert_eq!(
        client.try_update_parameter(&actors.governance, &Symbol::new(&env, "burnRate"), &10_001),
        Err(Ok(Error::InvalidParameterValue))
    );
    assert_eq!(
        client.try_update_parameter(&actors.governance, &Symbol::new(&env, "minConfidenceForMint"), &101),
        Err(Ok(Error::InvalidParameterValue))
    );
    assert_eq!(
        client.try_update_parameter(&actors.admin, &Symbol::new(&env, "burnRate"), &1),
        Err(Ok(Error::UnauthorizedCaller))
    );
}

#[test]
fn test_update_parameter_emits_old_and_new() {
    let (env, client, actors) = setup();
    client.update_parameter(&actors.governance, &Symbol::new(&env, "burnRate"), &250);

    let last = client.events_since(&(client.event_count() - 1), &1).get(0).unwrap();
    match last.body {
        EventBody::ParameterUpdated(ev) => {
            assert_eq!(ev.name, Symbol::new(&env, "burnRate"));
            assert_eq!(ev.old_value, 100);
            assert_eq!(ev.new_value, 250);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(client.params().burn_rate_bps, 250);
}

//! Integration test: staking, slashing and the economic edge cases.

use augury_integration_tests::{asset, engine, enroll, oracle, ADMIN};
use augury_oracle::OracleError;

#[test]
fn stake_minimum_applies_per_call() {
    let engine = engine();
    let a = oracle("A");
    engine.add_oracle(&oracle(ADMIN), &a).expect("admit");

    // Two half-minimum stakes never reach the minimum.
    let err = engine.stake(&a, 500).expect_err("below minimum");
    assert!(matches!(err, OracleError::InvalidAmount { amount: 500, .. }));
    assert_eq!(engine.oracle_stake(&a), Some(0));

    engine.stake(&a, 1000).expect("minimum");
    // Even with 1000 already staked, a 1-unit top-up is refused.
    assert!(engine.stake(&a, 1).is_err());
    assert_eq!(engine.stake(&a, 2500).expect("top-up"), 3500);
}

#[test]
fn insufficient_stake_regardless_of_reputation() {
    let engine = engine();
    let ids: Vec<_> = ["A", "B", "C"].iter().map(|n| enroll(&engine, n)).collect();
    let x = asset("X");

    // Build up A's reputation over a few rounds.
    for round in 0..3 {
        for id in &ids {
            engine.submit(id, &x, 100 + round).expect("submit");
        }
        engine.finalize_consensus(&x).expect("finalize");
    }
    assert_eq!(engine.oracle_reputation(&ids[0]), Some(103));

    engine.withdraw(&ids[0], 1).expect("withdraw");
    let err = engine.submit(&ids[0], &x, 100).expect_err("under-staked");
    assert!(matches!(
        err,
        OracleError::InsufficientStake {
            stake: 999,
            required: 1000
        }
    ));
}

#[test]
fn withdraw_cannot_exceed_stake() {
    let engine = engine();
    let a = enroll(&engine, "A");
    let err = engine.withdraw(&a, 1001).expect_err("too much");
    assert!(matches!(err, OracleError::InvalidAmount { amount: 1001, .. }));
    assert_eq!(engine.withdraw(&a, 1000).expect("all"), 0);
}

#[test]
fn slash_floors_stake_and_zeroes_reputation() {
    let engine = engine();
    let ids: Vec<_> = ["A", "B", "C"].iter().map(|n| enroll(&engine, n)).collect();
    let x = asset("X");
    for id in &ids {
        engine.submit(id, &x, 1000).expect("submit");
    }
    engine.finalize_consensus(&x).expect("finalize");

    let victim = &ids[2];
    for expected in [500, 0, 0] {
        let outcome = engine.report_outlier(&x, victim, 5000).expect("slash");
        assert_eq!(outcome.remaining_stake, expected);
        assert_eq!(engine.oracle_stake(victim), Some(expected));
        assert_eq!(engine.oracle_reputation(victim), Some(0));
    }

    // A slashed oracle stays registered and can restake to submit again.
    assert!(engine.is_authorized(victim));
    engine.stake(victim, 1000).expect("restake");
    engine.submit(victim, &x, 1000).expect("submit again");
}

#[test]
fn readmission_restores_reputation_only() {
    let engine = engine();
    let ids: Vec<_> = ["A", "B", "C"].iter().map(|n| enroll(&engine, n)).collect();
    let x = asset("X");
    for id in &ids {
        engine.submit(id, &x, 50).expect("submit");
    }
    engine.finalize_consensus(&x).expect("finalize");
    engine.report_outlier(&x, &ids[0], 0).expect("slash");

    engine.add_oracle(&oracle(ADMIN), &ids[0]).expect("readmit");
    assert_eq!(engine.oracle_reputation(&ids[0]), Some(100));
    assert_eq!(engine.oracle_stake(&ids[0]), Some(500));
}

#[test]
fn payout_and_price_validity_reads() {
    let engine = engine();
    let ids: Vec<_> = ["A", "B", "C"].iter().map(|n| enroll(&engine, n)).collect();
    let x = asset("X");
    assert_eq!(engine.estimate_payout(ids.len() as u64), 33);
    assert_eq!(engine.estimate_payout(0), 0);
    assert!(!engine.is_price_valid(&x, 1000, 10));

    for id in &ids {
        engine.submit(id, &x, 1000).expect("submit");
    }
    engine.finalize_consensus(&x).expect("finalize");
    assert!(engine.is_price_valid(&x, 1100, 10));
    assert!(engine.is_price_valid(&x, 900, 10));
    assert!(!engine.is_price_valid(&x, 1101, 10));
}

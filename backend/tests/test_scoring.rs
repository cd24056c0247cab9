//! Tests for the scoring engine and tie-break ranking

use chrono::NaiveDate;
use fleet_induction_core::{OperationalStatus, ScoringEngine, Train};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// A freshly serviced train: full balance variance, as settled on import
fn train(id: &str) -> Train {
    let mut t = Train::new(id, date());
    t.mileage.balance_variance = 10_000.0;
    t
}

fn engine() -> ScoringEngine {
    ScoringEngine::new(10_000.0)
}

#[test]
fn test_pristine_train_score() {
    assert_eq!(engine().score(&train("T1")), 85.0);
}

#[test]
fn test_invalid_certificate_scores_zero() {
    let mut t = train("T1");
    t.certificates.telecom.valid = false;
    assert_eq!(engine().score(&t), 0.0);
}

#[test]
fn test_job_card_penalties() {
    let mut t = train("T1");
    t.job_cards.open = 1;
    t.job_cards.refresh_status();
    // lose 5 for open status and 2 for one open card
    assert_eq!(engine().score(&t), 78.0);

    t.job_cards.open = 4;
    assert_eq!(engine().score(&t), 75.0);
}

#[test]
fn test_branding_rewards_unfinished_campaigns() {
    let mut t = train("T1");
    t.branding.active = true;
    t.branding.campaign_id = Some("CMP-00001".to_string());
    t.branding.exposure_target = 100.0;
    t.branding.exposure_accrued = 50.0;
    assert_eq!(engine().score(&t), 91.5);
}

#[test]
fn test_wear_mileage_and_stabling_terms() {
    let mut t = train("T1");
    t.wear.brakepad_pct = 45.0; // -4
    t.wear.hvac_pct = 12.0; // -1
    t.mileage.total_km = 60_000.0; // -2.5
    t.mileage.balance_variance = 2_500.0; // +2.5
    t.stabling.assign(1, 2); // -3
    t.decision.status = OperationalStatus::Standby; // -2

    assert_eq!(engine().score(&t), 75.0);
}

#[test]
fn test_cleaning_required_costs_ten() {
    let mut t = train("T1");
    t.cleaning.required = true;
    assert_eq!(engine().score(&t), 75.0);
}

#[test]
fn test_rank_is_permutation_ordered_by_score() {
    let mut trains: Vec<Train> = (0..6).map(|i| train(&format!("T{}", i))).collect();
    trains[1].wear.brakepad_pct = 30.0;
    trains[3].certificates.signalling.valid = false;
    trains[4].cleaning.required = true;

    let ranking = engine().rank(&trains);
    let mut ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);

    for pair in ranking.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(ranking.last().map(|r| r.train_id.as_str()), Some("T3"));
}

#[test]
fn test_tie_break_levels() {
    // Equal scores, distinguished only by the tie-break key
    let mut a = train("A");
    let mut b = train("B");
    let c = train("C");

    // balance variance of 10 000 and 9 000 both score 0 balance points
    a.mileage.balance_variance = 9_000.0;
    b.mileage.balance_variance = 9_500.0;

    let ranking = engine().rank(&[c, b, a]);
    let ids: Vec<&str> = ranking.iter().map(|r| r.train_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn test_exact_ties_keep_fleet_order() {
    let trains: Vec<Train> = ["X", "Y", "Z"].iter().map(|id| train(id)).collect();
    let ranking = engine().rank(&trains);
    let ids: Vec<&str> = ranking.iter().map(|r| r.train_id.as_str()).collect();
    assert_eq!(ids, vec!["X", "Y", "Z"]);
}

#[test]
fn test_apply_writes_decisions() {
    let mut trains: Vec<Train> = (0..3).map(|i| train(&format!("T{}", i))).collect();
    trains[0].wear.hvac_pct = 50.0;

    let ranking = engine().apply(&mut trains);

    assert_eq!(trains[0].decision.rank, 3);
    assert_eq!(trains[0].decision.score, 80.0);
    assert_eq!(trains[1].decision.rank, 1);
    assert_eq!(ranking[0].index, 1);
}

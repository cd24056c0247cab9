//! Tests for checkpoint save/restore
//!
//! CRITICAL: a paused and resumed run must match an unbroken run exactly.

use chrono::{Duration, NaiveDate};
use fleet_induction_core::orchestrator::{validate_state, CheckpointError};
use fleet_induction_core::{
    DayOrchestrator, FleetCheckpoint, SimulationConfig, SimulationError, SlotStatus, Train,
};

fn config(days: usize) -> SimulationConfig {
    let mut config = SimulationConfig {
        days,
        rng_seed: 2024,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        ..Default::default()
    };
    config.branding.cadence_days = 3;
    config.branding.start_probability = 0.4;
    config
}

fn fleet() -> Vec<Train> {
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    (0..18)
        .map(|i| {
            let mut t = Train::new(format!("TS-{:02}", i + 1), start);
            t.cleaning.last_cleaned = start - Duration::days(i as i64);
            t.wear.brakepad_pct = 70.0 + i as f64;
            t
        })
        .collect()
}

#[test]
fn test_resumed_run_matches_unbroken_run() {
    let mut unbroken = DayOrchestrator::new(config(10), fleet()).unwrap();
    let full = unbroken.run().unwrap();

    let mut first_half = DayOrchestrator::new(config(10), fleet()).unwrap();
    for _ in 0..5 {
        first_half.run_day().unwrap();
    }
    let json = first_half.checkpoint().unwrap().to_json().unwrap();

    let checkpoint = FleetCheckpoint::from_json(&json).unwrap();
    assert_eq!(checkpoint.run_id, first_half.run_id());
    let mut resumed = DayOrchestrator::restore(config(10), checkpoint).unwrap();
    assert_eq!(resumed.current_day(), 5);

    let second_half = resumed.run().unwrap();
    assert_eq!(second_half.days.len(), 5);
    assert_eq!(second_half.days[..], full.days[5..]);
}

#[test]
fn test_checkpoint_can_extend_run() {
    let mut orchestrator = DayOrchestrator::new(config(3), fleet()).unwrap();
    orchestrator.run().unwrap();
    let checkpoint = orchestrator.checkpoint().unwrap();

    let mut extended = DayOrchestrator::restore(config(6), checkpoint).unwrap();
    let report = extended.run().unwrap();
    assert_eq!(report.days.first().map(|d| d.day), Some(4));
    assert_eq!(report.days.len(), 3);
}

#[test]
fn test_restore_rejects_different_config() {
    let mut orchestrator = DayOrchestrator::new(config(4), fleet()).unwrap();
    orchestrator.run_day().unwrap();
    let checkpoint = orchestrator.checkpoint().unwrap();

    let mut other = config(4);
    other.rng_seed = 1;
    let err = DayOrchestrator::restore(other, checkpoint).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Checkpoint(CheckpointError::ConfigMismatch { .. })
    ));
}

#[test]
fn test_validate_state_detects_inconsistencies() {
    let mut orchestrator = DayOrchestrator::new(config(2), fleet()).unwrap();
    orchestrator.run_day().unwrap();
    let state = orchestrator.state().clone();
    assert!(validate_state(&state).is_ok());

    let mut duplicated = state.clone();
    let copy = duplicated.trains[0].clone();
    duplicated.trains.push(copy);
    assert!(matches!(
        validate_state(&duplicated),
        Err(CheckpointError::InvalidState(_))
    ));

    let mut phantom = state;
    let free = phantom
        .trains
        .iter_mut()
        .find(|t| t.cleaning.slot_status == SlotStatus::Free)
        .unwrap();
    free.cleaning.occupy(SlotStatus::Booked, "BAY_99".to_string());
    assert!(matches!(
        validate_state(&phantom),
        Err(CheckpointError::InvalidState(_))
    ));
}

#[test]
fn test_corrupt_json_rejected() {
    assert!(matches!(
        FleetCheckpoint::from_json("{ not json"),
        Err(CheckpointError::Serialization(_))
    ));
}

//! Tests for mileage, wear and maintenance completion

use chrono::NaiveDate;
use fleet_induction_core::orchestrator::{MileageConfig, WearConfig};
use fleet_induction_core::{Event, MaintenanceKind, Train};

fn train() -> Train {
    Train::new("TS-01", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
}

fn step(t: &mut Train, day: usize) -> Vec<MaintenanceKind> {
    fleet_induction_core::wear::advance(
        t,
        day,
        &MileageConfig::default(),
        &WearConfig::default(),
        &mut Vec::new(),
    )
}

#[test]
fn test_mileage_accrues_regardless_of_status() {
    let mut t = train();
    t.decision.status = fleet_induction_core::OperationalStatus::Standby;
    for day in 1..=10 {
        step(&mut t, day);
    }
    assert!((t.mileage.total_km - 4369.6).abs() < 1e-6);
    assert!((t.mileage.since_service_km - 4369.6).abs() < 1e-6);
    assert!((t.mileage.balance_variance - 5630.4).abs() < 1e-6);
}

#[test]
fn test_wear_caps_at_hundred() {
    let mut t = train();
    t.wear.brakepad_pct = 99.9;
    t.wear.hvac_pct = 100.0;
    step(&mut t, 1);
    assert_eq!(t.wear.brakepad_pct, 100.0);
    assert_eq!(t.wear.hvac_pct, 100.0);
}

#[test]
fn test_service_completion_resets_since_service() {
    let mut t = train();
    t.mileage.total_km = 50_000.0;
    t.mileage.since_service_km = 10_200.0;
    t.arm_task(MaintenanceKind::Service, 1);

    let completed = step(&mut t, 1);

    assert_eq!(completed, vec![MaintenanceKind::Service]);
    assert_eq!(t.mileage.since_service_km, 0.0);
    assert!((t.mileage.total_km - 50_436.96).abs() < 1e-6);
    assert_eq!(t.mileage.balance_variance, 10_000.0);
    assert!(!t.has_active_task());
}

#[test]
fn test_brakepad_task_counts_down_then_resets() {
    let mut t = train();
    t.wear.brakepad_pct = 85.0;
    t.wear.hvac_pct = 40.0;
    t.arm_task(MaintenanceKind::Brakepad, 2);

    assert!(step(&mut t, 1).is_empty());
    assert!((t.wear.brakepad_pct - 85.27).abs() < 1e-9);
    assert_eq!(t.maintenance[0].days_remaining, 1);

    assert_eq!(step(&mut t, 2), vec![MaintenanceKind::Brakepad]);
    assert_eq!(t.wear.brakepad_pct, 0.0);
    // only the matching field resets
    assert!((t.wear.hvac_pct - 40.32).abs() < 1e-9);
}

#[test]
fn test_completion_event_logged_once() {
    let mut t = train();
    t.arm_task(MaintenanceKind::Hvac, 1);
    let mut events = Vec::new();
    for day in 1..=3 {
        fleet_induction_core::wear::advance(
            &mut t,
            day,
            &MileageConfig::default(),
            &WearConfig::default(),
            &mut events,
        );
    }
    let completions = events
        .iter()
        .filter(|e| matches!(e, Event::MaintenanceCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
}

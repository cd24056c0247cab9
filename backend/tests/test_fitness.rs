//! Tests for certificate expiry and renewal

use chrono::{Duration, NaiveDate};
use fleet_induction_core::orchestrator::FitnessConfig;
use fleet_induction_core::{CertificateKind, Event, FitnessTracker, Train};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

/// Run the tracker over `days` consecutive days starting at `start()`
fn run(tracker: &mut FitnessTracker, train: &mut Train, days: usize) -> Vec<Event> {
    let config = FitnessConfig::default();
    let mut events = Vec::new();
    for day in 1..=days {
        let today = start() + Duration::days(day as i64 - 1);
        tracker.advance(train, day, today, &config, &mut events);
    }
    events
}

fn expiring_train() -> Train {
    let mut train = Train::new("TS-01", start());
    // expired the day before day 1
    train.certificates.rolling_stock.expiry_date = start() - Duration::days(1);
    train
}

#[test]
fn test_expiry_invalidates_certificate() {
    let mut tracker = FitnessTracker::new();
    let mut train = expiring_train();

    let events = run(&mut tracker, &mut train, 1);

    assert!(!train.certificates.rolling_stock.valid);
    assert_eq!(tracker.failure_count("TS-01", CertificateKind::RollingStock), Some(0));
    assert!(matches!(events[0], Event::CertificateExpired { day: 1, .. }));
}

#[test]
fn test_rolling_stock_renewed_after_four_invalid_days() {
    let mut tracker = FitnessTracker::new();
    let mut train = expiring_train();

    run(&mut tracker, &mut train, 4);
    assert!(!train.certificates.rolling_stock.valid, "still invalid on day 4");

    let mut events = Vec::new();
    let day5 = start() + Duration::days(4);
    tracker.advance(&mut train, 5, day5, &FitnessConfig::default(), &mut events);

    let day4 = day5 - Duration::days(1);
    assert!(train.certificates.rolling_stock.valid);
    assert_eq!(train.certificates.rolling_stock.expiry_date, day4 + Duration::days(730));
    assert_eq!(tracker.failure_count("TS-01", CertificateKind::RollingStock), None);
    assert_eq!(tracker.tracked_trains(), 0);
    assert!(matches!(events[0], Event::CertificateRenewed { day: 5, .. }));
}

#[test]
fn test_signalling_and_telecom_windows() {
    let mut tracker = FitnessTracker::new();
    let mut train = Train::new("TS-02", start());
    train.certificates.signalling.valid = false;
    train.certificates.telecom.valid = false;

    run(&mut tracker, &mut train, 5);
    assert!(!train.certificates.signalling.valid);
    assert!(!train.certificates.telecom.valid);

    run_from(&mut tracker, &mut train, 6);
    let day5 = start() + Duration::days(4);
    assert!(train.certificates.signalling.valid);
    assert_eq!(train.certificates.signalling.expiry_date, day5 + Duration::days(1825));
    assert!(train.certificates.telecom.valid);
    assert_eq!(train.certificates.telecom.expiry_date, day5 + Duration::days(1460));
}

fn run_from(tracker: &mut FitnessTracker, train: &mut Train, day: usize) {
    let today = start() + Duration::days(day as i64 - 1);
    tracker.advance(train, day, today, &FitnessConfig::default(), &mut Vec::new());
}

#[test]
fn test_valid_certificates_untouched() {
    let mut tracker = FitnessTracker::new();
    let mut train = Train::new("TS-03", start());
    let before = train.certificates.clone();

    let events = run(&mut tracker, &mut train, 30);

    assert_eq!(train.certificates, before);
    assert!(events.is_empty());
    assert_eq!(tracker.tracked_trains(), 0);
}

#[test]
fn test_certificates_fail_independently() {
    let mut tracker = FitnessTracker::new();
    let mut train = expiring_train();
    train.certificates.telecom.valid = false;

    run(&mut tracker, &mut train, 3);

    assert_eq!(tracker.failure_count("TS-01", CertificateKind::RollingStock), Some(2));
    assert_eq!(tracker.failure_count("TS-01", CertificateKind::Telecom), Some(2));
    assert_eq!(tracker.failure_count("TS-01", CertificateKind::Signalling), None);
}

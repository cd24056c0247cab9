//! Mileage and wear progression
//!
//! Runs once per train per day, independent of operational status:
//! 1. Every active maintenance task counts down one day; finished tasks are
//!    removed and their reset is applied once.
//! 2. Total and since-service mileage grow by the daily increment. A
//!    completed service task zeroes the since-service counter instead.
//! 3. Brakepad and HVAC wear grow by their daily rate, capped at 100 %,
//!    unless the matching task completed today (reset to 0).

use crate::models::{Event, MaintenanceKind, Train};
use crate::orchestrator::config::{MileageConfig, WearConfig};
use tracing::debug;

const MAX_WEAR_PCT: f64 = 100.0;

/// Advance one train by one day; returns the task kinds completed today
pub fn advance(
    train: &mut Train,
    day: usize,
    mileage: &MileageConfig,
    wear: &WearConfig,
    events: &mut Vec<Event>,
) -> Vec<MaintenanceKind> {
    let mut completed = Vec::new();
    train.maintenance.retain_mut(|task| {
        if task.tick() {
            completed.push(task.kind);
            false
        } else {
            true
        }
    });

    for kind in &completed {
        debug!(train = %train.id(), %kind, "maintenance completed");
        events.push(Event::MaintenanceCompleted {
            day,
            train_id: train.id().to_string(),
            kind: *kind,
        });
    }

    let done = |kind: MaintenanceKind| completed.contains(&kind);

    train.mileage.total_km += mileage.daily_increment_km;
    train.mileage.since_service_km = if done(MaintenanceKind::Service) {
        0.0
    } else {
        train.mileage.since_service_km + mileage.daily_increment_km
    };
    train.mileage.rebalance(mileage.service_interval_km);

    train.wear.brakepad_pct = if done(MaintenanceKind::Brakepad) {
        0.0
    } else {
        (train.wear.brakepad_pct + wear.brakepad_daily_pct).min(MAX_WEAR_PCT)
    };
    train.wear.hvac_pct = if done(MaintenanceKind::Hvac) {
        0.0
    } else {
        (train.wear.hvac_pct + wear.hvac_daily_pct).min(MAX_WEAR_PCT)
    };

    completed
}

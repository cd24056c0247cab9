//! Job card ledger
//!
//! Every day, opens one job card per condition that holds, arms the matching
//! maintenance task, then closes at most one card.
//!
//! Conditions:
//! - each invalid certificate (arms a `general` task)
//! - brakepad wear above threshold (arms `brakepad`)
//! - HVAC wear above threshold (arms `hvac`)
//! - mileage since service at or above the service interval (arms `service`)
//! - cleaning required (no task)
//!
//! A condition opens a card on every day it holds. Arming is idempotent: a
//! task already running is left alone, so two invalid certificates open two
//! cards but share one `general` task.

use crate::models::{CertificateKind, Event, MaintenanceKind, Train};
use crate::orchestrator::config::SimulationConfig;
use chrono::NaiveDate;
use tracing::debug;

/// Why a job card was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Certificate(CertificateKind),
    BrakepadWear,
    HvacWear,
    ServiceDue,
    Cleaning,
}

impl Trigger {
    pub fn task(&self) -> Option<MaintenanceKind> {
        match self {
            Trigger::Certificate(_) => Some(MaintenanceKind::General),
            Trigger::BrakepadWear => Some(MaintenanceKind::Brakepad),
            Trigger::HvacWear => Some(MaintenanceKind::Hvac),
            Trigger::ServiceDue => Some(MaintenanceKind::Service),
            Trigger::Cleaning => None,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Trigger::Certificate(kind) => format!("{} certificate invalid", kind),
            Trigger::BrakepadWear => "brakepad wear".to_string(),
            Trigger::HvacWear => "hvac wear".to_string(),
            Trigger::ServiceDue => "service due".to_string(),
            Trigger::Cleaning => "cleaning".to_string(),
        }
    }
}

/// Conditions holding for `train` today
pub fn triggers(train: &Train, config: &SimulationConfig) -> Vec<Trigger> {
    let mut fired: Vec<Trigger> = train
        .certificates
        .invalid_kinds()
        .into_iter()
        .map(Trigger::Certificate)
        .collect();

    if train.wear.brakepad_pct > config.wear.brakepad_threshold_pct {
        fired.push(Trigger::BrakepadWear);
    }
    if train.wear.hvac_pct > config.wear.hvac_threshold_pct {
        fired.push(Trigger::HvacWear);
    }
    if train.mileage.since_service_km >= config.mileage.service_interval_km {
        fired.push(Trigger::ServiceDue);
    }
    if train.cleaning.required {
        fired.push(Trigger::Cleaning);
    }
    fired
}

/// Run the ledger for one train for one day
pub fn advance(
    train: &mut Train,
    day: usize,
    today: NaiveDate,
    config: &SimulationConfig,
    events: &mut Vec<Event>,
) {
    let train_id = train.id().to_string();

    for trigger in triggers(train, config) {
        train.job_cards.open += 1;
        events.push(Event::JobCardOpened {
            day,
            train_id: train_id.clone(),
            reason: trigger.reason(),
            open: train.job_cards.open,
        });

        if let Some(kind) = trigger.task() {
            let duration = config.maintenance.duration(kind);
            if train.arm_task(kind, duration) {
                debug!(train = %train_id, %kind, duration, "maintenance armed");
                events.push(Event::MaintenanceArmed {
                    day,
                    train_id: train_id.clone(),
                    kind,
                    duration_days: duration,
                });
            }
        }
    }

    if train.job_cards.open > 0 {
        train.job_cards.open -= 1;
        train.job_cards.closed += 1;
        if train.job_cards.open == 0 {
            train.job_cards.last_update = today;
        }
        events.push(Event::JobCardClosed {
            day,
            train_id,
            open: train.job_cards.open,
            closed: train.job_cards.closed,
        });
    }

    train.job_cards.refresh_status();
}

//! Minimum in-service enforcement
//!
//! If fewer than `min_in_service` trains are In_Service after the policy
//! pass, candidates are promoted in two groups, each in preliminary-rank
//! order:
//!
//! 1. Standby trains whose certificates are all valid
//! 2. Under_Maintenance trains with valid certificates, no open job cards,
//!    wear below both thresholds and not being cleaned
//!
//! Promotion stops when the minimum is met or no candidate remains.

use crate::models::{Event, OperationalStatus, SlotStatus, Train};
use crate::orchestrator::config::SimulationConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of quota enforcement for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaOutcome {
    pub required: usize,
    pub achieved: usize,
    /// IDs of promoted trains, in promotion order
    pub promoted: Vec<String>,
}

impl QuotaOutcome {
    pub fn is_shortfall(&self) -> bool {
        self.achieved < self.required
    }
}

fn standby_candidate(train: &Train) -> bool {
    train.decision.status == OperationalStatus::Standby && train.certificates.all_valid()
}

fn maintenance_candidate(train: &Train, config: &SimulationConfig) -> bool {
    train.decision.status == OperationalStatus::UnderMaintenance
        && train.certificates.all_valid()
        && train.job_cards.open == 0
        && train.wear.brakepad_pct < config.wear.brakepad_threshold_pct
        && train.wear.hvac_pct < config.wear.hvac_threshold_pct
        && train.cleaning.slot_status != SlotStatus::InProgress
}

/// Promote trains until the in-service minimum holds
///
/// `order` holds fleet indices in preliminary-rank order.
pub fn enforce_minimum(
    trains: &mut [Train],
    order: &[usize],
    day: usize,
    config: &SimulationConfig,
    events: &mut Vec<Event>,
) -> QuotaOutcome {
    let required = config.quota.min_in_service;
    let mut achieved = trains
        .iter()
        .filter(|t| t.decision.status == OperationalStatus::InService)
        .count();
    let mut promoted = Vec::new();

    let standby: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| standby_candidate(&trains[i]))
        .collect();
    let maintenance: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&i| maintenance_candidate(&trains[i], config))
        .collect();

    for index in standby.into_iter().chain(maintenance) {
        if achieved >= required {
            break;
        }
        let train = &mut trains[index];
        let from = train.decision.status;
        train.decision.status = OperationalStatus::InService;
        achieved += 1;

        debug!(train = %train.id(), %from, "promoted to meet service quota");
        events.push(Event::StatusPromoted {
            day,
            train_id: train.id().to_string(),
            from,
        });
        promoted.push(train.id().to_string());
    }

    let outcome = QuotaOutcome {
        required,
        achieved,
        promoted,
    };
    if outcome.is_shortfall() {
        warn!(day, required, achieved, "in-service quota not met");
    }
    outcome
}

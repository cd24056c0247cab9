//! Status Policy Module
//!
//! This module defines the interface for the daily status decision.
//!
//! # Overview
//!
//! Once the per-train simulators have run, every train needs one of three
//! statuses for the day: In_Service, Standby or Under_Maintenance. The
//! decision is made by a pluggable [`StatusPolicy`], called once per train in
//! preliminary-rank order. Two fleet-wide rules are then applied on top of
//! whatever the policy proposed:
//!
//! 1. **Certificate safety**: In_Service proposed for a train with an invalid
//!    certificate is replaced by Standby (see [`enforce_certificate_safety`])
//! 2. **Service quota**: if fewer than the minimum trains are In_Service,
//!    eligible trains are promoted (see [`quota::enforce_minimum`])
//!
//! # Policy Interface
//!
//! ```rust
//! use fleet_induction_core::models::{OperationalStatus, Train};
//! use fleet_induction_core::policy::{FeatureVector, PolicyContext, StatusPolicy};
//!
//! struct AlwaysStandby;
//!
//! impl StatusPolicy for AlwaysStandby {
//!     fn name(&self) -> &str {
//!         "always_standby"
//!     }
//!
//!     fn decide(
//!         &mut self,
//!         _train: &Train,
//!         _features: &FeatureVector,
//!         _ctx: &PolicyContext<'_>,
//!     ) -> OperationalStatus {
//!         OperationalStatus::Standby
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **RuleChainPolicy**: the reference priority-ordered rule chain
//! 2. **FixedStatusPolicy**: the same status for every train
//! 3. **ActionIndexPolicy**: adapter for external decision-makers that map a
//!    feature vector to an action index (0/1/2)

use crate::models::{Event, OperationalStatus, Train};
use crate::orchestrator::config::{PolicyConfig, SimulationConfig};
use chrono::NaiveDate;
use tracing::debug;

pub mod action;
pub mod features;
pub mod fixed;
pub mod quota;
pub mod rules;

pub use action::ActionIndexPolicy;
pub use features::{FeatureVector, FEATURE_NAMES};
pub use fixed::FixedStatusPolicy;
pub use quota::{enforce_minimum, QuotaOutcome};
pub use rules::{RuleChainPolicy, StatusRule, REFERENCE_RULES};

/// Read-only context handed to the policy for each decision
#[derive(Debug, Clone)]
pub struct PolicyContext<'a> {
    pub day: usize,
    pub today: NaiveDate,
    pub config: &'a SimulationConfig,
    /// Trains already assigned In_Service earlier in this pass
    pub in_service_so_far: usize,
    /// Shunting moves of the trains assigned In_Service so far
    pub shunting_so_far: u32,
    /// Zero-based position of this train in the assignment order
    pub position: usize,
    pub fleet_size: usize,
}

/// Daily status decision-maker
pub trait StatusPolicy {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Propose a status for one train
    fn decide(
        &mut self,
        train: &Train,
        features: &FeatureVector,
        ctx: &PolicyContext<'_>,
    ) -> OperationalStatus;
}

/// Instantiate the policy selected by configuration
pub fn build_policy(config: &PolicyConfig) -> Box<dyn StatusPolicy> {
    match config {
        PolicyConfig::RuleChain => Box::new(RuleChainPolicy::new()),
        PolicyConfig::Fixed { status } => Box::new(FixedStatusPolicy::new(*status)),
    }
}

/// Replace In_Service by Standby for a train with an invalid certificate
///
/// Logs a `PolicyOverride` event when the proposal is changed.
pub fn enforce_certificate_safety(
    train: &Train,
    proposed: OperationalStatus,
    day: usize,
    events: &mut Vec<Event>,
) -> OperationalStatus {
    if proposed != OperationalStatus::InService || train.certificates.all_valid() {
        return proposed;
    }
    let applied = OperationalStatus::Standby;
    debug!(train = %train.id(), %proposed, %applied, "policy override");
    events.push(Event::PolicyOverride {
        day,
        train_id: train.id().to_string(),
        proposed,
        applied,
    });
    applied
}

/// Run `policy` over the fleet in `order` and write the applied statuses
///
/// `order` holds fleet indices, normally the preliminary ranking.
pub fn assign_statuses(
    trains: &mut [Train],
    order: &[usize],
    policy: &mut dyn StatusPolicy,
    day: usize,
    today: NaiveDate,
    config: &SimulationConfig,
    events: &mut Vec<Event>,
) {
    let mut in_service_so_far = 0;
    let mut shunting_so_far = 0;

    for (position, &index) in order.iter().enumerate() {
        let ctx = PolicyContext {
            day,
            today,
            config,
            in_service_so_far,
            shunting_so_far,
            position,
            fleet_size: trains.len(),
        };
        let train = &trains[index];
        let features = FeatureVector::encode(train, &ctx);
        let proposed = policy.decide(train, &features, &ctx);
        let applied = enforce_certificate_safety(train, proposed, day, events);

        if applied == OperationalStatus::InService {
            in_service_so_far += 1;
            shunting_so_far += train.stabling.shunting_moves;
        }
        trains[index].decision.status = applied;
    }
}

//! Fixed-status policy
//!
//! Proposes the same status for every train. Useful as a baseline and for
//! exercising the fleet-wide rules: with `Standby` everywhere, every
//! In_Service train at the end of the day was put there by quota
//! enforcement.

use super::{FeatureVector, PolicyContext, StatusPolicy};
use crate::models::{OperationalStatus, Train};

/// Fixed-status policy
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use fleet_induction_core::models::{OperationalStatus, Train};
/// use fleet_induction_core::policy::{FeatureVector, FixedStatusPolicy, PolicyContext, StatusPolicy};
/// use fleet_induction_core::SimulationConfig;
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let config = SimulationConfig::default();
/// let ctx = PolicyContext {
///     day: 1,
///     today,
///     config: &config,
///     in_service_so_far: 0,
///     shunting_so_far: 0,
///     position: 0,
///     fleet_size: 1,
/// };
/// let train = Train::new("TS-01", today);
/// let features = FeatureVector::encode(&train, &ctx);
///
/// let mut policy = FixedStatusPolicy::new(OperationalStatus::Standby);
/// assert_eq!(policy.decide(&train, &features, &ctx), OperationalStatus::Standby);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedStatusPolicy {
    status: OperationalStatus,
}

impl FixedStatusPolicy {
    pub fn new(status: OperationalStatus) -> Self {
        Self { status }
    }

    pub fn status(&self) -> OperationalStatus {
        self.status
    }
}

impl StatusPolicy for FixedStatusPolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn decide(
        &mut self,
        _train: &Train,
        _features: &FeatureVector,
        _ctx: &PolicyContext<'_>,
    ) -> OperationalStatus {
        self.status
    }
}

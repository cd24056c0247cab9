//! Reference rule chain
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. any certificate invalid → Standby
//! 2. cleaning in progress → Under_Maintenance
//! 3. brakepad wear at or above threshold → Under_Maintenance
//! 4. HVAC wear at or above threshold → Under_Maintenance
//! 5. maintenance task running → Under_Maintenance
//! 6. otherwise → In_Service

use super::{FeatureVector, PolicyContext, StatusPolicy};
use crate::models::{OperationalStatus, SlotStatus, Train};
use crate::orchestrator::config::SimulationConfig;
use std::fmt;

/// One entry of a rule chain
#[derive(Clone, Copy)]
pub struct StatusRule {
    pub name: &'static str,
    pub applies: fn(&Train, &SimulationConfig) -> bool,
    pub outcome: OperationalStatus,
}

impl fmt::Debug for StatusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRule")
            .field("name", &self.name)
            .field("outcome", &self.outcome)
            .finish()
    }
}

fn certificate_invalid(train: &Train, _: &SimulationConfig) -> bool {
    !train.certificates.all_valid()
}

fn cleaning_in_progress(train: &Train, _: &SimulationConfig) -> bool {
    train.cleaning.slot_status == SlotStatus::InProgress
}

fn brakepad_worn(train: &Train, config: &SimulationConfig) -> bool {
    train.wear.brakepad_pct >= config.wear.brakepad_threshold_pct
}

fn hvac_worn(train: &Train, config: &SimulationConfig) -> bool {
    train.wear.hvac_pct >= config.wear.hvac_threshold_pct
}

fn maintenance_active(train: &Train, _: &SimulationConfig) -> bool {
    train.has_active_task()
}

fn always(_: &Train, _: &SimulationConfig) -> bool {
    true
}

/// The reference chain; the final rule always matches
pub const REFERENCE_RULES: &[StatusRule] = &[
    StatusRule {
        name: "certificate_invalid",
        applies: certificate_invalid,
        outcome: OperationalStatus::Standby,
    },
    StatusRule {
        name: "cleaning_in_progress",
        applies: cleaning_in_progress,
        outcome: OperationalStatus::UnderMaintenance,
    },
    StatusRule {
        name: "brakepad_worn",
        applies: brakepad_worn,
        outcome: OperationalStatus::UnderMaintenance,
    },
    StatusRule {
        name: "hvac_worn",
        applies: hvac_worn,
        outcome: OperationalStatus::UnderMaintenance,
    },
    StatusRule {
        name: "maintenance_active",
        applies: maintenance_active,
        outcome: OperationalStatus::UnderMaintenance,
    },
    StatusRule {
        name: "default",
        applies: always,
        outcome: OperationalStatus::InService,
    },
];

/// First matching rule of `rules` for `train`
///
/// Falls back to In_Service when no rule matches.
pub fn resolve<'r>(
    rules: &'r [StatusRule],
    train: &Train,
    config: &SimulationConfig,
) -> (OperationalStatus, &'r str) {
    rules
        .iter()
        .find(|rule| (rule.applies)(train, config))
        .map(|rule| (rule.outcome, rule.name))
        .unwrap_or((OperationalStatus::InService, "default"))
}

/// Policy backed by an ordered rule slice
pub struct RuleChainPolicy {
    rules: &'static [StatusRule],
}

impl RuleChainPolicy {
    pub fn new() -> Self {
        Self {
            rules: REFERENCE_RULES,
        }
    }

    pub fn with_rules(rules: &'static [StatusRule]) -> Self {
        Self { rules }
    }
}

impl Default for RuleChainPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPolicy for RuleChainPolicy {
    fn name(&self) -> &str {
        "rule_chain"
    }

    fn decide(
        &mut self,
        train: &Train,
        _features: &FeatureVector,
        ctx: &PolicyContext<'_>,
    ) -> OperationalStatus {
        resolve(self.rules, train, ctx.config).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaintenanceKind;
    use chrono::NaiveDate;

    fn check(train: &Train) -> (OperationalStatus, &'static str) {
        resolve(REFERENCE_RULES, train, &SimulationConfig::default())
    }

    fn train() -> Train {
        Train::new("T1", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn test_default_is_in_service() {
        assert_eq!(check(&train()), (OperationalStatus::InService, "default"));
    }

    #[test]
    fn test_certificate_rule_wins_over_maintenance() {
        let mut t = train();
        t.certificates.telecom.valid = false;
        t.wear.brakepad_pct = 95.0;
        t.arm_task(MaintenanceKind::Brakepad, 2);
        assert_eq!(check(&t), (OperationalStatus::Standby, "certificate_invalid"));
    }

    #[test]
    fn test_wear_thresholds_are_inclusive() {
        let mut t = train();
        t.wear.brakepad_pct = 80.0;
        assert_eq!(check(&t).1, "brakepad_worn");

        let mut t = train();
        t.wear.hvac_pct = 89.99;
        assert_eq!(check(&t).0, OperationalStatus::InService);
        t.wear.hvac_pct = 90.0;
        assert_eq!(check(&t).1, "hvac_worn");
    }

    #[test]
    fn test_booked_cleaning_does_not_block_service() {
        let mut t = train();
        t.cleaning.occupy(SlotStatus::Booked, "BAY_05".to_string());
        assert_eq!(check(&t).0, OperationalStatus::InService);
        t.cleaning.occupy(SlotStatus::InProgress, "BAY_01".to_string());
        assert_eq!(check(&t), (OperationalStatus::UnderMaintenance, "cleaning_in_progress"));
    }

    #[test]
    fn test_running_task_means_maintenance() {
        let mut t = train();
        t.arm_task(MaintenanceKind::General, 1);
        assert_eq!(check(&t).1, "maintenance_active");
    }
}

//! Numeric feature encoding for external decision-makers
//!
//! Every train field is encoded as an `f64`, led by the preliminary score and
//! rank and followed by three context values describing progress through the
//! day's assignment pass. `OperationalStatus` is the status held coming into
//! the day, as its action index. The layout is fixed; [`FEATURE_NAMES`] lists
//! it in order.

use crate::models::{SlotStatus, Train};
use crate::policy::PolicyContext;
use chrono::NaiveDate;

/// Names of the encoded features, in vector order
pub const FEATURE_NAMES: [&str; 32] = [
    "Score",
    "Rank",
    "RollingStockFitnessStatus",
    "SignallingFitnessStatus",
    "TelecomFitnessStatus",
    "SignallingFitnessExpiryDays",
    "TelecomFitnessExpiryDays",
    "RollingStockFitnessExpiryDays",
    "JobCardStatusOpen",
    "OpenJobCards",
    "ClosedJobCards",
    "LastJobCardUpdateDays",
    "BrandingActive",
    "ExposureHoursAccrued",
    "ExposureHoursTarget",
    "ExposureDailyQuota",
    "TotalMileageKM",
    "MileageSinceLastServiceKM",
    "MileageBalanceVariance",
    "MileageBalanceAbs",
    "BrakepadWear%",
    "HVACWear%",
    "CleaningRequired",
    "CleaningSlotStatus",
    "BayPositionID",
    "ShuntingMovesRequired",
    "StablingSequenceOrder",
    "OperationalStatus",
    "JobCardPriority",
    "RemainingServiceQuota",
    "ShuntingCostSoFar",
    "AssignmentProgress",
];

/// Encoded view of one train plus assignment context
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64
}

fn bool_flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn slot_code(slot: SlotStatus) -> f64 {
    match slot {
        SlotStatus::Free => 0.0,
        SlotStatus::Booked => 1.0,
        SlotStatus::InProgress => 2.0,
    }
}

impl FeatureVector {
    pub fn encode(train: &Train, ctx: &PolicyContext<'_>) -> Self {
        let today = ctx.today;
        let certs = &train.certificates;
        let quota = ctx.config.quota.min_in_service;
        let remaining = quota.saturating_sub(ctx.in_service_so_far) as f64 / quota.max(1) as f64;
        let progress = ctx.position as f64 / ctx.fleet_size.max(1) as f64;

        let values = vec![
            train.decision.score,
            train.decision.rank as f64,
            bool_flag(certs.rolling_stock.valid),
            bool_flag(certs.signalling.valid),
            bool_flag(certs.telecom.valid),
            days_between(today, certs.signalling.expiry_date),
            days_between(today, certs.telecom.expiry_date),
            days_between(today, certs.rolling_stock.expiry_date),
            bool_flag(train.job_cards.open > 0),
            f64::from(train.job_cards.open),
            f64::from(train.job_cards.closed),
            days_between(train.job_cards.last_update, today),
            bool_flag(train.branding.active),
            train.branding.exposure_accrued,
            train.branding.exposure_target,
            train.branding.daily_quota,
            train.mileage.total_km,
            train.mileage.since_service_km,
            train.mileage.balance_variance,
            train.mileage.balance_variance.abs(),
            train.wear.brakepad_pct,
            train.wear.hvac_pct,
            bool_flag(train.cleaning.required),
            slot_code(train.cleaning.slot_status),
            f64::from(train.stabling.bay_position),
            f64::from(train.stabling.shunting_moves),
            f64::from(train.stabling.sequence_order),
            f64::from(train.status().action_index()),
            f64::from(train.job_cards.priority()),
            remaining,
            f64::from(ctx.shunting_so_far),
            progress,
        ];
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values.get(i).copied())
    }
}

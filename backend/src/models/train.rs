//! Train model
//!
//! One `Train` per fleet member. The identity is fixed for the whole run;
//! every other record is mutated in place by the daily simulation.
//!
//! Each record keeps its own invariant:
//! - `Certificate`: invalid whenever the simulated date is past its expiry
//! - `JobCards`: `status == Open` exactly when `open > 0`
//! - `Branding`: `active` exactly when `campaign_id` is set
//! - `Cleaning`: `slot_status != Free` exactly when `bay_id` is set and
//!   exactly when `required`
//! - `Stabling`: `shunting_moves == sequence_order - 1`

use crate::models::maintenance::{MaintenanceKind, MaintenanceTask};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status enums
// ============================================================================

/// Daily operational status
///
/// Action indices follow the external decision-maker contract:
/// 0 = In_Service, 1 = Standby, 2 = Under_Maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalStatus {
    InService,
    Standby,
    UnderMaintenance,
}

impl OperationalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OperationalStatus::InService => "In_Service",
            OperationalStatus::Standby => "Standby",
            OperationalStatus::UnderMaintenance => "Under_Maintenance",
        }
    }

    pub fn action_index(&self) -> u8 {
        match self {
            OperationalStatus::InService => 0,
            OperationalStatus::Standby => 1,
            OperationalStatus::UnderMaintenance => 2,
        }
    }

    pub fn from_action_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(OperationalStatus::InService),
            1 => Some(OperationalStatus::Standby),
            2 => Some(OperationalStatus::UnderMaintenance),
            _ => None,
        }
    }

    /// Lenient parse of table values ("In_Service", "in service", "standby", ...)
    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "inservice" | "service" | "active" => Some(OperationalStatus::InService),
            "standby" | "stabled" | "outofservice" => Some(OperationalStatus::Standby),
            "undermaintenance" | "maintenance" => Some(OperationalStatus::UnderMaintenance),
            _ => None,
        }
    }
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cleaning slot occupancy of a train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Free,
    Booked,
    InProgress,
}

impl SlotStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Free => "free",
            SlotStatus::Booked => "booked",
            SlotStatus::InProgress => "in_progress",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "free" | "available" | "empty" => Some(SlotStatus::Free),
            "booked" | "assigned" => Some(SlotStatus::Booked),
            "inprogress" | "progress" => Some(SlotStatus::InProgress),
            _ => None,
        }
    }
}

/// Job card summary status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobCardStatus {
    Open,
    Close,
}

impl JobCardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobCardStatus::Open => "open",
            JobCardStatus::Close => "close",
        }
    }

    pub fn for_open_count(open: u32) -> Self {
        if open > 0 {
            JobCardStatus::Open
        } else {
            JobCardStatus::Close
        }
    }
}

/// The three regulatory fitness certificates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CertificateKind {
    RollingStock,
    Signalling,
    Telecom,
}

impl CertificateKind {
    pub const ALL: [CertificateKind; 3] = [
        CertificateKind::RollingStock,
        CertificateKind::Signalling,
        CertificateKind::Telecom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CertificateKind::RollingStock => "RollingStock",
            CertificateKind::Signalling => "Signalling",
            CertificateKind::Telecom => "Telecom",
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub valid: bool,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificates {
    pub rolling_stock: Certificate,
    pub signalling: Certificate,
    pub telecom: Certificate,
}

impl Certificates {
    /// All three certificates valid until `expiry_date`
    pub fn valid_until(expiry_date: NaiveDate) -> Self {
        let cert = Certificate {
            valid: true,
            expiry_date,
        };
        Self {
            rolling_stock: cert.clone(),
            signalling: cert.clone(),
            telecom: cert,
        }
    }

    pub fn get(&self, kind: CertificateKind) -> &Certificate {
        match kind {
            CertificateKind::RollingStock => &self.rolling_stock,
            CertificateKind::Signalling => &self.signalling,
            CertificateKind::Telecom => &self.telecom,
        }
    }

    pub fn get_mut(&mut self, kind: CertificateKind) -> &mut Certificate {
        match kind {
            CertificateKind::RollingStock => &mut self.rolling_stock,
            CertificateKind::Signalling => &mut self.signalling,
            CertificateKind::Telecom => &mut self.telecom,
        }
    }

    pub fn all_valid(&self) -> bool {
        CertificateKind::ALL.iter().all(|k| self.get(*k).valid)
    }

    pub fn invalid_kinds(&self) -> Vec<CertificateKind> {
        CertificateKind::ALL
            .iter()
            .copied()
            .filter(|k| !self.get(*k).valid)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCards {
    pub open: u32,
    pub closed: u32,
    pub status: JobCardStatus,
    pub last_update: NaiveDate,
}

impl JobCards {
    pub fn refresh_status(&mut self) {
        self.status = JobCardStatus::for_open_count(self.open);
    }

    /// Tie-break metric: open cards count only while the status is open
    pub fn priority(&self) -> u32 {
        match self.status {
            JobCardStatus::Open => self.open,
            JobCardStatus::Close => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mileage {
    pub total_km: f64,
    pub since_service_km: f64,
    /// `service_interval_km - since_service_km`
    pub balance_variance: f64,
}

impl Mileage {
    pub fn rebalance(&mut self, service_interval_km: f64) {
        self.balance_variance = service_interval_km - self.since_service_km;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wear {
    pub brakepad_pct: f64,
    pub hvac_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub active: bool,
    pub campaign_id: Option<String>,
    pub exposure_accrued: f64,
    pub exposure_target: f64,
    pub daily_quota: f64,
}

impl Branding {
    pub fn inactive() -> Self {
        Self {
            active: false,
            campaign_id: None,
            exposure_accrued: 0.0,
            exposure_target: 0.0,
            daily_quota: 0.0,
        }
    }

    /// Accrued/target for an active campaign with a target, otherwise 1
    pub fn completion_ratio(&self) -> f64 {
        if self.active && self.exposure_target > 0.0 {
            self.exposure_accrued / self.exposure_target
        } else {
            1.0
        }
    }

    pub fn clear(&mut self) {
        *self = Self::inactive();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleaning {
    pub required: bool,
    pub slot_status: SlotStatus,
    pub bay_id: Option<String>,
    pub last_cleaned: NaiveDate,
}

impl Cleaning {
    pub fn holds_slot(&self) -> bool {
        self.slot_status != SlotStatus::Free
    }

    pub fn days_since_cleaned(&self, today: NaiveDate) -> i64 {
        (today - self.last_cleaned).num_days()
    }

    /// Occupy a bay; keeps `required` and `bay_id` in step with the slot
    pub fn occupy(&mut self, slot_status: SlotStatus, bay_id: String) {
        self.slot_status = slot_status;
        self.required = slot_status != SlotStatus::Free;
        self.bay_id = if self.required { Some(bay_id) } else { None };
    }

    pub fn release(&mut self) {
        self.slot_status = SlotStatus::Free;
        self.required = false;
        self.bay_id = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stabling {
    pub bay_position: u32,
    pub sequence_order: u32,
    pub shunting_moves: u32,
}

impl Stabling {
    pub fn assign(&mut self, bay_position: u32, sequence_order: u32) {
        self.bay_position = bay_position;
        self.sequence_order = sequence_order.max(1);
        self.shunting_moves = self.sequence_order - 1;
    }
}

/// Outputs written by the ranking engine and the status resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub score: f64,
    /// 1-based rank; 0 until the fleet has been ranked
    pub rank: usize,
    pub status: OperationalStatus,
}

// ============================================================================
// Train
// ============================================================================

/// A fleet member
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_induction_core::Train;
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let train = Train::new("TS-01", today);
/// assert_eq!(train.id(), "TS-01");
/// assert!(train.certificates.all_valid());
/// assert!(!train.has_active_task());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    id: String,
    pub certificates: Certificates,
    pub job_cards: JobCards,
    pub mileage: Mileage,
    pub wear: Wear,
    pub branding: Branding,
    pub cleaning: Cleaning,
    pub stabling: Stabling,
    pub maintenance: Vec<MaintenanceTask>,
    pub decision: Decision,
}

impl Train {
    /// A pristine train: certificates valid for a year, no wear, no mileage,
    /// no job cards, cleaned on `today`, first in bay 1, in service
    pub fn new(id: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: id.into(),
            certificates: Certificates::valid_until(today + Duration::days(365)),
            job_cards: JobCards {
                open: 0,
                closed: 0,
                status: JobCardStatus::Close,
                last_update: today,
            },
            mileage: Mileage {
                total_km: 0.0,
                since_service_km: 0.0,
                balance_variance: 0.0,
            },
            wear: Wear {
                brakepad_pct: 0.0,
                hvac_pct: 0.0,
            },
            branding: Branding::inactive(),
            cleaning: Cleaning {
                required: false,
                slot_status: SlotStatus::Free,
                bay_id: None,
                last_cleaned: today,
            },
            stabling: Stabling {
                bay_position: 1,
                sequence_order: 1,
                shunting_moves: 0,
            },
            maintenance: Vec::new(),
            decision: Decision {
                score: 0.0,
                rank: 0,
                status: OperationalStatus::InService,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> OperationalStatus {
        self.decision.status
    }

    pub fn has_task(&self, kind: MaintenanceKind) -> bool {
        self.maintenance.iter().any(|t| t.kind == kind)
    }

    pub fn has_active_task(&self) -> bool {
        !self.maintenance.is_empty()
    }

    /// Arm a task unless one of the same kind is already running
    ///
    /// Returns true when a new task was added.
    pub fn arm_task(&mut self, kind: MaintenanceKind, days: u32) -> bool {
        if self.has_task(kind) {
            return false;
        }
        self.maintenance.push(MaintenanceTask::new(kind, days));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_status_parse_accepts_table_spellings() {
        assert_eq!(
            OperationalStatus::parse("In_Service"),
            Some(OperationalStatus::InService)
        );
        assert_eq!(
            OperationalStatus::parse(" in service "),
            Some(OperationalStatus::InService)
        );
        assert_eq!(
            OperationalStatus::parse("UNDER_MAINTENANCE"),
            Some(OperationalStatus::UnderMaintenance)
        );
        assert_eq!(OperationalStatus::parse("unknown"), None);
    }

    #[test]
    fn test_action_index_contract() {
        for status in [
            OperationalStatus::InService,
            OperationalStatus::Standby,
            OperationalStatus::UnderMaintenance,
        ] {
            assert_eq!(
                OperationalStatus::from_action_index(status.action_index()),
                Some(status)
            );
        }
        assert_eq!(OperationalStatus::from_action_index(3), None);
    }

    #[test]
    fn test_cleaning_occupy_and_release_keep_invariant() {
        let mut train = Train::new("T1", date());
        train.cleaning.occupy(SlotStatus::Booked, "BAY_04".to_string());
        assert!(train.cleaning.required);
        assert_eq!(train.cleaning.bay_id.as_deref(), Some("BAY_04"));

        train.cleaning.release();
        assert!(!train.cleaning.required);
        assert!(train.cleaning.bay_id.is_none());
        assert_eq!(train.cleaning.slot_status, SlotStatus::Free);
    }

    #[test]
    fn test_arm_task_is_idempotent_per_kind() {
        let mut train = Train::new("T1", date());
        assert!(train.arm_task(MaintenanceKind::Hvac, 2));
        assert!(!train.arm_task(MaintenanceKind::Hvac, 2));
        assert!(train.arm_task(MaintenanceKind::Service, 1));
        assert_eq!(train.maintenance.len(), 2);
    }

    #[test]
    fn test_completion_ratio_defaults_to_one() {
        let mut branding = Branding::inactive();
        assert_eq!(branding.completion_ratio(), 1.0);
        branding.active = true;
        branding.campaign_id = Some("CMP-00001".to_string());
        branding.exposure_target = 320.0;
        branding.exposure_accrued = 80.0;
        assert_eq!(branding.completion_ratio(), 0.25);
    }
}

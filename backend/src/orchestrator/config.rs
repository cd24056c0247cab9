//! Simulation configuration
//!
//! Every field has a reference default, so a JSON file only needs to name
//! the values it changes:
//!
//! ```json
//! { "days": 30, "rng_seed": 7, "quota": { "min_in_service": 12 } }
//! ```
//!
//! `SimulationConfig::validate` runs before any day is simulated; the
//! fleet-dependent checks live in `validate_for_fleet`.

use crate::models::{CertificateKind, MaintenanceKind, OperationalStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the number of days a single run may simulate
pub const MAX_DAYS: usize = 365;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("days must be in 1..={max}, got {days}")]
    DaysOutOfRange { days: usize, max: usize },

    #[error("{field} must be > 0")]
    NotPositive { field: &'static str },

    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },

    #[error("{field} must list at least one candidate")]
    EmptyCandidates { field: &'static str },

    #[error("{field} candidates must be > 0")]
    NonPositiveCandidate { field: &'static str },

    #[error("fleet of {fleet} trains exceeds stabling capacity of {capacity}")]
    StablingCapacityExceeded { fleet: usize, capacity: usize },

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

// ============================================================================
// Sections
// ============================================================================

/// Renewal rule for one certificate kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRule {
    /// Consecutive invalid days after which the certificate is renewed
    pub failure_threshold: u32,
    /// Validity window granted on renewal
    pub validity_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub rolling_stock: CertificateRule,
    pub signalling: CertificateRule,
    pub telecom: CertificateRule,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            rolling_stock: CertificateRule {
                failure_threshold: 4,
                validity_days: 730,
            },
            signalling: CertificateRule {
                failure_threshold: 5,
                validity_days: 1825,
            },
            telecom: CertificateRule {
                failure_threshold: 5,
                validity_days: 1460,
            },
        }
    }
}

impl FitnessConfig {
    pub fn rule(&self, kind: CertificateKind) -> &CertificateRule {
        match kind {
            CertificateKind::RollingStock => &self.rolling_stock,
            CertificateKind::Signalling => &self.signalling,
            CertificateKind::Telecom => &self.telecom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MileageConfig {
    pub daily_increment_km: f64,
    /// Service threshold; also the base of the balance variance
    pub service_interval_km: f64,
}

impl Default for MileageConfig {
    fn default() -> Self {
        Self {
            daily_increment_km: 436.96,
            service_interval_km: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearConfig {
    pub brakepad_daily_pct: f64,
    pub hvac_daily_pct: f64,
    pub brakepad_threshold_pct: f64,
    pub hvac_threshold_pct: f64,
}

impl Default for WearConfig {
    fn default() -> Self {
        Self {
            brakepad_daily_pct: 0.27,
            hvac_daily_pct: 0.16,
            brakepad_threshold_pct: 80.0,
            hvac_threshold_pct: 90.0,
        }
    }
}

/// Duration in days of each maintenance task kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub brakepad_days: u32,
    pub hvac_days: u32,
    pub service_days: u32,
    pub general_days: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            brakepad_days: 2,
            hvac_days: 2,
            service_days: 1,
            general_days: 1,
        }
    }
}

impl MaintenanceConfig {
    pub fn duration(&self, kind: MaintenanceKind) -> u32 {
        match kind {
            MaintenanceKind::Brakepad => self.brakepad_days,
            MaintenanceKind::Hvac => self.hvac_days,
            MaintenanceKind::Service => self.service_days,
            MaintenanceKind::General => self.general_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub in_progress_bays: usize,
    pub booking_bays: usize,
    /// A free train becomes eligible once more than this many days have
    /// passed since its last clean
    pub eligibility_days: i64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            in_progress_bays: 3,
            booking_bays: 7,
            eligibility_days: 7,
        }
    }
}

impl CleaningConfig {
    pub fn total_bays(&self) -> usize {
        self.in_progress_bays + self.booking_bays
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    /// New campaigns start only on day numbers divisible by this
    pub cadence_days: usize,
    pub start_probability: f64,
    pub target_candidates: Vec<f64>,
    pub quota_candidates: Vec<f64>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            cadence_days: 45,
            start_probability: 0.1,
            target_candidates: vec![240.0, 320.0, 480.0],
            quota_candidates: vec![12.0, 16.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StablingConfig {
    pub bays: usize,
    pub bay_capacity: usize,
}

impl Default for StablingConfig {
    fn default() -> Self {
        Self {
            bays: 15,
            bay_capacity: 3,
        }
    }
}

impl StablingConfig {
    pub fn capacity(&self) -> usize {
        self.bays * self.bay_capacity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub min_in_service: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { min_in_service: 13 }
    }
}

/// Status policy selection
///
/// Determines which decision-maker proposes each train's daily status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum PolicyConfig {
    /// Priority-ordered rule chain (reference heuristic)
    #[default]
    RuleChain,

    /// Propose the same status for every train
    ///
    /// Certificate safety and quota enforcement still apply on top.
    Fixed { status: OperationalStatus },
}

// ============================================================================
// SimulationConfig
// ============================================================================

/// Complete simulation configuration
///
/// # Example
///
/// ```
/// use fleet_induction_core::SimulationConfig;
///
/// let config = SimulationConfig::from_json(r#"{ "days": 10, "rng_seed": 99 }"#).unwrap();
/// assert_eq!(config.days, 10);
/// assert_eq!(config.quota.min_in_service, 13);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of days to simulate (1..=365)
    pub days: usize,

    /// RNG seed for deterministic simulation
    pub rng_seed: u64,

    /// Date of day 1; the caller substitutes today when absent
    pub start_date: Option<NaiveDate>,

    pub fitness: FitnessConfig,
    pub mileage: MileageConfig,
    pub wear: WearConfig,
    pub maintenance: MaintenanceConfig,
    pub cleaning: CleaningConfig,
    pub branding: BrandingConfig,
    pub stabling: StablingConfig,
    pub quota: QuotaConfig,
    pub policy: PolicyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 1,
            rng_seed: 12345,
            start_date: None,
            fitness: FitnessConfig::default(),
            mileage: MileageConfig::default(),
            wear: WearConfig::default(),
            maintenance: MaintenanceConfig::default(),
            cleaning: CleaningConfig::default(),
            branding: BrandingConfig::default(),
            stabling: StablingConfig::default(),
            quota: QuotaConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate fleet-independent parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 || self.days > MAX_DAYS {
            return Err(ConfigError::DaysOutOfRange {
                days: self.days,
                max: MAX_DAYS,
            });
        }

        for kind in CertificateKind::ALL {
            let rule = self.fitness.rule(kind);
            if rule.failure_threshold == 0 {
                return Err(ConfigError::NotPositive {
                    field: "fitness.failure_threshold",
                });
            }
            if rule.validity_days <= 0 {
                return Err(ConfigError::NotPositive {
                    field: "fitness.validity_days",
                });
            }
        }

        if self.mileage.service_interval_km <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "mileage.service_interval_km",
            });
        }
        if self.mileage.daily_increment_km < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "mileage.daily_increment_km",
            });
        }
        if self.wear.brakepad_daily_pct < 0.0 || self.wear.hvac_daily_pct < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "wear.daily_pct",
            });
        }

        for kind in MaintenanceKind::ALL {
            if self.maintenance.duration(kind) == 0 {
                return Err(ConfigError::NotPositive {
                    field: "maintenance.days",
                });
            }
        }

        if self.cleaning.in_progress_bays == 0 {
            return Err(ConfigError::NotPositive {
                field: "cleaning.in_progress_bays",
            });
        }

        if self.branding.cadence_days == 0 {
            return Err(ConfigError::NotPositive {
                field: "branding.cadence_days",
            });
        }
        let p = self.branding.start_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability {
                field: "branding.start_probability",
                value: p,
            });
        }
        check_candidates("branding.target_candidates", &self.branding.target_candidates)?;
        check_candidates("branding.quota_candidates", &self.branding.quota_candidates)?;

        if self.stabling.bays == 0 {
            return Err(ConfigError::NotPositive {
                field: "stabling.bays",
            });
        }
        if self.stabling.bay_capacity == 0 {
            return Err(ConfigError::NotPositive {
                field: "stabling.bay_capacity",
            });
        }

        Ok(())
    }

    /// Validate everything, including limits that depend on the fleet size
    pub fn validate_for_fleet(&self, fleet_size: usize) -> Result<(), ConfigError> {
        self.validate()?;
        let capacity = self.stabling.capacity();
        if fleet_size > capacity {
            return Err(ConfigError::StablingCapacityExceeded {
                fleet: fleet_size,
                capacity,
            });
        }
        Ok(())
    }
}

fn check_candidates(field: &'static str, values: &[f64]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::EmptyCandidates { field });
    }
    if values.iter().any(|v| *v <= 0.0) {
        return Err(ConfigError::NonPositiveCandidate { field });
    }
    Ok(())
}

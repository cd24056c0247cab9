//! Orchestrator - main simulation loop
//!
//! Drives the daily fleet step across a configured number of days.
//!
//! See `engine.rs` for the day pipeline.

pub mod checkpoint;
pub mod config;
pub mod engine;

// Re-export main types for convenience
pub use config::{
    BrandingConfig, CertificateRule, CleaningConfig, ConfigError, FitnessConfig, MaintenanceConfig,
    MileageConfig, PolicyConfig, QuotaConfig, SimulationConfig, StablingConfig, WearConfig,
    MAX_DAYS,
};
pub use engine::{
    advance_day, DayDiagnostics, DayOrchestrator, DaySnapshot, DayWarning, RunReport,
    SimulationError,
};

// Re-export checkpoint types
pub use checkpoint::{config_fingerprint, validate_state, CheckpointError, FleetCheckpoint};

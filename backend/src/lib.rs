//! Fleet Induction Core - Rust Engine
//!
//! Daily induction planning for a metro rail fleet with deterministic
//! execution: every train is scored, ranked and given an operational status,
//! and the fleet's condition is simulated forward day by day.
//!
//! # Architecture
//!
//! - **core**: Simulation calendar
//! - **models**: Domain types (Train, FleetState, Event)
//! - **fitness**: Certificate expiry and renewal
//! - **jobcards**: Job card ledger and maintenance arming
//! - **wear**: Mileage, wear and maintenance countdown
//! - **branding**: Branding campaigns and exposure accrual
//! - **cleaning**: Two-tier cleaning bay pool
//! - **stabling**: Stabling bay and sequence allocation
//! - **policy**: Status decision-makers and quota enforcement
//! - **scoring**: Desirability score and tie-break ranking
//! - **orchestrator**: Day pipeline, configuration, checkpointing
//! - **import** / **export**: Fleet table records
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Ranks are a permutation of 1..N every day
//! 2. Cleaning occupancy equals min(total bays, eligible trains)
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod branding;
pub mod cleaning;
pub mod core;
pub mod export;
pub mod fitness;
pub mod import;
pub mod jobcards;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod scoring;
pub mod stabling;
pub mod wear;

// Re-exports for convenience
pub use branding::CampaignRegistry;
pub use cleaning::{BayTier, CleaningBay, CleaningPool, CleaningSummary};
pub use core::calendar::SimulationCalendar;
pub use export::{trains_to_rows, TrainRow};
pub use fitness::FitnessTracker;
pub use import::{records_to_trains, ImportError, ImportReport, RawRecord};
pub use models::{
    event::{Event, EventLog},
    fleet::{FleetState, StatusCounts},
    maintenance::{MaintenanceKind, MaintenanceTask},
    train::{CertificateKind, JobCardStatus, OperationalStatus, SlotStatus, Train},
};
pub use orchestrator::{
    advance_day, ConfigError, DayOrchestrator, DaySnapshot, DayWarning, FleetCheckpoint,
    PolicyConfig, RunReport, SimulationConfig, SimulationError,
};
pub use policy::{ActionIndexPolicy, FeatureVector, FixedStatusPolicy, RuleChainPolicy, StatusPolicy};
pub use rng::{RandomSource, RngManager, ScriptedRandom};
pub use scoring::{RankedTrain, ScoringEngine};

//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Certificate fitness (expiry and renewal)
//! - Branding campaigns (accrual, retirement, issuance)
//! - Mileage and wear (maintenance completion)
//! - Cleaning pool resolution
//! - Job card ledger (triggers, maintenance arming, closure)
//! - Stabling allocation
//! - Status decisions (policy, certificate safety, service quota)
//! - Scoring and ranking
//!
//! # Architecture
//!
//! Each day is a pure step over the previous day's state:
//!
//! ```text
//! advance_day(prior, config, policy, rng) -> (next, diagnostics)
//!
//! For each day d:
//! 1. Fitness advance
//! 2. Branding accrual / end / start (status held coming into the day)
//! 3. Maintenance countdown, mileage and wear
//! 4. Cleaning pool resolution and reconciliation
//! 5. Job card triggers and closure
//! 6. Stabling allocation (previous day's rank)
//! 7. Preliminary rank -> policy -> certificate safety -> quota
//! 8. Final score and rank
//! 9. Snapshot, warnings, end-of-day event
//! ```
//!
//! The step works on a clone of the prior state, so a failed day leaves the
//! published state untouched.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleet_induction_core::{DayOrchestrator, SimulationConfig, Train};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let config = SimulationConfig {
//!     days: 3,
//!     start_date: Some(start),
//!     ..Default::default()
//! };
//! let trains: Vec<Train> = (1..=5).map(|i| Train::new(format!("TS-{:02}", i), start)).collect();
//!
//! let mut orchestrator = DayOrchestrator::new(config, trains).unwrap();
//! let report = orchestrator.run().unwrap();
//! assert_eq!(report.days.len(), 3);
//! ```

use crate::branding;
use crate::cleaning::CleaningSummary;
use crate::fitness;
use crate::import::ImportError;
use crate::jobcards;
use crate::models::{Event, EventLog, FleetState, StatusCounts, Train};
use crate::orchestrator::checkpoint::{config_fingerprint, CheckpointError, FleetCheckpoint};
use crate::orchestrator::config::{ConfigError, SimulationConfig};
use crate::policy::{self, QuotaOutcome, StatusPolicy};
use crate::rng::{RandomSource, RngManager};
use crate::scoring::{RankedTrain, ScoringEngine};
use crate::stabling;
use crate::wear;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

// ============================================================================
// Errors and results
// ============================================================================

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Fleet table rejected
    #[error("import failed: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("fleet is empty")]
    EmptyFleet,

    #[error("duplicate train ID: {0}")]
    DuplicateTrain(String),

    /// All configured days have been simulated
    #[error("run complete: all {days} days simulated")]
    RunComplete { days: usize },
}

/// Structured warning attached to a day's snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DayWarning {
    /// Not enough promotable trains to reach the in-service minimum
    InServiceShortfall {
        day: usize,
        required: usize,
        achieved: usize,
    },
}

/// Everything a day step reports besides the new state
#[derive(Debug, Clone, PartialEq)]
pub struct DayDiagnostics {
    pub day: usize,
    pub date: NaiveDate,
    pub events: Vec<Event>,
    pub ranking: Vec<RankedTrain>,
    pub cleaning: CleaningSummary,
    pub quota: QuotaOutcome,
    pub warnings: Vec<DayWarning>,
    pub counts: StatusCounts,
}

/// Published result of one simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub day: usize,
    pub date: NaiveDate,
    /// Trains in fleet order, decisions filled in
    pub trains: Vec<Train>,
    /// Final ranking, best first
    pub ranking: Vec<RankedTrain>,
    pub warnings: Vec<DayWarning>,
    pub counts: StatusCounts,
    pub cleaning: CleaningSummary,
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub days: Vec<DaySnapshot>,
}

impl RunReport {
    /// All warnings of the run, in day order
    pub fn warnings(&self) -> Vec<&DayWarning> {
        self.days.iter().flat_map(|d| d.warnings.iter()).collect()
    }
}

// ============================================================================
// Day step
// ============================================================================

/// Resolve one day on a copy of `prior`
///
/// The returned state has its calendar advanced by one day. `prior` is never
/// modified.
pub fn advance_day(
    prior: &FleetState,
    config: &SimulationConfig,
    status_policy: &mut dyn StatusPolicy,
    rng: &mut dyn RandomSource,
) -> Result<(FleetState, DayDiagnostics), SimulationError> {
    if prior.is_empty() {
        return Err(SimulationError::EmptyFleet);
    }

    let mut next = prior.clone();
    let day = next.calendar.advance_day();
    let today = next.calendar.current_date();
    let mut events = Vec::new();

    let FleetState {
        trains,
        cleaning,
        campaigns,
        fitness: tracker,
        ..
    } = &mut next;

    // STEP 1: FITNESS
    for train in trains.iter_mut() {
        tracker.advance(train, day, today, &config.fitness, &mut events);
    }

    // STEP 2: BRANDING
    branding::advance_fleet(trains, day, campaigns, &config.branding, rng, &mut events);

    // STEP 3: MAINTENANCE, MILEAGE, WEAR
    for train in trains.iter_mut() {
        wear::advance(train, day, &config.mileage, &config.wear, &mut events);
    }

    // STEP 4: CLEANING
    let cleaning_summary = cleaning.resolve_day(trains, day, today, &mut events);

    // STEP 5: JOB CARDS
    for train in trains.iter_mut() {
        jobcards::advance(train, day, today, config, &mut events);
    }

    // STEP 6: STABLING
    stabling::allocate(trains, &config.stabling);

    // STEP 7: STATUS
    let engine = ScoringEngine::new(config.mileage.service_interval_km);
    let preliminary: Vec<usize> = engine.apply(trains).iter().map(|r| r.index).collect();
    policy::assign_statuses(
        trains,
        &preliminary,
        status_policy,
        day,
        today,
        config,
        &mut events,
    );
    let quota = policy::enforce_minimum(trains, &preliminary, day, config, &mut events);

    // STEP 8: FINAL RANK
    let ranking = engine.apply(trains);

    // STEP 9: SNAPSHOT
    let counts = next.status_counts();
    events.push(Event::EndOfDay {
        day,
        in_service: counts.in_service,
        standby: counts.standby,
        under_maintenance: counts.under_maintenance,
    });

    let mut warnings = Vec::new();
    if quota.is_shortfall() {
        warnings.push(DayWarning::InServiceShortfall {
            day,
            required: quota.required,
            achieved: quota.achieved,
        });
    }

    info!(
        day,
        date = %today,
        in_service = counts.in_service,
        standby = counts.standby,
        under_maintenance = counts.under_maintenance,
        cleaning_occupied = cleaning_summary.in_progress + cleaning_summary.booked,
        "day resolved"
    );

    let diagnostics = DayDiagnostics {
        day,
        date: today,
        events,
        ranking,
        cleaning: cleaning_summary,
        quota,
        warnings,
        counts,
    };
    Ok((next, diagnostics))
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Multi-day driver owning the run state
///
/// # Determinism
///
/// All randomness is via `rng` with seeded xorshift64*.
/// Same seed + same config + same fleet = identical results.
pub struct DayOrchestrator {
    config: SimulationConfig,
    state: FleetState,
    rng: RngManager,
    policy: Box<dyn StatusPolicy>,
    event_log: EventLog,
    run_id: Uuid,
    /// Repairs made while building the day-0 state
    repairs: Vec<String>,
}

impl DayOrchestrator {
    /// Create a new orchestrator from configuration and the day-0 fleet
    ///
    /// The start date is `config.start_date`, or today when unset.
    pub fn new(config: SimulationConfig, trains: Vec<Train>) -> Result<Self, SimulationError> {
        if trains.is_empty() {
            return Err(SimulationError::EmptyFleet);
        }
        let mut ids = HashSet::new();
        for train in &trains {
            if !ids.insert(train.id().to_string()) {
                return Err(SimulationError::DuplicateTrain(train.id().to_string()));
            }
        }
        config.validate_for_fleet(trains.len())?;

        let start_date = config
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());
        let (state, repairs) = FleetState::from_trains(trains, start_date, &config);

        Ok(Self {
            rng: RngManager::new(config.rng_seed),
            policy: policy::build_policy(&config.policy),
            config,
            state,
            event_log: EventLog::new(),
            run_id: Uuid::new_v4(),
            repairs,
        })
    }

    /// Replace the configured policy (for external decision-makers)
    pub fn with_policy(mut self, policy: Box<dyn StatusPolicy>) -> Self {
        self.policy = policy;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &FleetState {
        &self.state
    }

    pub fn current_day(&self) -> usize {
        self.state.day()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn repairs(&self) -> &[String] {
        &self.repairs
    }

    pub fn is_complete(&self) -> bool {
        self.current_day() >= self.config.days
    }

    // ========================================================================
    // Day loop
    // ========================================================================

    /// Simulate the next day and publish its state
    pub fn run_day(&mut self) -> Result<DaySnapshot, SimulationError> {
        if self.is_complete() {
            return Err(SimulationError::RunComplete {
                days: self.config.days,
            });
        }

        let (next, diagnostics) =
            advance_day(&self.state, &self.config, self.policy.as_mut(), &mut self.rng)?;
        self.state = next;

        let DayDiagnostics {
            day,
            date,
            events,
            ranking,
            cleaning,
            warnings,
            counts,
            ..
        } = diagnostics;
        self.event_log.extend(events);

        Ok(DaySnapshot {
            day,
            date,
            trains: self.state.trains.clone(),
            ranking,
            warnings,
            counts,
            cleaning,
        })
    }

    /// Simulate every remaining configured day
    pub fn run(&mut self) -> Result<RunReport, SimulationError> {
        let mut days = Vec::with_capacity(self.config.days.saturating_sub(self.current_day()));
        while !self.is_complete() {
            days.push(self.run_day()?);
        }
        Ok(RunReport {
            run_id: self.run_id,
            days,
        })
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    pub fn checkpoint(&self) -> Result<FleetCheckpoint, SimulationError> {
        Ok(FleetCheckpoint {
            run_id: self.run_id,
            state: self.state.clone(),
            rng_state: self.rng.get_state(),
            config_hash: config_fingerprint(&self.config)?,
        })
    }

    /// Resume a run from a checkpoint taken under the same config
    pub fn restore(
        config: SimulationConfig,
        checkpoint: FleetCheckpoint,
    ) -> Result<Self, SimulationError> {
        config.validate_for_fleet(checkpoint.state.len())?;
        checkpoint.verify(&config)?;

        Ok(Self {
            rng: RngManager::new(checkpoint.rng_state),
            policy: policy::build_policy(&config.policy),
            config,
            state: checkpoint.state,
            event_log: EventLog::new(),
            run_id: checkpoint.run_id,
            repairs: Vec::new(),
        })
    }
}

impl std::fmt::Debug for DayOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DayOrchestrator")
            .field("run_id", &self.run_id)
            .field("current_day", &self.current_day())
            .field("days", &self.config.days)
            .field("trains", &self.state.len())
            .field("policy", &self.policy.name())
            .field("events", &self.event_log.len())
            .finish()
    }
}

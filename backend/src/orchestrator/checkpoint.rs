//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of a complete run for
//! pause/resume functionality.
//!
//! # Critical Invariants
//!
//! - **Determinism**: resuming from a checkpoint continues the exact RNG
//!   stream, so a paused run produces the same day tables as an unbroken one
//! - **Config Matching**: state can only be loaded with the config it was
//!   produced under (SHA-256 fingerprint)
//! - **Fleet Integrity**: train IDs are unique and every cleaning bay
//!   occupant is a known train

use crate::models::{FleetState, SlotStatus};
use crate::orchestrator::config::SimulationConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Checkpoint error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckpointError {
    #[error("checkpoint serialization failed: {0}")]
    Serialization(String),

    #[error("checkpoint config mismatch: expected {expected}, found {found}")]
    ConfigMismatch { expected: String, found: String },

    #[error("checkpoint state invalid: {0}")]
    InvalidState(String),
}

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Complete run snapshot
///
/// This structure captures all state necessary to resume a simulation
/// after any resolved day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCheckpoint {
    /// Run the checkpoint belongs to
    pub run_id: Uuid,

    /// Fleet state after the last resolved day
    pub state: FleetState,

    /// RNG state at time of snapshot (CRITICAL for determinism)
    pub rng_state: u64,

    /// SHA256 hash of the run config (for validation)
    pub config_hash: String,
}

impl FleetCheckpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    /// Verify the checkpoint against the config it is about to be resumed with
    pub fn verify(&self, config: &SimulationConfig) -> Result<(), CheckpointError> {
        let expected = config_fingerprint(config)?;
        if expected != self.config_hash {
            return Err(CheckpointError::ConfigMismatch {
                expected,
                found: self.config_hash.clone(),
            });
        }
        validate_state(&self.state)
    }
}

// ============================================================================
// Config Fingerprint
// ============================================================================

/// SHA-256 of the config as canonical JSON, stored in checkpoints
///
/// The day count is left out so a paused run can be extended; every other
/// field must match.
pub fn config_fingerprint(config: &SimulationConfig) -> Result<String, CheckpointError> {
    let mut value = serde_json::to_value(config)
        .map_err(|e| CheckpointError::Serialization(format!("config: {}", e)))?;
    if let Some(fields) = value.as_object_mut() {
        fields.remove("days");
    }
    // serde_json objects iterate in key order at every depth
    let digest = Sha256::digest(value.to_string().as_bytes());
    Ok(format!("{:x}", digest))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate fleet state integrity
///
/// Checks:
/// - train IDs are unique
/// - every occupied bay names a known train whose record points back at it
/// - no train claims a slot that the bay table does not hold
pub fn validate_state(state: &FleetState) -> Result<(), CheckpointError> {
    let mut ids = HashSet::new();
    for train in &state.trains {
        if !ids.insert(train.id()) {
            return Err(CheckpointError::InvalidState(format!(
                "Duplicate train ID: {}",
                train.id()
            )));
        }
    }

    let mut seated = HashSet::new();
    for bay in state.cleaning.bays() {
        let Some(occupant) = bay.occupant.as_deref() else {
            continue;
        };
        let train = state.train(occupant).ok_or_else(|| {
            CheckpointError::InvalidState(format!(
                "Bay {} holds unknown train {}",
                bay.id, occupant
            ))
        })?;
        if train.cleaning.bay_id.as_deref() != Some(bay.id.as_str())
            || train.cleaning.slot_status != bay.tier.slot_status()
        {
            return Err(CheckpointError::InvalidState(format!(
                "Train {} disagrees with bay {}",
                occupant, bay.id
            )));
        }
        seated.insert(occupant);
    }

    for train in &state.trains {
        if train.cleaning.slot_status != SlotStatus::Free && !seated.contains(train.id()) {
            return Err(CheckpointError::InvalidState(format!(
                "Train {} claims a cleaning slot it does not hold",
                train.id()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let first = config_fingerprint(&SimulationConfig::default()).unwrap();
        let second = config_fingerprint(&SimulationConfig::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_seed() {
        let mut reseeded = SimulationConfig::default();
        reseeded.rng_seed += 1;
        assert_ne!(
            config_fingerprint(&SimulationConfig::default()).unwrap(),
            config_fingerprint(&reseeded).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_ignores_day_count() {
        let short = SimulationConfig::default();
        let long = SimulationConfig {
            days: 30,
            ..Default::default()
        };
        assert_eq!(
            config_fingerprint(&short).unwrap(),
            config_fingerprint(&long).unwrap()
        );
    }
}

//! Maintenance tasks owned by a train while they run

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a maintenance task repairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaintenanceKind {
    /// Brakepad replacement, resets brakepad wear
    Brakepad,
    /// HVAC overhaul, resets HVAC wear
    Hvac,
    /// Periodic service, resets mileage since service
    Service,
    /// Inspection work without a reset effect (certificate failures)
    General,
}

impl MaintenanceKind {
    pub const ALL: [MaintenanceKind; 4] = [
        MaintenanceKind::Brakepad,
        MaintenanceKind::Hvac,
        MaintenanceKind::Service,
        MaintenanceKind::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MaintenanceKind::Brakepad => "brakepad",
            MaintenanceKind::Hvac => "hvac",
            MaintenanceKind::Service => "service",
            MaintenanceKind::General => "general",
        }
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An active maintenance task
///
/// Invariant: `days_remaining > 0` while the task is held by a train. The
/// wear model removes the task on the day the counter reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceTask {
    pub kind: MaintenanceKind,
    pub days_remaining: u32,
}

impl MaintenanceTask {
    /// Create a task; a zero duration is bumped to one day
    pub fn new(kind: MaintenanceKind, days: u32) -> Self {
        Self {
            kind,
            days_remaining: days.max(1),
        }
    }

    /// Count one day of work; returns true when the task completes
    pub fn tick(&mut self) -> bool {
        self.days_remaining = self.days_remaining.saturating_sub(1);
        self.days_remaining == 0
    }
}

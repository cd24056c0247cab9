//! Event logging for simulation replay and auditing.
//!
//! Every significant state change the daily pipeline makes is recorded as an
//! `Event`. Events enable:
//! - Debugging (which step changed which train on which day)
//! - Auditing (verify that renewals, closures and promotions follow the rules)
//! - Analysis (count maintenance load, cleaning throughput, campaign churn)
//!
//! # Event Types
//!
//! Events are categorized by pipeline step:
//! - **Fitness**: certificate expiry and renewal
//! - **Job cards**: cards opened and closed, maintenance armed and completed
//! - **Branding**: campaigns started and ended
//! - **Cleaning**: admissions, promotions, completions, releases
//! - **Status**: policy overrides and quota promotions
//! - **EOD**: end-of-day status counts
//!
//! # Example
//!
//! ```rust
//! use fleet_induction_core::models::{CertificateKind, Event};
//!
//! let event = Event::CertificateExpired {
//!     day: 12,
//!     train_id: "TS-07".to_string(),
//!     kind: CertificateKind::Telecom,
//! };
//!
//! assert_eq!(event.day(), 12);
//! assert_eq!(event.train_id(), Some("TS-07"));
//! ```

use crate::models::maintenance::MaintenanceKind;
use crate::models::train::{CertificateKind, OperationalStatus, SlotStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// All events include the 1-based simulation day they occurred on.
/// Events are logged in pipeline order within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Certificate passed its expiry date
    CertificateExpired {
        day: usize,
        train_id: String,
        kind: CertificateKind,
    },

    /// Certificate renewed after its failure counter reached the threshold
    CertificateRenewed {
        day: usize,
        train_id: String,
        kind: CertificateKind,
        expiry_date: NaiveDate,
    },

    /// A new job card was opened
    JobCardOpened {
        day: usize,
        train_id: String,
        reason: String,
        open: u32,
    },

    /// One job card was closed
    JobCardClosed {
        day: usize,
        train_id: String,
        open: u32,
        closed: u32,
    },

    /// A maintenance task was started
    MaintenanceArmed {
        day: usize,
        train_id: String,
        kind: MaintenanceKind,
        duration_days: u32,
    },

    /// A maintenance task finished and reset its metric
    MaintenanceCompleted {
        day: usize,
        train_id: String,
        kind: MaintenanceKind,
    },

    CampaignStarted {
        day: usize,
        train_id: String,
        campaign_id: String,
        exposure_target: f64,
        daily_quota: f64,
    },

    CampaignEnded {
        day: usize,
        train_id: String,
        campaign_id: String,
        exposure_accrued: f64,
    },

    /// Train took a cleaning slot
    CleaningAdmitted {
        day: usize,
        train_id: String,
        bay_id: String,
        slot: SlotStatus,
    },

    /// Booked train moved into an in-progress bay
    CleaningPromoted {
        day: usize,
        train_id: String,
        from_bay: String,
        to_bay: String,
    },

    CleaningCompleted {
        day: usize,
        train_id: String,
        bay_id: String,
    },

    /// Occupant dropped to respect pool capacity
    CleaningReleased {
        day: usize,
        train_id: String,
        bay_id: Option<String>,
    },

    /// Proposed status replaced by the certificate safety rule
    PolicyOverride {
        day: usize,
        train_id: String,
        proposed: OperationalStatus,
        applied: OperationalStatus,
    },

    /// Train promoted to In_Service to meet the service quota
    StatusPromoted {
        day: usize,
        train_id: String,
        from: OperationalStatus,
    },

    EndOfDay {
        day: usize,
        in_service: usize,
        standby: usize,
        under_maintenance: usize,
    },
}

impl Event {
    /// Get the simulation day this event occurred on
    pub fn day(&self) -> usize {
        match self {
            Event::CertificateExpired { day, .. } => *day,
            Event::CertificateRenewed { day, .. } => *day,
            Event::JobCardOpened { day, .. } => *day,
            Event::JobCardClosed { day, .. } => *day,
            Event::MaintenanceArmed { day, .. } => *day,
            Event::MaintenanceCompleted { day, .. } => *day,
            Event::CampaignStarted { day, .. } => *day,
            Event::CampaignEnded { day, .. } => *day,
            Event::CleaningAdmitted { day, .. } => *day,
            Event::CleaningPromoted { day, .. } => *day,
            Event::CleaningCompleted { day, .. } => *day,
            Event::CleaningReleased { day, .. } => *day,
            Event::PolicyOverride { day, .. } => *day,
            Event::StatusPromoted { day, .. } => *day,
            Event::EndOfDay { day, .. } => *day,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CertificateExpired { .. } => "CertificateExpired",
            Event::CertificateRenewed { .. } => "CertificateRenewed",
            Event::JobCardOpened { .. } => "JobCardOpened",
            Event::JobCardClosed { .. } => "JobCardClosed",
            Event::MaintenanceArmed { .. } => "MaintenanceArmed",
            Event::MaintenanceCompleted { .. } => "MaintenanceCompleted",
            Event::CampaignStarted { .. } => "CampaignStarted",
            Event::CampaignEnded { .. } => "CampaignEnded",
            Event::CleaningAdmitted { .. } => "CleaningAdmitted",
            Event::CleaningPromoted { .. } => "CleaningPromoted",
            Event::CleaningCompleted { .. } => "CleaningCompleted",
            Event::CleaningReleased { .. } => "CleaningReleased",
            Event::PolicyOverride { .. } => "PolicyOverride",
            Event::StatusPromoted { .. } => "StatusPromoted",
            Event::EndOfDay { .. } => "EndOfDay",
        }
    }

    /// Get train ID if event relates to a specific train
    pub fn train_id(&self) -> Option<&str> {
        match self {
            Event::CertificateExpired { train_id, .. }
            | Event::CertificateRenewed { train_id, .. }
            | Event::JobCardOpened { train_id, .. }
            | Event::JobCardClosed { train_id, .. }
            | Event::MaintenanceArmed { train_id, .. }
            | Event::MaintenanceCompleted { train_id, .. }
            | Event::CampaignStarted { train_id, .. }
            | Event::CampaignEnded { train_id, .. }
            | Event::CleaningAdmitted { train_id, .. }
            | Event::CleaningPromoted { train_id, .. }
            | Event::CleaningCompleted { train_id, .. }
            | Event::CleaningReleased { train_id, .. }
            | Event::PolicyOverride { train_id, .. }
            | Event::StatusPromoted { train_id, .. } => Some(train_id),
            Event::EndOfDay { .. } => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Append every event from another batch, keeping its order
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific day
    pub fn events_on_day(&self, day: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific train
    pub fn events_for_train(&self, train_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.train_id() == Some(train_id))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(day: usize, train: &str) -> Event {
        Event::JobCardOpened {
            day,
            train_id: train.to_string(),
            reason: "brakepad wear".to_string(),
            open: 1,
        }
    }

    #[test]
    fn test_event_day_and_type() {
        let event = Event::MaintenanceCompleted {
            day: 42,
            train_id: "T1".to_string(),
            kind: MaintenanceKind::Hvac,
        };

        assert_eq!(event.day(), 42);
        assert_eq!(event.event_type(), "MaintenanceCompleted");
        assert_eq!(event.train_id(), Some("T1"));
    }

    #[test]
    fn test_end_of_day_has_no_train() {
        let event = Event::EndOfDay {
            day: 3,
            in_service: 13,
            standby: 4,
            under_maintenance: 3,
        };
        assert_eq!(event.train_id(), None);
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.log(opened(1, "T1"));
        log.log(opened(1, "T2"));
        log.log(Event::JobCardClosed {
            day: 2,
            train_id: "T1".to_string(),
            open: 0,
            closed: 1,
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_on_day(1).len(), 2);
        assert_eq!(log.events_on_day(2).len(), 1);
        assert_eq!(log.events_of_type("JobCardOpened").len(), 2);
        assert_eq!(log.events_for_train("T1").len(), 2);
        assert_eq!(log.events_for_train("T3").len(), 0);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(opened(5, "T9")).unwrap();
        assert_eq!(json["type"], "JobCardOpened");
        assert_eq!(json["day"], 5);
        assert_eq!(json["train_id"], "T9");
    }
}

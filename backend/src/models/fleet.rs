//! Fleet state carried from one simulated day to the next
//!
//! `FleetState` owns everything a day step reads and writes: the trains and
//! the run-wide pools (cleaning bays, campaign registry, fitness counters).
//! It is `Clone` so a day can be resolved on a copy and published only on
//! success.

use crate::branding::CampaignRegistry;
use crate::cleaning::CleaningPool;
use crate::core::calendar::SimulationCalendar;
use crate::fitness::FitnessTracker;
use crate::models::train::{OperationalStatus, Train};
use crate::orchestrator::config::SimulationConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Complete carry-forward state of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetState {
    pub calendar: SimulationCalendar,
    pub trains: Vec<Train>,
    pub cleaning: CleaningPool,
    pub campaigns: CampaignRegistry,
    pub fitness: FitnessTracker,
}

/// Status counts over the fleet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub in_service: usize,
    pub standby: usize,
    pub under_maintenance: usize,
}

impl FleetState {
    /// Build the day-0 state from a list of trains
    ///
    /// Derived fields are recomputed, imported cleaning occupants are seated
    /// in the pool and campaign IDs are registered. Returns the state and
    /// one message per repair made on the way.
    pub fn from_trains(
        mut trains: Vec<Train>,
        start_date: NaiveDate,
        config: &SimulationConfig,
    ) -> (Self, Vec<String>) {
        for train in &mut trains {
            settle_derived_fields(train, config);
        }

        let (cleaning, mut repairs) = CleaningPool::from_fleet(&mut trains, &config.cleaning);
        let (campaigns, campaign_repairs) = CampaignRegistry::from_fleet(&mut trains);
        repairs.extend(campaign_repairs);

        let state = Self {
            calendar: SimulationCalendar::new(start_date),
            trains,
            cleaning,
            campaigns,
            fitness: FitnessTracker::new(),
        };
        (state, repairs)
    }

    /// Last resolved day (0 = input state)
    pub fn day(&self) -> usize {
        self.calendar.current_day()
    }

    pub fn date(&self) -> NaiveDate {
        self.calendar.current_date()
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    pub fn train(&self, id: &str) -> Option<&Train> {
        self.trains.iter().find(|t| t.id() == id)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for train in &self.trains {
            match train.decision.status {
                OperationalStatus::InService => counts.in_service += 1,
                OperationalStatus::Standby => counts.standby += 1,
                OperationalStatus::UnderMaintenance => counts.under_maintenance += 1,
            }
        }
        counts
    }
}

/// Recompute the fields that are pure functions of other fields
pub fn settle_derived_fields(train: &mut Train, config: &SimulationConfig) {
    train.mileage.rebalance(config.mileage.service_interval_km);
    train.job_cards.refresh_status();
    let bay = train.stabling.bay_position;
    let sequence = train
        .stabling
        .sequence_order
        .clamp(1, config.stabling.bay_capacity.max(1) as u32);
    train.stabling.assign(bay, sequence);
}

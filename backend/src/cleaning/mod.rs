//! Cleaning resource pool
//!
//! A fixed set of named bays in two tiers:
//! - in-progress bays (`BAY_01`..`BAY_03` by default), where a train is
//!   cleaned over one day
//! - booking bays (`BAY_04`..`BAY_10`), where a train waits for an
//!   in-progress bay
//!
//! # Daily resolution
//!
//! ```text
//! (a) in_progress -> complete, free, last_cleaned = today
//! (b) booked      -> in_progress when a bay is free (longest-booked first)
//! (c) free + due  -> admitted while occupancy < total (oldest clean first),
//!                    in-progress bay if free, else booking bay
//! ```
//!
//! CRITICAL: after resolution the number of occupied bays equals
//! `min(total_bays, eligible)`, where eligible counts trains holding a bay
//! after (a)/(b) plus free trains past the eligibility threshold.
//! `reconcile` enforces this and the per-train slot invariant even when the
//! bay table and train records disagree.

use crate::models::{Event, SlotStatus, Train};
use crate::orchestrator::config::CleaningConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Bay tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayTier {
    InProgress,
    Booking,
}

impl BayTier {
    pub fn slot_status(&self) -> SlotStatus {
        match self {
            BayTier::InProgress => SlotStatus::InProgress,
            BayTier::Booking => SlotStatus::Booked,
        }
    }

    fn for_slot(slot: SlotStatus) -> Option<Self> {
        match slot {
            SlotStatus::Free => None,
            SlotStatus::Booked => Some(BayTier::Booking),
            SlotStatus::InProgress => Some(BayTier::InProgress),
        }
    }
}

/// One named bay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningBay {
    pub id: String,
    pub tier: BayTier,
    pub occupant: Option<String>,
    /// Day the current occupant took the bay (0 for imported occupants)
    pub since_day: usize,
}

/// Per-day counts reported by the pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub completed: usize,
    pub promoted: usize,
    pub admitted: usize,
    pub released: usize,
    pub eligible: usize,
    pub in_progress: usize,
    pub booked: usize,
}

/// Fixed-capacity, two-tier cleaning pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningPool {
    bays: Vec<CleaningBay>,
    eligibility_days: i64,
}

pub fn bay_name(index: usize) -> String {
    format!("BAY_{:02}", index)
}

impl CleaningPool {
    /// Empty pool with the configured tier sizes
    pub fn new(config: &CleaningConfig) -> Self {
        let bays = (1..=config.total_bays())
            .map(|i| CleaningBay {
                id: bay_name(i),
                tier: if i <= config.in_progress_bays {
                    BayTier::InProgress
                } else {
                    BayTier::Booking
                },
                occupant: None,
                since_day: 0,
            })
            .collect();
        Self {
            bays,
            eligibility_days: config.eligibility_days,
        }
    }

    /// Seat the imported occupants and normalize every train's slot fields
    ///
    /// A train keeps its `bay_id` when it names a free bay of the right tier;
    /// otherwise it takes the first free bay of that tier. An in-progress
    /// train without room is demoted to a booking bay; a train with no room
    /// at all is released. Returns one message per repair.
    pub fn from_fleet(trains: &mut [Train], config: &CleaningConfig) -> (Self, Vec<String>) {
        let mut pool = Self::new(config);
        let mut repairs = Vec::new();

        for train in trains.iter_mut() {
            let Some(tier) = BayTier::for_slot(train.cleaning.slot_status) else {
                if train.cleaning.required || train.cleaning.bay_id.is_some() {
                    repairs.push(format!("{}: free slot normalized", train.id()));
                }
                train.cleaning.release();
                continue;
            };

            let wanted = train.cleaning.bay_id.clone();
            let seat = wanted
                .as_deref()
                .and_then(|id| pool.free_bay_named(id, tier))
                .or_else(|| pool.first_free(tier))
                .map(|i| (i, tier))
                .or_else(|| {
                    (tier == BayTier::InProgress)
                        .then(|| pool.first_free(BayTier::Booking))
                        .flatten()
                        .map(|i| (i, BayTier::Booking))
                });

            match seat {
                Some((index, seated_tier)) => {
                    let bay = &mut pool.bays[index];
                    bay.occupant = Some(train.id().to_string());
                    bay.since_day = 0;
                    if wanted.as_deref() != Some(bay.id.as_str()) || seated_tier != tier {
                        repairs.push(format!("{}: seated in {}", train.id(), bay.id));
                    }
                    train.cleaning.occupy(seated_tier.slot_status(), bay.id.clone());
                }
                None => {
                    repairs.push(format!("{}: no cleaning bay free, released", train.id()));
                    train.cleaning.release();
                }
            }
        }

        (pool, repairs)
    }

    pub fn bays(&self) -> &[CleaningBay] {
        &self.bays
    }

    pub fn total_bays(&self) -> usize {
        self.bays.len()
    }

    pub fn occupancy(&self) -> usize {
        self.bays.iter().filter(|b| b.occupant.is_some()).count()
    }

    pub fn occupied_in(&self, tier: BayTier) -> usize {
        self.bays
            .iter()
            .filter(|b| b.tier == tier && b.occupant.is_some())
            .count()
    }

    fn first_free(&self, tier: BayTier) -> Option<usize> {
        self.bays
            .iter()
            .position(|b| b.tier == tier && b.occupant.is_none())
    }

    fn free_bay_named(&self, id: &str, tier: BayTier) -> Option<usize> {
        self.bays
            .iter()
            .position(|b| b.id == id && b.tier == tier && b.occupant.is_none())
    }

    fn is_due(&self, train: &Train, today: NaiveDate) -> bool {
        train.cleaning.slot_status == SlotStatus::Free
            && train.cleaning.days_since_cleaned(today) > self.eligibility_days
    }

    /// Resolve one day
    pub fn resolve_day(
        &mut self,
        trains: &mut [Train],
        day: usize,
        today: NaiveDate,
        events: &mut Vec<Event>,
    ) -> CleaningSummary {
        let index: HashMap<String, usize> = trains
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id().to_string(), i))
            .collect();
        let mut summary = CleaningSummary::default();

        // (a) completions
        for bay in self.bays.iter_mut().filter(|b| b.tier == BayTier::InProgress) {
            let Some(occupant) = bay.occupant.take() else {
                continue;
            };
            if let Some(&i) = index.get(&occupant) {
                let train = &mut trains[i];
                train.cleaning.release();
                train.cleaning.last_cleaned = today;
                debug!(train = %occupant, bay = %bay.id, "cleaning completed");
                events.push(Event::CleaningCompleted {
                    day,
                    train_id: occupant,
                    bay_id: bay.id.clone(),
                });
                summary.completed += 1;
            }
        }

        // (b) promotions, longest-booked first
        let mut waiting: Vec<usize> = self
            .bays
            .iter()
            .enumerate()
            .filter(|(_, b)| b.tier == BayTier::Booking && b.occupant.is_some())
            .map(|(i, _)| i)
            .collect();
        waiting.sort_by_key(|&i| self.bays[i].since_day);

        for from in waiting {
            let Some(to) = self.first_free(BayTier::InProgress) else {
                break;
            };
            let Some(occupant) = self.bays[from].occupant.take() else {
                continue;
            };
            let from_bay = self.bays[from].id.clone();
            let to_bay = self.bays[to].id.clone();
            self.bays[to].occupant = Some(occupant.clone());
            self.bays[to].since_day = day;

            if let Some(&i) = index.get(&occupant) {
                trains[i]
                    .cleaning
                    .occupy(SlotStatus::InProgress, to_bay.clone());
            }
            debug!(train = %occupant, from = %from_bay, to = %to_bay, "cleaning promoted");
            events.push(Event::CleaningPromoted {
                day,
                train_id: occupant,
                from_bay,
                to_bay,
            });
            summary.promoted += 1;
        }

        // (c) admissions, oldest clean first
        let mut due: Vec<usize> = (0..trains.len())
            .filter(|&i| self.is_due(&trains[i], today))
            .collect();
        due.sort_by_key(|&i| trains[i].cleaning.last_cleaned);
        let eligible = self.occupancy() + due.len();

        for i in due {
            if self.occupancy() >= self.total_bays() {
                break;
            }
            let Some(slot) = self
                .first_free(BayTier::InProgress)
                .or_else(|| self.first_free(BayTier::Booking))
            else {
                break;
            };
            let bay = &mut self.bays[slot];
            bay.occupant = Some(trains[i].id().to_string());
            bay.since_day = day;
            let status = bay.tier.slot_status();
            trains[i].cleaning.occupy(status, bay.id.clone());

            debug!(train = %trains[i].id(), bay = %bay.id, "cleaning admitted");
            events.push(Event::CleaningAdmitted {
                day,
                train_id: trains[i].id().to_string(),
                bay_id: bay.id.clone(),
                slot: status,
            });
            summary.admitted += 1;
        }

        summary.released = self.reconcile(trains, day, today, eligible, events);
        summary.eligible = eligible;
        summary.in_progress = self.occupied_in(BayTier::InProgress);
        summary.booked = self.occupied_in(BayTier::Booking);
        summary
    }

    /// Enforce `occupancy == min(total, eligible)` and slot consistency
    ///
    /// Returns the number of occupants released.
    pub fn reconcile(
        &mut self,
        trains: &mut [Train],
        day: usize,
        today: NaiveDate,
        eligible: usize,
        events: &mut Vec<Event>,
    ) -> usize {
        let mut released = 0;
        let index: HashMap<String, usize> = trains
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id().to_string(), i))
            .collect();

        // Bays pointing at unknown trains are emptied
        for bay in &mut self.bays {
            if bay
                .occupant
                .as_ref()
                .is_some_and(|id| !index.contains_key(id))
            {
                bay.occupant = None;
            }
        }

        // Train records follow the bay table
        let seated: HashMap<String, (BayTier, String)> = self
            .bays
            .iter()
            .filter_map(|b| b.occupant.clone().map(|o| (o, (b.tier, b.id.clone()))))
            .collect();
        for train in trains.iter_mut() {
            match seated.get(train.id()) {
                Some((tier, bay_id)) => {
                    if train.cleaning.slot_status != tier.slot_status()
                        || train.cleaning.bay_id.as_deref() != Some(bay_id.as_str())
                        || !train.cleaning.required
                    {
                        train.cleaning.occupy(tier.slot_status(), bay_id.clone());
                    }
                }
                None => {
                    if train.cleaning.holds_slot()
                        || train.cleaning.required
                        || train.cleaning.bay_id.is_some()
                    {
                        train.cleaning.release();
                    }
                }
            }
        }

        let target = eligible.min(self.total_bays());

        // Trim, most recently cleaned first
        while self.occupancy() > target {
            let Some(bay_index) = self
                .bays
                .iter()
                .enumerate()
                .filter_map(|(bi, b)| {
                    b.occupant
                        .as_ref()
                        .and_then(|o| index.get(o))
                        .map(|&ti| (bi, trains[ti].cleaning.last_cleaned))
                })
                .max_by_key(|&(bi, cleaned)| (cleaned, bi))
                .map(|(bi, _)| bi)
            else {
                break;
            };
            let bay = &mut self.bays[bay_index];
            if let Some(occupant) = bay.occupant.take() {
                if let Some(&ti) = index.get(&occupant) {
                    trains[ti].cleaning.release();
                }
                events.push(Event::CleaningReleased {
                    day,
                    train_id: occupant,
                    bay_id: Some(bay.id.clone()),
                });
                released += 1;
            }
        }

        // Top up, oldest clean first
        if self.occupancy() < target {
            let mut due: Vec<usize> = (0..trains.len())
                .filter(|&i| self.is_due(&trains[i], today))
                .collect();
            due.sort_by_key(|&i| trains[i].cleaning.last_cleaned);
            for i in due {
                if self.occupancy() >= target {
                    break;
                }
                let Some(slot) = self
                    .first_free(BayTier::InProgress)
                    .or_else(|| self.first_free(BayTier::Booking))
                else {
                    break;
                };
                let bay = &mut self.bays[slot];
                bay.occupant = Some(trains[i].id().to_string());
                bay.since_day = day;
                trains[i].cleaning.occupy(bay.tier.slot_status(), bay.id.clone());
            }
        }

        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
    }

    fn dirty_train(id: &str, days_ago: i64) -> Train {
        let mut t = Train::new(id, today());
        t.cleaning.last_cleaned = today() - Duration::days(days_ago);
        t
    }

    #[test]
    fn test_bay_names_and_tiers() {
        let pool = CleaningPool::new(&CleaningConfig::default());
        assert_eq!(pool.total_bays(), 10);
        assert_eq!(pool.bays()[0].id, "BAY_01");
        assert_eq!(pool.bays()[2].tier, BayTier::InProgress);
        assert_eq!(pool.bays()[3].id, "BAY_04");
        assert_eq!(pool.bays()[3].tier, BayTier::Booking);
        assert_eq!(pool.bays()[9].id, "BAY_10");
    }

    #[test]
    fn test_admission_prefers_in_progress_then_booking() {
        let mut trains: Vec<Train> = (0..5).map(|i| dirty_train(&format!("T{}", i), 10 + i)).collect();
        let mut pool = CleaningPool::new(&CleaningConfig::default());
        let summary = pool.resolve_day(&mut trains, 1, today(), &mut Vec::new());

        assert!(trains.iter().all(|t| t.cleaning.required));
        assert_eq!(summary.in_progress, 3);
        assert_eq!(summary.booked, 2);
        // oldest clean (T4, 14 days) gets the first in-progress bay
        assert_eq!(trains[4].cleaning.bay_id.as_deref(), Some("BAY_01"));
        assert_eq!(trains[4].cleaning.slot_status, SlotStatus::InProgress);
        assert_eq!(trains[0].cleaning.slot_status, SlotStatus::Booked);
    }

    #[test]
    fn test_not_due_at_threshold() {
        let mut trains = vec![dirty_train("T1", 7)];
        let mut pool = CleaningPool::new(&CleaningConfig::default());
        let summary = pool.resolve_day(&mut trains, 1, today(), &mut Vec::new());
        assert_eq!(summary.admitted, 0);
        assert_eq!(summary.eligible, 0);
        assert!(!trains[0].cleaning.required);
    }

    #[test]
    fn test_completion_then_promotion_next_day() {
        let mut trains: Vec<Train> = (0..4).map(|i| dirty_train(&format!("T{}", i), 20 - i)).collect();
        let mut pool = CleaningPool::new(&CleaningConfig::default());
        pool.resolve_day(&mut trains, 1, today(), &mut Vec::new());
        assert_eq!(pool.occupied_in(BayTier::Booking), 1);

        let tomorrow = today() + Duration::days(1);
        let mut events = Vec::new();
        let summary = pool.resolve_day(&mut trains, 2, tomorrow, &mut events);

        assert_eq!(summary.completed, 3);
        assert_eq!(summary.promoted, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.booked, 0);
        assert_eq!(trains[0].cleaning.last_cleaned, tomorrow);
        assert_eq!(trains[3].cleaning.slot_status, SlotStatus::InProgress);
    }

    #[test]
    fn test_over_demand_waits_in_booking() {
        let mut trains: Vec<Train> = (0..14).map(|i| dirty_train(&format!("T{:02}", i), 30)).collect();
        let mut pool = CleaningPool::new(&CleaningConfig::default());
        let summary = pool.resolve_day(&mut trains, 1, today(), &mut Vec::new());

        assert_eq!(pool.occupancy(), 10);
        assert_eq!(summary.eligible, 14);
        assert_eq!(summary.admitted, 10);
        // equal last-cleaned dates keep fleet order
        assert!(trains[..10].iter().all(|t| t.cleaning.required));
        assert!(trains[10..].iter().all(|t| !t.cleaning.required));
    }

    #[test]
    fn test_from_fleet_seats_and_normalizes() {
        let mut trains = vec![
            Train::new("A", today()),
            Train::new("B", today()),
            Train::new("C", today()),
        ];
        trains[0].cleaning.slot_status = SlotStatus::InProgress;
        trains[0].cleaning.bay_id = Some("BAY_02".to_string());
        trains[1].cleaning.slot_status = SlotStatus::Booked;
        trains[1].cleaning.bay_id = Some("BAY_01".to_string()); // wrong tier
        trains[2].cleaning.required = true;

        let (pool, repairs) = CleaningPool::from_fleet(&mut trains, &CleaningConfig::default());

        assert_eq!(pool.occupancy(), 2);
        assert_eq!(trains[0].cleaning.bay_id.as_deref(), Some("BAY_02"));
        assert!(trains[0].cleaning.required);
        assert_eq!(trains[1].cleaning.bay_id.as_deref(), Some("BAY_04"));
        assert!(!trains[2].cleaning.required);
        assert_eq!(repairs.len(), 2);
    }

    #[test]
    fn test_reconcile_trims_most_recently_cleaned() {
        let mut trains = vec![dirty_train("OLD", 20), dirty_train("NEW", 9)];
        let mut pool = CleaningPool::new(&CleaningConfig::default());
        pool.resolve_day(&mut trains, 1, today(), &mut Vec::new());
        assert_eq!(pool.occupancy(), 2);

        let released = pool.reconcile(&mut trains, 1, today(), 1, &mut Vec::new());
        assert_eq!(released, 1);
        assert_eq!(pool.occupancy(), 1);
        assert!(trains[0].cleaning.holds_slot());
        assert!(!trains[1].cleaning.holds_slot());
    }
}

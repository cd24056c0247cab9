//! Branding campaigns
//!
//! A campaign accrues exposure on every day its train ran in service (the
//! status held coming into the day). It ends the day accrued exposure reaches
//! the target. Trains without a campaign may pick one up on cadence days.
//!
//! Campaign IDs come from the [`CampaignRegistry`], which remembers every ID
//! seen during the run so a minted ID is never reused.

use crate::models::{Event, OperationalStatus, Train};
use crate::orchestrator::config::BrandingConfig;
use crate::rng::RandomSource;
use crate::SimulationCalendar;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Used campaign IDs plus a monotonically increasing mint counter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRegistry {
    used: BTreeSet<String>,
    counter: u64,
}

impl CampaignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an externally supplied ID; returns false if it was already used
    pub fn register(&mut self, id: &str) -> bool {
        self.used.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    /// Number of IDs ever seen
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Mint a fresh ID of the form `CMP-00001`
    pub fn mint(&mut self) -> String {
        loop {
            self.counter += 1;
            let id = format!("CMP-{:05}", self.counter);
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Build a registry from imported trains, repairing campaign fields
    ///
    /// - active without an ID gets a minted ID
    /// - inactive with an ID has the campaign cleared
    /// - an ID already held by an earlier active train is re-minted
    ///
    /// Returns the registry and one message per repair.
    pub fn from_fleet(trains: &mut [Train]) -> (Self, Vec<String>) {
        let mut registry = Self::new();
        let mut repairs = Vec::new();
        let mut active_ids: HashSet<String> = HashSet::new();

        // Every imported ID is reserved before anything is minted
        for id in trains.iter().filter_map(|t| t.branding.campaign_id.as_deref()) {
            registry.register(id);
        }

        for train in trains.iter_mut() {
            let id = train.branding.campaign_id.take();
            match (train.branding.active, id) {
                (false, None) => {}
                (false, Some(id)) => {
                    repairs.push(format!(
                        "{}: inactive campaign {} cleared",
                        train.id(),
                        id
                    ));
                    train.branding.clear();
                }
                (true, None) => {
                    let minted = registry.mint();
                    repairs.push(format!(
                        "{}: active campaign without ID assigned {}",
                        train.id(),
                        minted
                    ));
                    active_ids.insert(minted.clone());
                    train.branding.campaign_id = Some(minted);
                }
                (true, Some(id)) => {
                    if active_ids.insert(id.clone()) {
                        train.branding.campaign_id = Some(id);
                    } else {
                        let minted = registry.mint();
                        repairs.push(format!(
                            "{}: duplicate campaign {} re-issued as {}",
                            train.id(),
                            id,
                            minted
                        ));
                        active_ids.insert(minted.clone());
                        train.branding.campaign_id = Some(minted);
                    }
                }
            }
        }

        for message in &repairs {
            warn!("{}", message);
        }
        (registry, repairs)
    }
}

/// Accrue exposure for one train; returns true if its campaign ended today
pub fn accrue(train: &mut Train, day: usize, events: &mut Vec<Event>) -> bool {
    if !train.branding.active {
        return false;
    }
    if train.decision.status == OperationalStatus::InService {
        train.branding.exposure_accrued += train.branding.daily_quota;
    }
    if train.branding.exposure_accrued < train.branding.exposure_target {
        return false;
    }

    let campaign_id = train.branding.campaign_id.clone().unwrap_or_default();
    debug!(train = %train.id(), campaign = %campaign_id, "campaign ended");
    events.push(Event::CampaignEnded {
        day,
        train_id: train.id().to_string(),
        campaign_id,
        exposure_accrued: train.branding.exposure_accrued,
    });
    train.branding.clear();
    true
}

/// Run the branding step for the whole fleet
///
/// Accrual happens for every train first; new campaigns are then drawn in
/// fleet order on cadence days, so the RNG stream does not depend on which
/// campaigns happened to end.
pub fn advance_fleet(
    trains: &mut [Train],
    day: usize,
    registry: &mut CampaignRegistry,
    config: &BrandingConfig,
    rng: &mut dyn RandomSource,
    events: &mut Vec<Event>,
) {
    let ended: Vec<bool> = trains
        .iter_mut()
        .map(|train| accrue(train, day, events))
        .collect();

    if !SimulationCalendar::is_cadence_day(day, config.cadence_days) {
        return;
    }

    for (train, ended_today) in trains.iter_mut().zip(ended) {
        if train.branding.active || ended_today {
            continue;
        }
        if !rng.chance(config.start_probability) {
            continue;
        }

        let target = config.target_candidates[rng.pick(config.target_candidates.len())];
        let quota = config.quota_candidates[rng.pick(config.quota_candidates.len())];
        let campaign_id = registry.mint();

        train.branding.active = true;
        train.branding.campaign_id = Some(campaign_id.clone());
        train.branding.exposure_accrued = 0.0;
        train.branding.exposure_target = target;
        train.branding.daily_quota = quota;

        debug!(train = %train.id(), campaign = %campaign_id, target, quota, "campaign started");
        events.push(Event::CampaignStarted {
            day,
            train_id: train.id().to_string(),
            campaign_id,
            exposure_target: target,
            daily_quota: quota,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use chrono::NaiveDate;

    fn train(id: &str) -> Train {
        Train::new(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    fn with_campaign(id: &str, campaign: &str, accrued: f64, target: f64, quota: f64) -> Train {
        let mut t = train(id);
        t.branding.active = true;
        t.branding.campaign_id = Some(campaign.to_string());
        t.branding.exposure_accrued = accrued;
        t.branding.exposure_target = target;
        t.branding.daily_quota = quota;
        t
    }

    #[test]
    fn test_mint_skips_registered_ids() {
        let mut registry = CampaignRegistry::new();
        registry.register("CMP-00001");
        assert_eq!(registry.mint(), "CMP-00002");
        assert_eq!(registry.mint(), "CMP-00003");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_accrual_only_when_in_service() {
        let mut t = with_campaign("T1", "CMP-00009", 0.0, 100.0, 12.0);
        t.decision.status = OperationalStatus::Standby;
        assert!(!accrue(&mut t, 1, &mut Vec::new()));
        assert_eq!(t.branding.exposure_accrued, 0.0);

        t.decision.status = OperationalStatus::InService;
        assert!(!accrue(&mut t, 2, &mut Vec::new()));
        assert_eq!(t.branding.exposure_accrued, 12.0);
    }

    #[test]
    fn test_campaign_ends_and_clears_fields() {
        let mut t = with_campaign("T1", "CMP-00009", 308.0, 320.0, 12.0);
        let mut events = Vec::new();
        assert!(accrue(&mut t, 7, &mut events));
        assert!(!t.branding.active);
        assert!(t.branding.campaign_id.is_none());
        assert_eq!(t.branding.exposure_target, 0.0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_no_start_outside_cadence_day() {
        let mut trains = vec![train("T1")];
        let mut registry = CampaignRegistry::new();
        let mut rng = ScriptedRandom::new().with_floats(vec![0.0]);
        advance_fleet(
            &mut trains,
            44,
            &mut registry,
            &BrandingConfig::default(),
            &mut rng,
            &mut Vec::new(),
        );
        assert!(!trains[0].branding.active);
    }

    #[test]
    fn test_start_on_cadence_day_draws_candidates() {
        let mut trains = vec![train("T1"), train("T2")];
        let mut registry = CampaignRegistry::new();
        // T1 succeeds (0.05 < 0.1), T2 fails (0.5)
        let mut rng = ScriptedRandom::new()
            .with_floats(vec![0.05, 0.5])
            .with_picks(vec![2, 1]);
        let mut events = Vec::new();
        advance_fleet(
            &mut trains,
            45,
            &mut registry,
            &BrandingConfig::default(),
            &mut rng,
            &mut events,
        );

        assert!(trains[0].branding.active);
        assert_eq!(trains[0].branding.campaign_id.as_deref(), Some("CMP-00001"));
        assert_eq!(trains[0].branding.exposure_target, 480.0);
        assert_eq!(trains[0].branding.daily_quota, 16.0);
        assert!(!trains[1].branding.active);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_from_fleet_repairs_campaign_fields() {
        let mut trains = vec![
            with_campaign("T1", "CMP-00001", 0.0, 240.0, 12.0),
            with_campaign("T2", "CMP-00001", 0.0, 240.0, 12.0),
            train("T3"),
        ];
        trains[2].branding.campaign_id = Some("OLD-7".to_string());

        let (registry, repairs) = CampaignRegistry::from_fleet(&mut trains);

        assert_eq!(repairs.len(), 2);
        assert_eq!(trains[0].branding.campaign_id.as_deref(), Some("CMP-00001"));
        assert_eq!(trains[1].branding.campaign_id.as_deref(), Some("CMP-00002"));
        assert!(trains[2].branding.campaign_id.is_none());
        assert!(registry.contains("OLD-7"));
    }
}

//! Certificate fitness tracking
//!
//! Each certificate moves through a small state machine per train:
//!
//! ```text
//! Valid --(date > expiry)--> Invalid(count = 0)
//! Invalid(count) --(next day)--> Invalid(count + 1)
//! Invalid(count + 1 == threshold) --> Valid(expiry = yesterday + window)
//! ```
//!
//! Counters exist only while a certificate is failing. A certificate that
//! arrives already invalid starts its counter at 0 on the first simulated day.

use crate::models::{CertificateKind, Event, Train};
use crate::orchestrator::config::FitnessConfig;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Consecutive-failure day counts for one train
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounters {
    pub rolling_stock: Option<u32>,
    pub signalling: Option<u32>,
    pub telecom: Option<u32>,
}

impl FailureCounters {
    pub fn get(&self, kind: CertificateKind) -> Option<u32> {
        match kind {
            CertificateKind::RollingStock => self.rolling_stock,
            CertificateKind::Signalling => self.signalling,
            CertificateKind::Telecom => self.telecom,
        }
    }

    fn slot(&mut self, kind: CertificateKind) -> &mut Option<u32> {
        match kind {
            CertificateKind::RollingStock => &mut self.rolling_stock,
            CertificateKind::Signalling => &mut self.signalling,
            CertificateKind::Telecom => &mut self.telecom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rolling_stock.is_none() && self.signalling.is_none() && self.telecom.is_none()
    }
}

/// Fleet-wide failure tracker, keyed by train ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessTracker {
    counters: BTreeMap<String, FailureCounters>,
}

impl FitnessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_count(&self, train_id: &str, kind: CertificateKind) -> Option<u32> {
        self.counters.get(train_id).and_then(|c| c.get(kind))
    }

    /// Number of trains with at least one failing certificate being counted
    pub fn tracked_trains(&self) -> usize {
        self.counters.len()
    }

    /// Advance every certificate of `train` by one day
    ///
    /// `today` is the date of `day`. Expiries and renewals are appended to
    /// `events`.
    pub fn advance(
        &mut self,
        train: &mut Train,
        day: usize,
        today: NaiveDate,
        config: &FitnessConfig,
        events: &mut Vec<Event>,
    ) {
        let train_id = train.id().to_string();
        let mut counters = self.counters.remove(&train_id).unwrap_or_default();

        for kind in CertificateKind::ALL {
            let rule = config.rule(kind);
            let cert = train.certificates.get_mut(kind);
            let counter = counters.slot(kind);

            if cert.valid {
                if today > cert.expiry_date {
                    cert.valid = false;
                    *counter = Some(0);
                    debug!(train = %train_id, %kind, "certificate expired");
                    events.push(Event::CertificateExpired {
                        day,
                        train_id: train_id.clone(),
                        kind,
                    });
                } else {
                    *counter = None;
                }
                continue;
            }

            match *counter {
                None => *counter = Some(0),
                Some(count) => {
                    let count = count + 1;
                    if count >= rule.failure_threshold {
                        let last_failed = today - Duration::days(1);
                        cert.valid = true;
                        cert.expiry_date = last_failed + Duration::days(rule.validity_days);
                        *counter = None;
                        debug!(
                            train = %train_id,
                            %kind,
                            expiry = %cert.expiry_date,
                            "certificate renewed"
                        );
                        events.push(Event::CertificateRenewed {
                            day,
                            train_id: train_id.clone(),
                            kind,
                            expiry_date: cert.expiry_date,
                        });
                    } else {
                        *counter = Some(count);
                    }
                }
            }
        }

        if !counters.is_empty() {
            self.counters.insert(train_id, counters);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_valid_certificate_untouched_before_expiry() {
        let mut tracker = FitnessTracker::new();
        let mut train = Train::new("T1", start());
        let mut events = Vec::new();

        tracker.advance(&mut train, 1, start(), &FitnessConfig::default(), &mut events);

        assert!(train.certificates.all_valid());
        assert!(events.is_empty());
        assert_eq!(tracker.tracked_trains(), 0);
    }

    #[test]
    fn test_expiry_on_day_after_expiry_date() {
        let mut tracker = FitnessTracker::new();
        let mut train = Train::new("T1", start());
        train.certificates.telecom.expiry_date = start();
        let mut events = Vec::new();
        let config = FitnessConfig::default();

        tracker.advance(&mut train, 1, start(), &config, &mut events);
        assert!(train.certificates.telecom.valid);

        tracker.advance(&mut train, 2, start() + Duration::days(1), &config, &mut events);
        assert!(!train.certificates.telecom.valid);
        assert_eq!(tracker.failure_count("T1", CertificateKind::Telecom), Some(0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_counter_removed_when_renewed() {
        let mut tracker = FitnessTracker::new();
        let mut train = Train::new("T1", start());
        train.certificates.signalling.valid = false;
        let config = FitnessConfig::default();
        let mut events = Vec::new();

        for day in 1..=6 {
            let date = start() + Duration::days(day as i64 - 1);
            tracker.advance(&mut train, day, date, &config, &mut events);
        }

        assert!(train.certificates.signalling.valid);
        assert_eq!(tracker.failure_count("T1", CertificateKind::Signalling), None);
        assert_eq!(tracker.tracked_trains(), 0);
    }
}

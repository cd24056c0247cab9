//! Multi-objective scoring and ranking
//!
//! # Score
//!
//! Any invalid certificate scores 0. Otherwise the score is the sum of:
//!
//! | criterion                     | points                                   |
//! |-------------------------------|------------------------------------------|
//! | certificates                  | 15 + 10 + 10                             |
//! | job card status closed        | 5                                        |
//! | open job cards                | `max(0, 5 - 2 * open)`                   |
//! | branding active               | 3, plus `max(0, 7 * (1 - accrued/target))` when target > 0 |
//! | total mileage                 | 5 below 50 000 km, 2.5 below 150 000 km  |
//! | mileage since service         | `max(0, 5 - floor(since / interval / 10 000))` |
//! | balance variance              | `max(0, 5 - abs(variance) / 1000)`       |
//! | brakepad wear                 | `max(0, 10 - floor(wear / 10))`          |
//! | HVAC wear                     | `max(0, 5 - floor(wear / 10))`           |
//! | cleaning not required         | 10                                       |
//! | shunting moves                | `max(0, 3 - 3 * moves)`                  |
//! | currently In_Service          | 2                                        |
//!
//! rounded to two decimals.
//!
//! # Ranking
//!
//! Score descending, then ascending by the tie-break key (see [`TieKey`]).
//! The sort is stable, so exact ties keep fleet order.

use crate::models::{JobCardStatus, OperationalStatus, Train};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Five-level tie-break key, compared in order, lower first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TieKey {
    /// Open job cards when the status is open, else 0
    pub job_card_priority: u32,
    /// Branding completion ratio (1 without an active campaign)
    pub branding_ratio: f64,
    pub balance_abs: f64,
    /// 0 when no cleaning is required
    pub cleaning: u8,
    pub shunting: u32,
}

impl TieKey {
    pub fn of(train: &Train) -> Self {
        Self {
            job_card_priority: train.job_cards.priority(),
            branding_ratio: train.branding.completion_ratio(),
            balance_abs: train.mileage.balance_variance.abs(),
            cleaning: u8::from(train.cleaning.required),
            shunting: train.stabling.shunting_moves,
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.job_card_priority
            .cmp(&other.job_card_priority)
            .then_with(|| self.branding_ratio.total_cmp(&other.branding_ratio))
            .then_with(|| self.balance_abs.total_cmp(&other.balance_abs))
            .then_with(|| self.cleaning.cmp(&other.cleaning))
            .then_with(|| self.shunting.cmp(&other.shunting))
    }
}

/// One row of a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTrain {
    /// Position of the train in the fleet slice
    pub index: usize,
    pub train_id: String,
    pub score: f64,
    pub rank: usize,
}

/// Scores and ranks trains
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_induction_core::{ScoringEngine, Train};
///
/// let engine = ScoringEngine::new(10_000.0);
/// let train = Train::new("TS-01", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// // Pristine train: balance variance 0 gives the full 5 balance points
/// assert_eq!(engine.score(&train), 90.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    service_interval_km: f64,
}

impl ScoringEngine {
    pub fn new(service_interval_km: f64) -> Self {
        Self {
            service_interval_km,
        }
    }

    pub fn score(&self, train: &Train) -> f64 {
        if !train.certificates.all_valid() {
            return 0.0;
        }

        let mut score = 15.0 + 10.0 + 10.0;

        if train.job_cards.status == JobCardStatus::Close {
            score += 5.0;
        }
        score += (5.0 - 2.0 * f64::from(train.job_cards.open)).max(0.0);

        let branding = &train.branding;
        if branding.active {
            score += 3.0;
            if branding.exposure_target > 0.0 {
                let ratio = branding.exposure_accrued / branding.exposure_target;
                score += (7.0 * (1.0 - ratio)).max(0.0);
            }
        }

        let total = train.mileage.total_km;
        if total < 50_000.0 {
            score += 5.0;
        } else if total < 150_000.0 {
            score += 2.5;
        }

        let since = train.mileage.since_service_km.max(0.0);
        let service_penalty = if self.service_interval_km > 0.0 {
            (since / self.service_interval_km / 10_000.0).floor()
        } else {
            0.0
        };
        score += (5.0 - service_penalty).max(0.0);

        score += (5.0 - train.mileage.balance_variance.abs() / 1000.0).max(0.0);

        score += (10.0 - (train.wear.brakepad_pct / 10.0).floor()).max(0.0);
        score += (5.0 - (train.wear.hvac_pct / 10.0).floor()).max(0.0);

        if !train.cleaning.required {
            score += 10.0;
        }

        score += (3.0 - 3.0 * f64::from(train.stabling.shunting_moves)).max(0.0);

        if train.decision.status == OperationalStatus::InService {
            score += 2.0;
        }

        round2(score)
    }

    /// Rank the fleet without modifying it
    pub fn rank(&self, trains: &[Train]) -> Vec<RankedTrain> {
        let mut rows: Vec<(usize, f64, TieKey)> = trains
            .iter()
            .enumerate()
            .map(|(i, t)| (i, self.score(t), TieKey::of(t)))
            .collect();

        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.compare(&b.2)));

        rows.into_iter()
            .enumerate()
            .map(|(position, (index, score, _))| RankedTrain {
                index,
                train_id: trains[index].id().to_string(),
                score,
                rank: position + 1,
            })
            .collect()
    }

    /// Rank the fleet and write score and rank into each train's decision
    pub fn apply(&self, trains: &mut [Train]) -> Vec<RankedTrain> {
        let ranking = self.rank(trains);
        for row in &ranking {
            let decision = &mut trains[row.index].decision;
            decision.score = row.score;
            decision.rank = row.rank;
        }
        ranking
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn train(id: &str) -> Train {
        let mut t = Train::new(id, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        t.mileage.balance_variance = 10_000.0;
        t
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(10_000.0)
    }

    #[test]
    fn test_invalid_certificate_scores_zero() {
        let mut t = train("T1");
        t.certificates.rolling_stock.valid = false;
        assert_eq!(engine().score(&t), 0.0);
    }

    #[test]
    fn test_branding_points() {
        let mut t = train("T1");
        let base = engine().score(&t);
        t.branding.active = true;
        t.branding.campaign_id = Some("CMP-00001".to_string());
        t.branding.exposure_target = 200.0;
        t.branding.exposure_accrued = 50.0;
        // 3 + 7 * 0.75
        assert_eq!(engine().score(&t), base + 8.25);
    }

    #[test]
    fn test_mileage_band_edges() {
        let mut t = train("T1");
        t.mileage.total_km = 49_999.0;
        let below = engine().score(&t);
        t.mileage.total_km = 50_000.0;
        assert_eq!(engine().score(&t), below - 2.5);
        t.mileage.total_km = 150_000.0;
        assert_eq!(engine().score(&t), below - 5.0);
    }

    #[test]
    fn test_wear_steps() {
        let mut t = train("T1");
        let base = engine().score(&t);
        t.wear.brakepad_pct = 19.9;
        t.wear.hvac_pct = 10.0;
        assert_eq!(engine().score(&t), base - 2.0);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let mut t = train("T1");
        t.mileage.balance_variance = 1234.567;
        let s = engine().score(&t);
        assert_eq!(s, (s * 100.0).round() / 100.0);
    }

    #[test]
    fn test_tie_break_prefers_lower_shunting() {
        let mut a = train("A");
        let mut b = train("B");
        // same score: shunting points are 0 for both at >= 1 move
        a.stabling.assign(1, 3);
        b.stabling.assign(2, 2);
        let ranking = engine().rank(&[a, b]);
        assert_eq!(ranking[0].train_id, "B");
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].rank, 2);
    }

    #[test]
    fn test_exact_ties_keep_fleet_order() {
        let trains: Vec<Train> = ["X", "Y", "Z"].iter().map(|id| train(id)).collect();
        let ranking = engine().rank(&trains);
        let ids: Vec<&str> = ranking.iter().map(|r| r.train_id.as_str()).collect();
        assert_eq!(ids, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_apply_writes_decisions() {
        let mut trains = vec![train("A"), train("B")];
        trains[0].certificates.telecom.valid = false;
        engine().apply(&mut trains);
        assert_eq!(trains[0].decision.rank, 2);
        assert_eq!(trains[0].decision.score, 0.0);
        assert_eq!(trains[1].decision.rank, 1);
    }
}

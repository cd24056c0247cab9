//! Calendar management for the simulation
//!
//! The simulation operates in whole days. Day 0 is the imported fleet table;
//! day 1 is the first simulated day and falls on the start date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Maps simulated day numbers onto calendar dates
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_induction_core::SimulationCalendar;
///
/// let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let mut calendar = SimulationCalendar::new(start);
/// assert_eq!(calendar.current_day(), 0);
///
/// calendar.advance_day();
/// assert_eq!(calendar.current_day(), 1);
/// assert_eq!(calendar.current_date(), start);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationCalendar {
    /// Date of simulated day 1
    start_date: NaiveDate,
    /// Last resolved day (0 = input state)
    current_day: usize,
}

impl SimulationCalendar {
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            current_day: 0,
        }
    }

    /// Resume a calendar at an already resolved day
    pub fn resume(start_date: NaiveDate, current_day: usize) -> Self {
        Self {
            start_date,
            current_day,
        }
    }

    /// Advance to the next simulated day and return its number
    pub fn advance_day(&mut self) -> usize {
        self.current_day += 1;
        self.current_day
    }

    pub fn current_day(&self) -> usize {
        self.current_day
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Date of the last resolved day (the start date for day 0)
    pub fn current_date(&self) -> NaiveDate {
        self.date_of(self.current_day)
    }

    /// Date a given day number falls on
    ///
    /// Day 0 and day 1 share the start date: the imported table describes
    /// the fleet on the morning of the first simulated day.
    pub fn date_of(&self, day: usize) -> NaiveDate {
        self.start_date + Duration::days(day.saturating_sub(1) as i64)
    }

    /// Whether `day` is a multiple of `every` (day 0 never is)
    pub fn is_cadence_day(day: usize, every: usize) -> bool {
        every > 0 && day > 0 && day % every == 0
    }
}

//! Fleet table import
//!
//! Turns raw string records (one per train, as read from a CSV table) into
//! [`Train`]s. Decoding is lenient: a value that is missing or cannot be
//! parsed falls back to 0 / false / the current date and is counted in the
//! [`ImportReport`]. Only schema problems are fatal (see [`ImportError`]).
//!
//! Headers are matched after stripping non-alphanumerics and lower-casing,
//! so `BrakepadWear%`, `brakepad_wear` and `Brakepad Wear` are one column.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleet_induction_core::{records_to_trains, RawRecord, SimulationConfig};
//!
//! let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let mut row = RawRecord::new();
//! row.insert("TrainID".to_string(), "TS-01".to_string());
//! row.insert("BrakepadWear%".to_string(), "42.5".to_string());
//!
//! let (trains, report) = records_to_trains(&[row], today, &SimulationConfig::default()).unwrap();
//! assert_eq!(trains[0].wear.brakepad_pct, 42.5);
//! assert_eq!(report.rows, 1);
//! ```

use crate::models::{
    CertificateKind, JobCardStatus, OperationalStatus, SlotStatus, Train,
};
use crate::orchestrator::config::SimulationConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// One table row: header → cell text
pub type RawRecord = HashMap<String, String>;

/// Date formats accepted on input, tried in order
pub const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];

/// Fatal import errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("fleet table has no rows")]
    NoRows,

    #[error("fleet table is missing required column {0}")]
    MissingColumn(&'static str),

    /// Row numbers are 1-based data rows
    #[error("row {row} has an empty TrainID")]
    EmptyTrainId { row: usize },

    #[error("duplicate TrainID {0}")]
    DuplicateTrainId(String),
}

/// Per-column accounting of lenient decoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub rows: usize,
    /// Column → number of cells that were missing or unparseable
    pub defaulted: BTreeMap<String, usize>,
    /// Column → number of derived or out-of-range values that were recomputed
    pub corrected: BTreeMap<String, usize>,
}

impl ImportReport {
    pub fn defaulted_in(&self, column: &str) -> usize {
        self.defaulted.get(column).copied().unwrap_or(0)
    }

    pub fn corrected_in(&self, column: &str) -> usize {
        self.corrected.get(column).copied().unwrap_or(0)
    }

    pub fn total_defaulted(&self) -> usize {
        self.defaulted.values().sum()
    }

    pub fn total_corrected(&self) -> usize {
        self.corrected.values().sum()
    }

    fn note_default(&mut self, column: &str) {
        *self.defaulted.entry(column.to_string()).or_insert(0) += 1;
    }

    fn note_correction(&mut self, column: &str) {
        *self.corrected.entry(column.to_string()).or_insert(0) += 1;
    }
}

// ============================================================================
// Cell parsing
// ============================================================================

/// Header normalization: keep ASCII alphanumerics, lower-cased
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_null(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("nan")
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Stabling positions are written as numbers or labels like `B07`
fn parse_position(value: &str) -> Option<u32> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

// ============================================================================
// Row decoding
// ============================================================================

struct RowReader<'a> {
    cells: HashMap<String, &'a str>,
    train_id: String,
    report: &'a mut ImportReport,
}

impl<'a> RowReader<'a> {
    fn cell(&self, column: &str) -> Option<&'a str> {
        self.cells
            .get(&normalize_header(column))
            .copied()
            .filter(|v| !is_null(v))
    }

    fn decode<T>(
        &mut self,
        column: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        match self.cell(column) {
            None => {
                debug!(train = %self.train_id, column, "missing value, using default");
                self.report.note_default(column);
                default
            }
            Some(raw) => parse(raw).unwrap_or_else(|| {
                warn!(train = %self.train_id, column, value = raw, "unparseable value, using default");
                self.report.note_default(column);
                default
            }),
        }
    }

    fn boolean(&mut self, column: &str) -> bool {
        self.decode(column, false, parse_bool)
    }

    fn date(&mut self, column: &str, today: NaiveDate) -> NaiveDate {
        self.decode(column, today, parse_date)
    }

    fn number(&mut self, column: &str) -> f64 {
        let value = self.decode(column, 0.0, parse_number);
        if value < 0.0 {
            self.report.note_correction(column);
            return 0.0;
        }
        value
    }

    fn percent(&mut self, column: &str) -> f64 {
        let value = self.number(column);
        if value > 100.0 {
            self.report.note_correction(column);
            return 100.0;
        }
        value
    }

    fn count(&mut self, column: &str) -> u32 {
        self.number(column).round() as u32
    }

    fn text(&self, column: &str) -> Option<String> {
        self.cell(column).map(|v| v.trim().to_string())
    }
}

const CERTIFICATE_COLUMNS: [(CertificateKind, &str, &str); 3] = [
    (
        CertificateKind::RollingStock,
        "RollingStockFitnessStatus",
        "RollingStockFitnessExpiryDate",
    ),
    (
        CertificateKind::Signalling,
        "SignallingFitnessStatus",
        "SignallingFitnessExpiryDate",
    ),
    (
        CertificateKind::Telecom,
        "TelecomFitnessStatus",
        "TelecomFitnessExpiryDate",
    ),
];

fn decode_row(
    reader: &mut RowReader<'_>,
    today: NaiveDate,
    config: &SimulationConfig,
) -> Train {
    let mut train = Train::new(reader.train_id.clone(), today);

    for (kind, status_column, expiry_column) in CERTIFICATE_COLUMNS {
        let certificate = train.certificates.get_mut(kind);
        certificate.valid = reader.boolean(status_column);
        certificate.expiry_date = reader.date(expiry_column, today);
    }

    // Job cards
    train.job_cards.open = reader.count("OpenJobCards");
    train.job_cards.closed = reader.count("ClosedJobCards");
    train.job_cards.last_update = reader.date("LastJobCardUpdate", today);
    let derived = JobCardStatus::for_open_count(train.job_cards.open);
    if let Some(stated) = reader.text("JobCardStatus") {
        let stated_open = stated.to_ascii_lowercase().starts_with("open");
        if stated_open != (derived == JobCardStatus::Open) {
            reader.report.note_correction("JobCardStatus");
        }
    }
    train.job_cards.status = derived;

    // Branding
    train.branding.active = reader.boolean("BrandingActive");
    train.branding.campaign_id = reader.text("BrandCampaignID");
    train.branding.exposure_accrued = reader.number("ExposureHoursAccrued");
    train.branding.exposure_target = reader.number("ExposureHoursTarget");
    train.branding.daily_quota = reader.number("ExposureDailyQuota");

    // Mileage
    let interval = config.mileage.service_interval_km;
    train.mileage.total_km = reader.number("TotalMileageKM");
    train.mileage.since_service_km = reader.number("MileageSinceLastServiceKM");
    train.mileage.rebalance(interval);
    if let Some(stated) = reader.cell("MileageBalanceVariance").and_then(parse_number) {
        if (stated - train.mileage.balance_variance).abs() > 0.01 {
            reader.report.note_correction("MileageBalanceVariance");
        }
    }

    // Wear
    train.wear.brakepad_pct = reader.percent("BrakepadWear%");
    train.wear.hvac_pct = reader.percent("HVACWear%");

    // Cleaning
    train.cleaning.required = reader.boolean("CleaningRequired");
    train.cleaning.slot_status = reader.decode("CleaningSlotStatus", SlotStatus::Free, SlotStatus::parse);
    train.cleaning.bay_id = reader.text("BayOccupancyIDC");
    train.cleaning.last_cleaned = reader.date("LastCleanedDate", today);

    // Stabling
    let bay = reader.decode("BayPositionID", 1, parse_position).max(1);
    let mut sequence = reader
        .decode("StablingSequenceOrder", 1.0, parse_number)
        .max(0.0)
        .round() as u32;
    let capacity = config.stabling.bay_capacity.max(1) as u32;
    if !(1..=capacity).contains(&sequence) {
        reader.report.note_correction("StablingSequenceOrder");
        sequence = sequence.clamp(1, capacity);
    }
    train.stabling.assign(bay, sequence);
    if let Some(stated) = reader.cell("ShuntingMovesRequired").and_then(parse_number) {
        if stated.round() as u32 != train.stabling.shunting_moves {
            reader.report.note_correction("ShuntingMovesRequired");
        }
    }

    // Decision carried over from a previous day's table
    train.decision.status = reader.decode(
        "OperationalStatus",
        OperationalStatus::Standby,
        OperationalStatus::parse,
    );
    if let Some(rank) = reader.cell("Rank").and_then(parse_number) {
        train.decision.rank = rank.max(0.0).round() as usize;
    }

    train
}

/// Decode a fleet table into trains
///
/// Rejects the table when it has no rows, no `TrainID` column, an empty ID
/// or a duplicate ID. Everything else is defaulted and reported.
pub fn records_to_trains(
    rows: &[RawRecord],
    today: NaiveDate,
    config: &SimulationConfig,
) -> Result<(Vec<Train>, ImportReport), ImportError> {
    if rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    let id_key = normalize_header("TrainID");
    let has_id_column = rows
        .iter()
        .any(|row| row.keys().any(|k| normalize_header(k) == id_key));
    if !has_id_column {
        return Err(ImportError::MissingColumn("TrainID"));
    }

    let mut report = ImportReport {
        rows: rows.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut trains = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let cells: HashMap<String, &str> = row
            .iter()
            .map(|(k, v)| (normalize_header(k), v.as_str()))
            .collect();

        let train_id = cells
            .get(&id_key)
            .map(|v| v.trim())
            .filter(|v| !is_null(v))
            .ok_or(ImportError::EmptyTrainId { row: index + 1 })?
            .to_string();
        if !seen.insert(train_id.clone()) {
            return Err(ImportError::DuplicateTrainId(train_id));
        }

        let mut reader = RowReader {
            cells,
            train_id,
            report: &mut report,
        };
        trains.push(decode_row(&mut reader, today, config));
    }

    for (column, count) in &report.defaulted {
        if *count > 0 {
            warn!(column = %column, count, "column values defaulted on import");
        }
    }
    if report.total_corrected() > 0 {
        debug!(corrections = report.total_corrected(), "derived fields recomputed on import");
    }

    Ok((trains, report))
}

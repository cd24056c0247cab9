//! Output table rows
//!
//! One [`TrainRow`] per train, with the input schema's column names plus
//! `Score` and `Rank`. Booleans are written `TRUE`/`FALSE`, dates
//! `DD-MM-YYYY` and absent IDs `NULL`, so a day's table can be fed back in
//! as the next run's input.

use crate::models::Train;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const OUTPUT_DATE_FORMAT: &str = "%d-%m-%Y";
pub const NULL: &str = "NULL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRow {
    #[serde(rename = "TrainID")]
    pub train_id: String,
    #[serde(rename = "RollingStockFitnessStatus")]
    pub rolling_stock_status: String,
    #[serde(rename = "RollingStockFitnessExpiryDate")]
    pub rolling_stock_expiry: String,
    #[serde(rename = "SignallingFitnessStatus")]
    pub signalling_status: String,
    #[serde(rename = "SignallingFitnessExpiryDate")]
    pub signalling_expiry: String,
    #[serde(rename = "TelecomFitnessStatus")]
    pub telecom_status: String,
    #[serde(rename = "TelecomFitnessExpiryDate")]
    pub telecom_expiry: String,
    #[serde(rename = "JobCardStatus")]
    pub job_card_status: String,
    #[serde(rename = "OpenJobCards")]
    pub open_job_cards: u32,
    #[serde(rename = "ClosedJobCards")]
    pub closed_job_cards: u32,
    #[serde(rename = "LastJobCardUpdate")]
    pub last_job_card_update: String,
    #[serde(rename = "BrandingActive")]
    pub branding_active: String,
    #[serde(rename = "BrandCampaignID")]
    pub campaign_id: String,
    #[serde(rename = "ExposureHoursAccrued")]
    pub exposure_accrued: f64,
    #[serde(rename = "ExposureHoursTarget")]
    pub exposure_target: f64,
    #[serde(rename = "ExposureDailyQuota")]
    pub exposure_daily_quota: f64,
    #[serde(rename = "TotalMileageKM")]
    pub total_km: f64,
    #[serde(rename = "MileageSinceLastServiceKM")]
    pub since_service_km: f64,
    #[serde(rename = "MileageBalanceVariance")]
    pub balance_variance: f64,
    #[serde(rename = "BrakepadWear%")]
    pub brakepad_wear_pct: f64,
    #[serde(rename = "HVACWear%")]
    pub hvac_wear_pct: f64,
    #[serde(rename = "CleaningRequired")]
    pub cleaning_required: String,
    #[serde(rename = "CleaningSlotStatus")]
    pub cleaning_slot_status: String,
    #[serde(rename = "BayOccupancyIDC")]
    pub cleaning_bay: String,
    #[serde(rename = "LastCleanedDate")]
    pub last_cleaned: String,
    #[serde(rename = "BayPositionID")]
    pub bay_position: u32,
    #[serde(rename = "ShuntingMovesRequired")]
    pub shunting_moves: u32,
    #[serde(rename = "StablingSequenceOrder")]
    pub sequence_order: u32,
    #[serde(rename = "OperationalStatus")]
    pub operational_status: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Rank")]
    pub rank: usize,
}

pub fn format_bool(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

fn format_id(id: Option<&str>) -> String {
    id.unwrap_or(NULL).to_string()
}

/// Distances and hours are written with two decimals
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl TrainRow {
    pub fn from_train(train: &Train) -> Self {
        let certs = &train.certificates;
        Self {
            train_id: train.id().to_string(),
            rolling_stock_status: format_bool(certs.rolling_stock.valid),
            rolling_stock_expiry: format_date(certs.rolling_stock.expiry_date),
            signalling_status: format_bool(certs.signalling.valid),
            signalling_expiry: format_date(certs.signalling.expiry_date),
            telecom_status: format_bool(certs.telecom.valid),
            telecom_expiry: format_date(certs.telecom.expiry_date),
            job_card_status: train.job_cards.status.label().to_string(),
            open_job_cards: train.job_cards.open,
            closed_job_cards: train.job_cards.closed,
            last_job_card_update: format_date(train.job_cards.last_update),
            branding_active: format_bool(train.branding.active),
            campaign_id: format_id(train.branding.campaign_id.as_deref()),
            exposure_accrued: round2(train.branding.exposure_accrued),
            exposure_target: round2(train.branding.exposure_target),
            exposure_daily_quota: round2(train.branding.daily_quota),
            total_km: round2(train.mileage.total_km),
            since_service_km: round2(train.mileage.since_service_km),
            balance_variance: round2(train.mileage.balance_variance),
            brakepad_wear_pct: round2(train.wear.brakepad_pct),
            hvac_wear_pct: round2(train.wear.hvac_pct),
            cleaning_required: format_bool(train.cleaning.required),
            cleaning_slot_status: train.cleaning.slot_status.label().to_string(),
            cleaning_bay: format_id(train.cleaning.bay_id.as_deref()),
            last_cleaned: format_date(train.cleaning.last_cleaned),
            bay_position: train.stabling.bay_position,
            shunting_moves: train.stabling.shunting_moves,
            sequence_order: train.stabling.sequence_order,
            operational_status: train.decision.status.label().to_string(),
            score: train.decision.score,
            rank: train.decision.rank,
        }
    }
}

/// Rows in rank order; unranked trains keep fleet order at the end
pub fn trains_to_rows(trains: &[Train]) -> Vec<TrainRow> {
    let mut ordered: Vec<&Train> = trains.iter().collect();
    ordered.sort_by_key(|t| match t.decision.rank {
        0 => usize::MAX,
        rank => rank,
    });
    ordered.into_iter().map(TrainRow::from_train).collect()
}

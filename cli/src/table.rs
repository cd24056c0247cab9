// ==========================================
// CSV table IO
// ==========================================

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use fleet_induction_core::{RawRecord, TrainRow};
use std::fs::File;
use std::path::Path;

/// Read a fleet table into raw header → cell records
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .clone();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading row {} of {}", index + 1, path.display()))?;
        let row: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        records.push(row);
    }
    Ok(records)
}

pub fn write_rows(path: &Path, rows: &[TrainRow]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

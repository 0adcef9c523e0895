//! CSV readers for chiller timeseries, weather, and district load profiles.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PrepError, PrepResult};
use crate::plant::series::{SeriesRecord, Weather};

#[derive(Debug, Deserialize)]
struct WeatherRecord {
    dry_bulb_c: f64,
    wet_bulb_c: f64,
}

/// Reads one chiller's timeseries from a headed CSV file.
///
/// Columns: `mass_flow_kg_s`, `load_w`, `power_w`, `evap_inlet_c`, and the
/// optional `plr` and `evap_outlet_c`.
///
/// # Errors
///
/// Returns [`PrepError::Csv`] for unreadable or malformed rows and
/// [`PrepError::InvalidInput`] for a file without data rows.
pub fn read_series(path: &Path) -> PrepResult<Vec<SeriesRecord>> {
    let rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    collect_rows(rdr, &path.display().to_string())
}

/// Parses chiller timeseries rows from any reader.
///
/// # Errors
///
/// See [`read_series`].
pub fn parse_series(reader: impl Read, entity: &str) -> PrepResult<Vec<SeriesRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    collect_rows(rdr, entity)
}

/// Reads hourly weather with `dry_bulb_c` and `wet_bulb_c` columns.
///
/// # Errors
///
/// Returns [`PrepError::Csv`] for unreadable or malformed rows and
/// [`PrepError::InvalidInput`] for a file without data rows.
pub fn read_weather(path: &Path) -> PrepResult<Weather> {
    let rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    weather_from(rdr, &path.display().to_string())
}

/// Parses weather rows from any reader.
///
/// # Errors
///
/// See [`read_weather`].
pub fn parse_weather(reader: impl Read) -> PrepResult<Weather> {
    let rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    weather_from(rdr, "weather")
}

/// Reads a district load profile: one load value (W_th) per line, no header.
///
/// Only the first column is used.
///
/// # Errors
///
/// Returns [`PrepError::Csv`] for unreadable rows, and
/// [`PrepError::InvalidInput`] for a non-numeric value or an empty file.
pub fn read_load_profile(path: &Path) -> PrepResult<Vec<f64>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    load_profile_from(rdr, &path.display().to_string())
}

/// Parses a district load profile from any reader.
///
/// # Errors
///
/// See [`read_load_profile`].
pub fn parse_load_profile(reader: impl Read, entity: &str) -> PrepResult<Vec<f64>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    load_profile_from(rdr, entity)
}

fn collect_rows<R: Read>(
    mut rdr: csv::Reader<R>,
    entity: &str,
) -> PrepResult<Vec<SeriesRecord>> {
    let records = rdr
        .deserialize()
        .collect::<Result<Vec<SeriesRecord>, csv::Error>>()?;
    non_empty(records, entity)
}

fn weather_from<R: Read>(mut rdr: csv::Reader<R>, entity: &str) -> PrepResult<Weather> {
    let mut weather = Weather::default();
    for row in rdr.deserialize() {
        let row: WeatherRecord = row?;
        weather.dry_bulb_c.push(row.dry_bulb_c);
        weather.wet_bulb_c.push(row.wet_bulb_c);
    }
    if weather.is_empty() {
        return Err(no_rows(entity));
    }
    Ok(weather)
}

fn load_profile_from<R: Read>(mut rdr: csv::Reader<R>, entity: &str) -> PrepResult<Vec<f64>> {
    let mut load = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let field = row.get(0).unwrap_or_default();
        if field.is_empty() {
            continue;
        }
        let value: f64 = field.parse().map_err(|_| PrepError::InvalidInput {
            entity: entity.to_string(),
            message: format!("row {}: invalid load value \"{field}\"", i + 1),
        })?;
        load.push(value);
    }
    non_empty(load, entity)
}

fn non_empty<T>(rows: Vec<T>, entity: &str) -> PrepResult<Vec<T>> {
    if rows.is_empty() {
        Err(no_rows(entity))
    } else {
        Ok(rows)
    }
}

fn no_rows(entity: &str) -> PrepError {
    PrepError::InvalidInput {
        entity: entity.to_string(),
        message: "no data rows".into(),
    }
}

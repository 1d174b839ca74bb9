//! CSV import/export for raw signals, readings and per-pulse features.
//!
//! Signal files: one sample per row. A column named `ppg` is used when present,
//! otherwise the last column (`time_s,ppg` as written by `generate_signal`).
//!
//! Reading files: `timestamp,systolic,diastolic` with epoch-millisecond timestamps.

use crate::domain::ml::feature_registry::{FEATURE_NAMES, features_to_vector};
use crate::domain::pulse::PulseFeatures;
use crate::domain::reading::BpReading;
use anyhow::{Context, Result, bail};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

pub const SIGNAL_COLUMN: &str = "ppg";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ReadingRecord {
    timestamp: i64,
    systolic: i32,
    diastolic: i32,
}

pub fn read_signal_csv(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("opening signal file {:?}", path))?;
    read_signal(BufReader::new(file)).with_context(|| format!("reading signal file {:?}", path))
}

pub fn read_signal<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        bail!("signal file has no columns");
    }
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(SIGNAL_COLUMN))
        .unwrap_or(headers.len() - 1);

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let field = record
            .get(column)
            .with_context(|| format!("row {} has no column {}", row + 1, column))?;
        let value: f64 = field
            .trim()
            .parse()
            .with_context(|| format!("row {}: invalid sample {:?}", row + 1, field))?;
        samples.push(value);
    }
    Ok(samples)
}

/// Writes `time_s,ppg` rows.
pub fn write_signal<W: Write>(writer: W, samples: &[f64], sample_rate_hz: f64) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["time_s", SIGNAL_COLUMN])?;
    for (i, sample) in samples.iter().enumerate() {
        let t = i as f64 / sample_rate_hz;
        wtr.write_record([format!("{t:.4}"), sample.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_readings_csv(path: &Path) -> Result<Vec<BpReading>> {
    let file = File::open(path).with_context(|| format!("opening readings file {:?}", path))?;
    read_readings(BufReader::new(file)).with_context(|| format!("reading readings file {:?}", path))
}

pub fn read_readings<R: Read>(reader: R) -> Result<Vec<BpReading>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut readings = Vec::new();
    for result in rdr.deserialize() {
        let record: ReadingRecord = result?;
        let timestamp = Utc
            .timestamp_millis_opt(record.timestamp)
            .single()
            .with_context(|| format!("timestamp out of range: {}", record.timestamp))?;
        readings.push(BpReading::new(timestamp, record.systolic, record.diastolic));
    }
    Ok(readings)
}

pub fn write_readings<W: Write>(writer: W, readings: &[BpReading]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for reading in readings {
        wtr.serialize(ReadingRecord {
            timestamp: reading.timestamp.timestamp_millis(),
            systolic: reading.systolic,
            diastolic: reading.diastolic,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per pulse, registry order, registry names as header.
pub fn write_features<W: Write>(writer: W, features: &[PulseFeatures]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(FEATURE_NAMES)?;
    for pulse in features {
        wtr.write_record(features_to_vector(pulse).iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

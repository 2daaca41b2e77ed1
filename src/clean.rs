//! Data cleaning: null report, duplicate removal and duration outliers.
//!
//! Stages run in a fixed order (nulls are only reported, then duplicates
//! are dropped, then implausible durations) and each one hands back a new
//! vector plus the number of rows it removed.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::CleaningConfig;
use crate::errors::Result;
use crate::model::{RawTrip, TripRecord};
use crate::stats::pct;

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldNulls {
    pub field: &'static str,
    pub missing: usize,
}

/// Missing values per column, in file column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullReport {
    pub rows: usize,
    pub fields: Vec<FieldNulls>,
}

impl NullReport {
    /// A report for `rows` already-validated records.
    pub fn complete(rows: usize) -> Self {
        Self {
            rows,
            fields: RawTrip::FIELDS
                .iter()
                .map(|&field| FieldNulls { field, missing: 0 })
                .collect(),
        }
    }

    pub fn total_missing(&self) -> usize {
        self.fields.iter().map(|f| f.missing).sum()
    }
}

/// Counts missing values per column. Blank strings count as missing.
pub fn null_report(rows: &[RawTrip]) -> NullReport {
    let mut report = NullReport::complete(rows.len());

    for row in rows {
        for (slot, (_, value)) in report.fields.iter_mut().zip(row.fields()) {
            if value.is_none_or(|v| v.trim().is_empty()) {
                slot.missing += 1;
            }
        }
    }

    report
}

/// What each cleaning stage removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub nulls: NullReport,
    pub duplicates_removed: usize,
    pub outliers_removed: usize,
    /// Outliers as a share of the rows that reached the outlier filter.
    pub outliers_pct: f64,
    pub output_rows: usize,
}

impl CleaningReport {
    pub fn removed(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

/// Cleaned trips together with the report describing how they were obtained.
#[derive(Debug, Clone)]
pub struct CleanedTrips {
    pub trips: Vec<TripRecord>,
    pub report: CleaningReport,
}

/// Drops exact duplicates, keeping the first occurrence and the input order.
pub fn remove_duplicates(trips: Vec<TripRecord>) -> (Vec<TripRecord>, usize) {
    let before = trips.len();
    let mut seen = HashSet::with_capacity(before);

    let unique: Vec<TripRecord> = trips
        .into_iter()
        .filter(|trip| seen.insert(trip.clone()))
        .collect();

    let removed = before - unique.len();
    (unique, removed)
}

/// Keeps trips whose duration lies within the configured bounds, inclusive.
pub fn filter_outliers(trips: Vec<TripRecord>, config: &CleaningConfig) -> (Vec<TripRecord>, usize) {
    let before = trips.len();
    let bounds = config.min_duration_minutes..=config.max_duration_minutes;

    let kept: Vec<TripRecord> = trips
        .into_iter()
        .filter(|trip| bounds.contains(&trip.duration_minutes()))
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}

/// Validates raw rows and cleans the result.
///
/// # Errors
///
/// Fails on the first row with a missing or malformed required field; the
/// null report is logged before that happens.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn clean_raw(rows: Vec<RawTrip>, config: &CleaningConfig) -> Result<CleanedTrips> {
    let nulls = null_report(&rows);
    log_nulls(&nulls);

    let trips = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_trip(i + 1))
        .collect::<Result<Vec<_>>>()?;

    Ok(clean_with_nulls(trips, nulls, config))
}

/// Cleans records that are already known to have every field present.
#[tracing::instrument(skip_all, fields(rows = trips.len()))]
pub fn clean(trips: Vec<TripRecord>, config: &CleaningConfig) -> CleanedTrips {
    let nulls = NullReport::complete(trips.len());
    log_nulls(&nulls);
    clean_with_nulls(trips, nulls, config)
}

fn clean_with_nulls(trips: Vec<TripRecord>, nulls: NullReport, config: &CleaningConfig) -> CleanedTrips {
    let input_rows = trips.len();

    let (trips, duplicates_removed) = remove_duplicates(trips);
    if duplicates_removed > 0 {
        warn!(duplicates_removed, "Duplicate trips removed");
    } else {
        info!("No duplicate trips found");
    }

    let before_filter = trips.len();
    let (trips, outliers_removed) = filter_outliers(trips, config);
    let outliers_pct = pct(outliers_removed, before_filter);
    info!(
        outliers_removed,
        outliers_pct = %format!("{outliers_pct:.1}"),
        min_minutes = config.min_duration_minutes,
        max_minutes = config.max_duration_minutes,
        remaining = trips.len(),
        "Duration outliers removed"
    );

    let report = CleaningReport {
        input_rows,
        nulls,
        duplicates_removed,
        outliers_removed,
        outliers_pct,
        output_rows: trips.len(),
    };

    CleanedTrips { trips, report }
}

fn log_nulls(nulls: &NullReport) {
    if nulls.total_missing() == 0 {
        info!(rows = nulls.rows, "No missing values found");
        return;
    }

    for f in nulls.fields.iter().filter(|f| f.missing > 0) {
        warn!(field = f.field, missing = f.missing, "Missing values");
    }
}

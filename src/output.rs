//! Output formatting and persistence for analysis results.
//!
//! Writes one chart-data JSON file per aggregate table, the full report as
//! JSON, a narrative text summary and the processed trips as CSV.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::analyzer::Analysis;
use crate::analyzers::types::AnalysisReport;
use crate::features::{DerivedTrip, Locale};
use crate::model::{TIMESTAMP_FORMAT, TripRecord, UserClass, VehicleKind};

pub const REPORT_FILE: &str = "report.json";
pub const SUMMARY_FILE: &str = "summary.txt";
pub const PROCESSED_FILE: &str = "trips_processed.csv";

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AnalysisReport) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &AnalysisReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Chart-ready data for one aggregate table.
///
/// Carries only what a plotting front-end needs to draw the table; how it is
/// drawn is up to the consumer.
#[derive(Debug, Serialize)]
pub struct ChartData<'a, T: Serialize> {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub table: &'a T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    Line,
    Area,
}

/// One row of the processed trip export.
#[derive(Debug, Serialize)]
struct ProcessedRow<'a> {
    id: &'a str,
    start_time: String,
    end_time: String,
    user_class: UserClass,
    duration_minutes: f64,
    weekday_name: &'static str,
    hour_of_day: u32,
    month_name: &'static str,
}

impl<'a> ProcessedRow<'a> {
    fn new(t: &'a DerivedTrip, locale: Locale) -> Self {
        Self {
            id: &t.trip.id,
            start_time: t.trip.start_time.format(TIMESTAMP_FORMAT).to_string(),
            end_time: t.trip.end_time.format(TIMESTAMP_FORMAT).to_string(),
            user_class: t.trip.user_class,
            duration_minutes: t.fields.duration_minutes,
            weekday_name: locale.weekday_name(t.fields.weekday),
            hour_of_day: t.fields.hour_of_day,
            month_name: locale.month_name(t.fields.month),
        }
    }
}

/// Serializes `value` as pretty JSON to `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Writes the processed trips as CSV to `writer`, headers included.
pub fn write_processed<W: Write>(writer: W, trips: &[DerivedTrip], locale: Locale) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for t in trips {
        writer.serialize(ProcessedRow::new(t, locale))?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the processed trip export into `dir`, gzip-compressed when `gzip`
/// is set, and returns the file path.
pub fn export_processed(dir: &Path, trips: &[DerivedTrip], locale: Locale, gzip: bool) -> Result<PathBuf> {
    let path = if gzip {
        dir.join(format!("{PROCESSED_FILE}.gz"))
    } else {
        dir.join(PROCESSED_FILE)
    };

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_processed(&mut encoder, trips, locale)?;
        encoder.finish()?.flush()?;
    } else {
        write_processed(BufWriter::new(file), trips, locale)?;
    }

    info!(path = %path.display(), rows = trips.len(), gzip, "Processed trips exported");
    Ok(path)
}

/// Writes trips in the Divvy trip-data layout, so they can be loaded back as
/// a trip source.
pub fn write_trips(path: &Path, trips: &[TripRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    for trip in trips {
        writer.serialize(trip)?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = trips.len(), "Trips written");
    Ok(())
}

/// Writes one chart-data file per aggregate table and returns their paths.
pub fn write_charts(dir: &Path, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
    let paths = vec![
        write_chart(
            dir,
            "1_duration_by_user_class.json",
            ChartData {
                title: "Average trip duration by user type",
                kind: ChartKind::Bar,
                x_label: "User type",
                y_label: "Duration (minutes)",
                table: &report.duration_by_user_class,
            },
        )?,
        write_chart(
            dir,
            "2_trips_by_weekday.json",
            ChartData {
                title: "Trips by day of week",
                kind: ChartKind::GroupedBar,
                x_label: "Day of week",
                y_label: "Trips",
                table: &report.trips_by_weekday,
            },
        )?,
        write_chart(
            dir,
            "3_trips_by_hour.json",
            ChartData {
                title: "Trips by hour of day",
                kind: ChartKind::Line,
                x_label: "Hour of day",
                y_label: "Trips",
                table: &report.trips_by_hour,
            },
        )?,
        write_chart(
            dir,
            "4_trips_by_month.json",
            ChartData {
                title: "Trips by month",
                kind: ChartKind::Area,
                x_label: "Month",
                y_label: "Trips",
                table: &report.trips_by_month,
            },
        )?,
        write_chart(
            dir,
            "5_vehicle_preference.json",
            ChartData {
                title: "Vehicle type preference (%)",
                kind: ChartKind::GroupedBar,
                x_label: "User type",
                y_label: "Share of trips (%)",
                table: &report.vehicle_preference,
            },
        )?,
    ];

    debug!(charts = paths.len(), "Chart data written");
    Ok(paths)
}

fn write_chart<T: Serialize>(dir: &Path, name: &str, chart: ChartData<'_, T>) -> Result<PathBuf> {
    let path = dir.join(name);
    write_json(&path, &chart)?;
    Ok(path)
}

/// Executive summary of a report, rendered through [`fmt::Display`].
pub struct Narrative<'a>(pub &'a AnalysisReport);

impl fmt::Display for Narrative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let s = &report.summary;

        let weekday = |class| s.peaks_for(class).map_or("-", |p| p.peak_weekday.as_str());
        let month = |class| s.peaks_for(class).map_or("-", |p| p.busiest_month.as_str());
        let hour = |class| {
            s.peaks_for(class)
                .map_or_else(|| "-".to_string(), |p| format!("{}h", p.peak_hour))
        };

        writeln!(f, "CYCLISTIC BIKE-SHARE ANALYSIS - EXECUTIVE SUMMARY")?;
        writeln!(f, "Generated: {}", report.generated_at.format("%Y-%m-%d"))?;
        writeln!(f)?;
        writeln!(
            f,
            "Objective: understand how annual members and casual riders use the service differently."
        )?;
        writeln!(f)?;

        writeln!(f, "1. TRIP DURATION")?;
        writeln!(f, "   - Casual: {:.1} minutes on average", s.occasional_mean_minutes)?;
        writeln!(f, "   - Members: {:.1} minutes on average", s.subscriber_mean_minutes)?;
        match s.duration_delta_pct.value() {
            Some(delta) if delta >= 0.0 => {
                writeln!(f, "   - Casual riders ride {delta:.1}% longer than members")?
            }
            Some(delta) => writeln!(f, "   - Casual riders ride {:.1}% shorter than members", -delta)?,
            None => writeln!(f, "   - Duration difference is undefined for this dataset")?,
        }
        writeln!(f)?;

        writeln!(f, "2. WEEKLY PATTERN")?;
        writeln!(f, "   - Casual peak day: {}", weekday(UserClass::Occasional))?;
        writeln!(f, "   - Member peak day: {}", weekday(UserClass::Subscriber))?;
        writeln!(f, "   - Weekend trips: {} of {}", s.weekend_trips, s.total_trips)?;
        writeln!(f)?;

        writeln!(f, "3. DAILY PATTERN")?;
        writeln!(f, "   - Casual peak hour: {}", hour(UserClass::Occasional))?;
        writeln!(f, "   - Member peak hour: {}", hour(UserClass::Subscriber))?;
        writeln!(f)?;

        writeln!(f, "4. SEASONALITY")?;
        writeln!(f, "   - Casual busiest month: {}", month(UserClass::Occasional))?;
        writeln!(f, "   - Member busiest month: {}", month(UserClass::Subscriber))?;
        writeln!(f)?;

        writeln!(f, "5. VEHICLE PREFERENCE")?;
        for kind in VehicleKind::ALL {
            if let Some(row) = report.vehicle_preference.get(kind) {
                writeln!(
                    f,
                    "   - {kind}: members {:.1}% | casual {:.1}%",
                    row.subscriber_pct, row.occasional_pct
                )?;
            }
        }
        writeln!(f)?;

        let c = &report.cleaning;
        writeln!(f, "DATASET")?;
        writeln!(f, "   - Trips analysed: {}", s.total_trips)?;
        writeln!(
            f,
            "   - Members: {} ({:.1}%) | Casual: {} ({:.1}%)",
            s.subscriber_trips, s.subscriber_pct, s.occasional_trips, s.occasional_pct
        )?;
        if let (Some(first), Some(last)) = (s.first_start, s.last_start) {
            writeln!(
                f,
                "   - Period: {} to {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            )?;
        }
        writeln!(
            f,
            "   - Cleaning: {} rows in, {} duplicates and {} outliers ({:.1}%) removed",
            c.input_rows, c.duplicates_removed, c.outliers_removed, c.outliers_pct
        )
    }
}

/// Assembles the narrative summary from the report's headline numbers.
pub fn render_narrative(report: &AnalysisReport) -> String {
    Narrative(report).to_string()
}

/// Writes every artifact for `analysis` into `dir` and returns their paths.
#[tracing::instrument(skip(analysis), fields(dir = %dir.display()))]
pub fn write_artifacts(dir: &Path, analysis: &Analysis, gzip: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut paths = write_charts(dir, &analysis.report)?;

    let report_path = dir.join(REPORT_FILE);
    write_json(&report_path, &analysis.report)?;
    paths.push(report_path);

    let summary_path = dir.join(SUMMARY_FILE);
    fs::write(&summary_path, render_narrative(&analysis.report))?;
    paths.push(summary_path);

    paths.push(export_processed(
        dir,
        &analysis.trips,
        analysis.report.locale,
        gzip,
    )?);

    info!(artifacts = paths.len(), "Artifacts written");
    Ok(paths)
}

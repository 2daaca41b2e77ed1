use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::{
    duration_by_user_class, summarize, trips_by_hour, trips_by_month, trips_by_weekday,
    vehicle_preference,
};
use crate::analyzers::types::AnalysisReport;
use crate::clean::{CleanedTrips, CleaningReport, clean, clean_raw};
use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::{DerivedTrip, Locale, derive_all};
use crate::model::{RawTrip, TripRecord};

/// Output of a full pipeline run: the cleaned trips with their derived
/// fields, and every table computed from them.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub trips: Vec<DerivedTrip>,
    pub report: AnalysisReport,
}

/// Builds all aggregate tables and the summary for already-derived trips.
pub fn analyze(trips: &[DerivedTrip], cleaning: CleaningReport, locale: Locale) -> AnalysisReport {
    let duration_by_user_class = duration_by_user_class(trips);
    let trips_by_weekday = trips_by_weekday(trips, locale);
    let trips_by_hour = trips_by_hour(trips);
    let trips_by_month = trips_by_month(trips, locale);
    let vehicle_preference = vehicle_preference(trips);

    let summary = summarize(
        trips,
        &duration_by_user_class,
        &trips_by_weekday,
        &trips_by_hour,
        &trips_by_month,
    );

    info!(
        total = summary.total_trips,
        members = summary.subscriber_trips,
        casual = summary.occasional_trips,
        duration_delta_pct = %summary.duration_delta_pct,
        "Aggregation complete"
    );

    AnalysisReport {
        schema_version: 1,
        generated_at: Utc::now(),
        locale,
        cleaning,
        duration_by_user_class,
        trips_by_weekday,
        trips_by_hour,
        trips_by_month,
        vehicle_preference,
        summary,
    }
}

/// Cleans, derives and aggregates validated trips.
#[tracing::instrument(skip_all, fields(trips = trips.len()))]
pub fn run(trips: Vec<TripRecord>, config: &AnalysisConfig) -> Analysis {
    finish(clean(trips, &config.cleaning), config.locale)
}

/// Validates, cleans, derives and aggregates rows read from a trip source.
///
/// # Errors
///
/// Fails when a row is missing a required field or holds a malformed value.
#[tracing::instrument(skip_all, fields(rows = rows.len()))]
pub fn run_raw(rows: Vec<RawTrip>, config: &AnalysisConfig) -> Result<Analysis> {
    Ok(finish(clean_raw(rows, &config.cleaning)?, config.locale))
}

fn finish(cleaned: CleanedTrips, locale: Locale) -> Analysis {
    let CleanedTrips { trips, report } = cleaned;
    let trips = derive_all(trips);
    let report = analyze(&trips, report, locale);
    Analysis { trips, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::synthetic::generate;

    #[test]
    fn test_run_synthetic_counts_consistent() {
        let trips = generate(&SourceConfig::default().with_records(2000).with_seed(1)).unwrap();
        let analysis = run(trips, &AnalysisConfig::default());

        let report = &analysis.report;
        let n = analysis.trips.len() as u64;
        assert_eq!(report.trips_by_weekday.grand_total, n);
        assert_eq!(report.trips_by_hour.grand_total, n);
        assert_eq!(report.trips_by_month.grand_total, n);
        assert_eq!(report.summary.total_trips, n);
        assert_eq!(report.cleaning.output_rows as u64, n);
    }

    #[test]
    fn test_run_raw_propagates_validation_error() {
        let rows = vec![RawTrip::default()];
        assert!(run_raw(rows, &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_run_empty_dataset() {
        let analysis = run(Vec::new(), &AnalysisConfig::default());
        assert!(analysis.trips.is_empty());
        assert_eq!(analysis.report.summary.total_trips, 0);
        assert_eq!(analysis.report.trips_by_weekday.rows.len(), 7);
        assert!(!analysis.report.summary.duration_delta_pct.is_defined());
    }
}

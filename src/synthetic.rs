//! Seeded generator for bike-share trips.
//!
//! Stands in for a real trip-data export: the output has the same
//! [`TripRecord`] shape the loader produces, with class-dependent durations
//! (members ride short commutes, casual riders longer leisure trips).

use chrono::{Duration, NaiveDateTime};
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::errors::{PipelineError, Result};
use crate::model::{TripRecord, UserClass, VehicleKind};

/// Share of trips per vehicle kind, in [`VehicleKind::ALL`] order.
const VEHICLE_WEIGHTS: [u32; 3] = [60, 35, 5];

/// Share of trips per user class, in [`UserClass::ALL`] order.
const USER_CLASS_WEIGHTS: [u32; 2] = [70, 30];

/// Mean and standard deviation of trip length in minutes, per user class.
const SUBSCRIBER_DURATION: (f64, f64) = (15.0, 5.0);
const OCCASIONAL_DURATION: (f64, f64) = (30.0, 10.0);

/// Generates `config.n_records` trips. The same config always yields the
/// same records.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when `config` fails validation.
#[tracing::instrument(skip(config), fields(n_records = config.n_records, seed = config.seed, year = config.year))]
pub fn generate(config: &SourceConfig) -> Result<Vec<TripRecord>> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    let vehicles = WeightedIndex::new(VEHICLE_WEIGHTS).map_err(config_error)?;
    let classes = WeightedIndex::new(USER_CLASS_WEIGHTS).map_err(config_error)?;
    let subscriber_duration =
        Normal::new(SUBSCRIBER_DURATION.0, SUBSCRIBER_DURATION.1).map_err(config_error)?;
    let occasional_duration =
        Normal::new(OCCASIONAL_DURATION.0, OCCASIONAL_DURATION.1).map_err(config_error)?;

    let (grid_start, slots) = hourly_grid(config.year)?;
    debug!(%grid_start, slots, "Hourly start-time grid");

    let stations: Vec<String> = (1..=config.station_count)
        .map(|i| format!("Station_{i}"))
        .collect();

    let mut trips = Vec::with_capacity(config.n_records);

    for i in 0..config.n_records {
        let vehicle_kind = VehicleKind::ALL[vehicles.sample(&mut rng)];
        let start_time = grid_start + Duration::hours(rng.random_range(0..slots));
        let user_class = UserClass::ALL[classes.sample(&mut rng)];

        let minutes = match user_class {
            UserClass::Subscriber => subscriber_duration.sample(&mut rng),
            UserClass::Occasional => occasional_duration.sample(&mut rng),
        }
        .clamp(config.min_duration_minutes, config.max_duration_minutes);
        let end_time = start_time + Duration::milliseconds((minutes * 60_000.0).round() as i64);

        let start_location = Some(stations[rng.random_range(0..stations.len())].clone());
        let end_location = Some(stations[rng.random_range(0..stations.len())].clone());

        trips.push(TripRecord {
            id: format!("R{i:06}"),
            vehicle_kind,
            start_time,
            end_time,
            start_location,
            end_location,
            user_class,
        });
    }

    info!(trips = trips.len(), "Synthetic trips generated");
    Ok(trips)
}

/// First slot and number of hourly slots from Jan 1 00:00 through Dec 31
/// 00:00 of `year`, both ends included.
fn hourly_grid(year: i32) -> Result<(NaiveDateTime, i64)> {
    let out_of_range = || PipelineError::Configuration(format!("year {year} is out of range"));

    let first = chrono::NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)?;
    let last = chrono::NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(out_of_range)?;

    let start = first.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?;
    let slots = (last - first).num_days() * 24 + 1;

    Ok((start, slots))
}

fn config_error(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Configuration(e.to_string())
}

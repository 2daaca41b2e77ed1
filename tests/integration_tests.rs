use chrono::{Duration, NaiveDate};
use cyclistic_eda::analyzers::aggregate::{duration_by_user_class, trips_by_hour};
use cyclistic_eda::analyzers::analyzer::{run, run_raw};
use cyclistic_eda::clean::{clean, remove_duplicates};
use cyclistic_eda::config::{AnalysisConfig, CleaningConfig, SourceConfig};
use cyclistic_eda::errors::PipelineError;
use cyclistic_eda::features::derive_all;
use cyclistic_eda::model::{TripRecord, UserClass, VehicleKind};
use cyclistic_eda::output::write_trips;
use cyclistic_eda::parser::parse_trips;
use cyclistic_eda::stats::Stat;
use cyclistic_eda::synthetic::generate;
use std::{env, fs};

fn synthetic(n: usize, seed: u64) -> Vec<TripRecord> {
    generate(&SourceConfig::default().with_records(n).with_seed(seed)).expect("generate trips")
}

fn trip_at(i: usize, hour: u32, class: UserClass) -> TripRecord {
    let start = NaiveDate::from_ymd_opt(2023, 4, 1 + (i % 28) as u32)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap();
    TripRecord {
        id: format!("T{i:04}"),
        vehicle_kind: VehicleKind::ClassicBike,
        start_time: start,
        end_time: start + Duration::minutes(12 + i as i64),
        start_location: Some("Station_1".into()),
        end_location: Some("Station_2".into()),
        user_class: class,
    }
}

#[test]
fn test_full_pipeline() {
    let analysis = run(synthetic(5000, 42), &AnalysisConfig::default());
    let report = &analysis.report;

    assert_eq!(report.summary.total_trips, 5000);
    assert_eq!(report.duration_by_user_class.rows.len(), 2);
    assert!(report.summary.duration_delta_pct.or_zero() > 50.0);
}

#[test]
fn test_cleaned_durations_within_bounds() {
    let mut trips = synthetic(1000, 13);
    // inject implausible rows next to the synthetic ones
    let mut too_short = trips[0].clone();
    too_short.id = "short".into();
    too_short.end_time = too_short.start_time + Duration::seconds(30);
    let mut too_long = trips[1].clone();
    too_long.id = "long".into();
    too_long.end_time = too_long.start_time + Duration::hours(30);
    trips.push(too_short);
    trips.push(too_long);

    let analysis = run(trips, &AnalysisConfig::default());

    assert_eq!(analysis.report.cleaning.outliers_removed, 2);
    for t in &analysis.trips {
        assert!((1.0..=1440.0).contains(&t.fields.duration_minutes));
    }
}

#[test]
fn test_duplicate_removal_idempotent_on_synthetic_data() {
    let mut trips = synthetic(300, 5);
    trips.extend(trips[..50].to_vec());

    let (once, removed) = remove_duplicates(trips);
    assert_eq!(removed, 50);
    let (twice, removed_again) = remove_duplicates(once.clone());
    assert_eq!(removed_again, 0);
    assert_eq!(once, twice);
}

#[test]
fn test_weekday_counts_sum_to_cleaned_total() {
    let analysis = run(synthetic(3000, 21), &AnalysisConfig::default());
    let table = &analysis.report.trips_by_weekday;

    let cell_sum: u64 = table.rows.iter().map(|r| r.subscriber + r.occasional).sum();
    assert_eq!(cell_sum, analysis.trips.len() as u64);
    assert_eq!(table.grand_total, analysis.trips.len() as u64);
}

#[test]
fn test_vehicle_preference_columns_sum_to_100() {
    let analysis = run(synthetic(2000, 8), &AnalysisConfig::default());
    let pref = &analysis.report.vehicle_preference;

    for class in UserClass::ALL {
        assert!((pref.column_sum(class) - 100.0).abs() < 1e-6, "{class}");
    }
}

#[test]
fn test_source_deterministic_bytes() {
    let dir = env::temp_dir().join("cyclistic_eda_it_determinism");
    let _ = fs::remove_dir_all(&dir);
    let a = dir.join("a.csv");
    let b = dir.join("b.csv");

    let first = synthetic(1000, 42);
    let second = synthetic(1000, 42);
    assert_eq!(first, second);

    write_trips(&a, &first).unwrap();
    write_trips(&b, &second).unwrap();
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_small_synthetic_dataset_cleans_nothing() {
    let cleaned = clean(synthetic(100, 7), &CleaningConfig::default());

    assert_eq!(cleaned.trips.len(), 100);
    assert_eq!(cleaned.report.duplicates_removed, 0);
    assert_eq!(cleaned.report.outliers_removed, 0);
    assert_eq!(cleaned.report.removed(), 0);
}

#[test]
fn test_subscriber_only_dataset() {
    let trips: Vec<_> = (0..10)
        .map(|i| trip_at(i, 9, UserClass::Subscriber))
        .collect();
    let stats = duration_by_user_class(&derive_all(trips));

    let casual = stats.get(UserClass::Occasional).expect("casual row present");
    assert_eq!(casual.stats.count, 0);
    assert_eq!(casual.stats.mean, Stat::Undefined);
    assert_eq!(stats.get(UserClass::Subscriber).unwrap().stats.count, 10);
}

#[test]
fn test_all_trips_at_hour_8_peak() {
    let trips: Vec<_> = (0..20)
        .map(|i| {
            let class = if i % 3 == 0 {
                UserClass::Occasional
            } else {
                UserClass::Subscriber
            };
            trip_at(i, 8, class)
        })
        .collect();
    let table = trips_by_hour(&derive_all(trips));

    assert_eq!(table.peak(UserClass::Subscriber).unwrap().ordinal, 8);
    assert_eq!(table.peak(UserClass::Occasional).unwrap().ordinal, 8);
}

#[test]
fn test_generated_csv_loads_and_analyzes() {
    let dir = env::temp_dir().join("cyclistic_eda_it_reload");
    let _ = fs::remove_dir_all(&dir);
    let path = dir.join("trips.csv");

    let trips = synthetic(400, 99);
    write_trips(&path, &trips).unwrap();

    let rows = parse_trips(&fs::read(&path).unwrap()).unwrap();
    let from_csv = run_raw(rows, &AnalysisConfig::default()).unwrap();
    let direct = run(trips, &AnalysisConfig::default());

    assert_eq!(from_csv.trips, direct.trips);
    assert_eq!(
        from_csv.report.trips_by_month,
        direct.report.trips_by_month
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_user_class_aborts_run() {
    let csv = "\
ride_id,rideable_type,started_at,ended_at,start_station_name,end_station_name,member_casual
A1,classic_bike,2023-01-21 20:05:42,2023-01-21 20:16:33,Station_1,Station_2,member
A2,classic_bike,2023-01-21 21:05:42,2023-01-21 21:16:33,Station_1,Station_2,
";
    let rows = parse_trips(csv.as_bytes()).unwrap();
    let err = run_raw(rows, &AnalysisConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::MissingField {
            row: 2,
            field: "member_casual"
        }
    ));
}

#[test]
fn test_blank_station_names_are_counted_not_dropped() {
    let csv = "\
ride_id,rideable_type,started_at,ended_at,start_station_name,end_station_name,member_casual
A1,electric_bike,2023-01-21 20:05:42,2023-01-21 20:16:33,,Station_2,member
A2,classic_bike,2023-01-21 21:05:42,2023-01-21 21:16:33,Station_1,,casual
A3,classic_bike,2023-01-22 09:00:00,2023-01-22 09:30:00,Station_1,Station_2,casual
";
    let rows = parse_trips(csv.as_bytes()).unwrap();
    let analysis = run_raw(rows, &AnalysisConfig::default()).unwrap();
    let nulls = &analysis.report.cleaning.nulls;

    assert_eq!(analysis.trips.len(), 3);
    assert_eq!(analysis.report.summary.total_trips, 3);
    assert_eq!(nulls.total_missing(), 2);
    for field in ["start_station_name", "end_station_name"] {
        let count = nulls.fields.iter().find(|f| f.field == field).unwrap();
        assert_eq!(count.missing, 1, "{field}");
    }
}

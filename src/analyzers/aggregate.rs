use crate::analyzers::types::{
    ClassPeaks, CrossTab, Dimension, DurationStats, DurationSummary, PreferenceRow, Summary,
    VehiclePreference,
};
use crate::features::{DerivedFields, DerivedTrip, Locale, WEEKDAY_DISPLAY_ORDER};
use crate::model::{UserClass, VehicleKind};
use crate::stats::{Describe, Stat, pct};

/// Count, mean, median, stddev, min and max of trip duration per user class.
///
/// Both classes are always present; a class without trips has count 0 and
/// undefined statistics.
pub fn duration_by_user_class(trips: &[DerivedTrip]) -> DurationStats {
    let mut series: [Vec<f64>; 2] = [Vec::new(), Vec::new()];

    for t in trips {
        series[t.trip.user_class.index()].push(t.fields.duration_minutes);
    }

    DurationStats {
        rows: UserClass::ALL
            .iter()
            .map(|&user_class| DurationSummary {
                user_class,
                stats: Describe::of(&series[user_class.index()]),
            })
            .collect(),
    }
}

/// Trip counts on a Monday-first 7 × 2 grid.
pub fn trips_by_weekday(trips: &[DerivedTrip], locale: Locale) -> CrossTab {
    let categories = WEEKDAY_DISPLAY_ORDER
        .iter()
        .map(|&day| (day.number_from_monday(), locale.weekday_name(day).to_string()))
        .collect();

    crosstab(Dimension::Weekday, categories, trips, |f| {
        f.display_ordinal() as usize - 1
    })
}

/// Trip counts on a 24 × 2 grid, hour 0 first.
pub fn trips_by_hour(trips: &[DerivedTrip]) -> CrossTab {
    let categories = (0..24).map(|h| (h, format!("{h}h"))).collect();

    crosstab(Dimension::Hour, categories, trips, |f| f.hour_of_day as usize)
}

/// Trip counts on a 12 × 2 grid labeled with month abbreviations.
pub fn trips_by_month(trips: &[DerivedTrip], locale: Locale) -> CrossTab {
    let categories = (1..=12)
        .map(|m| (m, locale.month_abbr(m).to_string()))
        .collect();

    crosstab(Dimension::Month, categories, trips, |f| f.month as usize - 1)
}

/// Share of each vehicle kind within each user class, in percent.
pub fn vehicle_preference(trips: &[DerivedTrip]) -> VehiclePreference {
    let mut counts = [[0usize; 2]; VehicleKind::ALL.len()];
    let mut class_totals = [0usize; 2];

    for t in trips {
        let kind = vehicle_index(t.trip.vehicle_kind);
        let class = t.trip.user_class.index();
        counts[kind][class] += 1;
        class_totals[class] += 1;
    }

    let column_pct = |kind: usize, class: UserClass| {
        pct(counts[kind][class.index()], class_totals[class.index()])
    };

    VehiclePreference {
        rows: VehicleKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &vehicle_kind)| PreferenceRow {
                vehicle_kind,
                subscriber_pct: column_pct(i, UserClass::Subscriber),
                occasional_pct: column_pct(i, UserClass::Occasional),
            })
            .collect(),
    }
}

/// Headline numbers derived from the trips and the already-built tables.
pub fn summarize(
    trips: &[DerivedTrip],
    durations: &DurationStats,
    by_weekday: &CrossTab,
    by_hour: &CrossTab,
    by_month: &CrossTab,
) -> Summary {
    let total_trips = by_weekday.grand_total;
    let subscriber_trips = by_weekday.column_total(UserClass::Subscriber);
    let occasional_trips = by_weekday.column_total(UserClass::Occasional);

    let subscriber_mean = durations.mean(UserClass::Subscriber);
    let occasional_mean = durations.mean(UserClass::Occasional);

    let peaks = UserClass::ALL
        .iter()
        .map(|&user_class| ClassPeaks {
            user_class,
            peak_weekday: label_of_peak(by_weekday, user_class),
            peak_hour: by_hour.peak(user_class).map_or(0, |r| r.ordinal),
            busiest_month: label_of_peak(by_month, user_class),
        })
        .collect();

    Summary {
        total_trips,
        subscriber_trips,
        occasional_trips,
        subscriber_pct: pct(subscriber_trips as usize, total_trips as usize),
        occasional_pct: pct(occasional_trips as usize, total_trips as usize),
        subscriber_mean_minutes: subscriber_mean,
        occasional_mean_minutes: occasional_mean,
        duration_delta_pct: relative_delta_pct(occasional_mean, subscriber_mean),
        weekend_trips: trips.iter().filter(|t| t.fields.is_weekend).count() as u64,
        peaks,
        first_start: trips.iter().map(|t| t.trip.start_time).min(),
        last_start: trips.iter().map(|t| t.trip.start_time).max(),
    }
}

/// `(value - base) / base × 100`; undefined when either side is undefined or
/// `base` is zero.
pub fn relative_delta_pct(value: Stat, base: Stat) -> Stat {
    match (value, base) {
        (Stat::Value(v), Stat::Value(b)) if b != 0.0 => Stat::Value((v - b) / b * 100.0),
        _ => Stat::Undefined,
    }
}

fn crosstab(
    dimension: Dimension,
    categories: Vec<(u32, String)>,
    trips: &[DerivedTrip],
    slot: impl Fn(&DerivedFields) -> usize,
) -> CrossTab {
    let mut counts = vec![[0u64; 2]; categories.len()];

    for t in trips {
        counts[slot(&t.fields)][t.trip.user_class.index()] += 1;
    }

    CrossTab::from_counts(dimension, categories, &counts)
}

fn label_of_peak(table: &CrossTab, class: UserClass) -> String {
    table
        .peak(class)
        .map(|r| r.label.clone())
        .unwrap_or_default()
}

fn vehicle_index(kind: VehicleKind) -> usize {
    match kind {
        VehicleKind::ClassicBike => 0,
        VehicleKind::ElectricBike => 1,
        VehicleKind::DockedBike => 2,
    }
}

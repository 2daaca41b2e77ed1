//! Aggregate tables produced by the analysis pipeline.
//!
//! Every table is built once and then only read. They all serialize to JSON
//! so a presentation layer can consume them without linking this crate.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::clean::CleaningReport;
use crate::features::Locale;
use crate::model::{UserClass, VehicleKind};
use crate::stats::{Describe, Stat};

/// Duration statistics for one user class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationSummary {
    pub user_class: UserClass,
    #[serde(flatten)]
    pub stats: Describe,
}

/// Trip duration statistics grouped by user class, one row per class in
/// [`UserClass::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub rows: Vec<DurationSummary>,
}

impl DurationStats {
    pub fn get(&self, class: UserClass) -> Option<&DurationSummary> {
        self.rows.iter().find(|r| r.user_class == class)
    }

    pub fn mean(&self, class: UserClass) -> Stat {
        self.get(class).map_or(Stat::Undefined, |r| r.stats.mean)
    }
}

/// Categorical dimension a [`CrossTab`] is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Weekday,
    Hour,
    Month,
}

/// Trip counts for one category, split by user class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTabRow {
    /// Weekday (Monday=1), hour (0-23) or month (1-12).
    pub ordinal: u32,
    pub label: String,
    pub subscriber: u64,
    pub occasional: u64,
    pub total: u64,
}

impl CrossTabRow {
    pub fn count(&self, class: UserClass) -> u64 {
        match class {
            UserClass::Subscriber => self.subscriber,
            UserClass::Occasional => self.occasional,
        }
    }
}

/// Counts over a fixed grid of categories × user class, with totals.
///
/// Rows are in display order and every category of the dimension is present,
/// zero-filled when no trip falls into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub dimension: Dimension,
    pub rows: Vec<CrossTabRow>,
    pub subscriber_total: u64,
    pub occasional_total: u64,
    pub grand_total: u64,
}

impl CrossTab {
    /// Builds a table from `(ordinal, label)` categories and the per-class
    /// counts at the same positions.
    pub(crate) fn from_counts(
        dimension: Dimension,
        categories: Vec<(u32, String)>,
        counts: &[[u64; 2]],
    ) -> Self {
        let rows: Vec<CrossTabRow> = categories
            .into_iter()
            .zip(counts)
            .map(|((ordinal, label), c)| CrossTabRow {
                ordinal,
                label,
                subscriber: c[UserClass::Subscriber.index()],
                occasional: c[UserClass::Occasional.index()],
                total: c.iter().sum(),
            })
            .collect();

        let subscriber_total = rows.iter().map(|r| r.subscriber).sum();
        let occasional_total = rows.iter().map(|r| r.occasional).sum();

        Self {
            dimension,
            rows,
            subscriber_total,
            occasional_total,
            grand_total: subscriber_total + occasional_total,
        }
    }

    pub fn column_total(&self, class: UserClass) -> u64 {
        match class {
            UserClass::Subscriber => self.subscriber_total,
            UserClass::Occasional => self.occasional_total,
        }
    }

    /// The row with the most trips for `class`.
    ///
    /// Ties go to the first row in display order, so a column of all zeros
    /// yields the first row. `None` only for a table without rows.
    pub fn peak(&self, class: UserClass) -> Option<&CrossTabRow> {
        let mut best: Option<&CrossTabRow> = None;
        for row in &self.rows {
            match best {
                Some(b) if b.count(class) >= row.count(class) => {}
                _ => best = Some(row),
            }
        }
        best
    }
}

/// Share of one vehicle kind within each user class, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceRow {
    pub vehicle_kind: VehicleKind,
    pub subscriber_pct: f64,
    pub occasional_pct: f64,
}

impl PreferenceRow {
    pub fn pct(&self, class: UserClass) -> f64 {
        match class {
            UserClass::Subscriber => self.subscriber_pct,
            UserClass::Occasional => self.occasional_pct,
        }
    }
}

/// Vehicle kind × user class, normalized per user class column.
///
/// Each column sums to 100 when the class has trips and to 0 otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehiclePreference {
    pub rows: Vec<PreferenceRow>,
}

impl VehiclePreference {
    pub fn column_sum(&self, class: UserClass) -> f64 {
        self.rows.iter().map(|r| r.pct(class)).sum()
    }

    pub fn get(&self, kind: VehicleKind) -> Option<&PreferenceRow> {
        self.rows.iter().find(|r| r.vehicle_kind == kind)
    }
}

/// Peak categories for one user class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPeaks {
    pub user_class: UserClass,
    pub peak_weekday: String,
    pub peak_hour: u32,
    pub busiest_month: String,
}

/// Headline numbers the narrative is assembled from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_trips: u64,
    pub subscriber_trips: u64,
    pub occasional_trips: u64,
    pub subscriber_pct: f64,
    pub occasional_pct: f64,
    pub subscriber_mean_minutes: Stat,
    pub occasional_mean_minutes: Stat,
    /// How much longer occasional riders ride than subscribers on average,
    /// relative to the subscriber mean.
    pub duration_delta_pct: Stat,
    pub weekend_trips: u64,
    pub peaks: Vec<ClassPeaks>,
    pub first_start: Option<NaiveDateTime>,
    pub last_start: Option<NaiveDateTime>,
}

impl Summary {
    pub fn peaks_for(&self, class: UserClass) -> Option<&ClassPeaks> {
        self.peaks.iter().find(|p| p.user_class == class)
    }
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub locale: Locale,
    pub cleaning: CleaningReport,
    pub duration_by_user_class: DurationStats,
    pub trips_by_weekday: CrossTab,
    pub trips_by_hour: CrossTab,
    pub trips_by_month: CrossTab,
    pub vehicle_preference: VehiclePreference,
    pub summary: Summary,
}

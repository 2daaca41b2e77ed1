//! Per-trip derived fields and calendar display labels.
//!
//! Weekdays are carried as [`chrono::Weekday`]. Two numberings hang off it:
//!
//! | Use                | Numbering            | Source                   |
//! |--------------------|----------------------|--------------------------|
//! | weekend rule       | Sunday=1 … Saturday=7 | `number_from_sunday()`   |
//! | display order      | Monday=1 … Sunday=7   | `number_from_monday()`   |
//!
//! A trip is on a weekend iff its Sunday-based number is 1 or 7. Display
//! tables list weekdays in [`WEEKDAY_DISPLAY_ORDER`] and never use the
//! Sunday-based number for ordering.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::TripRecord;

/// Weekdays in the order tables and charts present them.
pub const WEEKDAY_DISPLAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Sunday-based weekday numbers that count as weekend.
const WEEKEND_NUMBERS: [u32; 2] = [1, 7];

/// Language used for weekday and month labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

const EN_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const PT_BR_WEEKDAYS: [&str; 7] = [
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
    "Domingo",
];
const PT_BR_MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];
const PT_BR_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

impl Locale {
    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        let i = weekday.num_days_from_monday() as usize;
        match self {
            Locale::En => EN_WEEKDAYS[i],
            Locale::PtBr => PT_BR_WEEKDAYS[i],
        }
    }

    /// Full month name for `month` in 1..=12.
    ///
    /// # Panics
    ///
    /// Panics when `month` is outside 1..=12.
    pub fn month_name(self, month: u32) -> &'static str {
        let i = month as usize - 1;
        match self {
            Locale::En => EN_MONTHS[i],
            Locale::PtBr => PT_BR_MONTHS[i],
        }
    }

    /// Three-letter month label for `month` in 1..=12.
    ///
    /// # Panics
    ///
    /// Panics when `month` is outside 1..=12.
    pub fn month_abbr(self, month: u32) -> &'static str {
        let i = month as usize - 1;
        match self {
            Locale::En => EN_MONTHS_ABBR[i],
            Locale::PtBr => PT_BR_MONTHS_ABBR[i],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::En => "en",
            Locale::PtBr => "pt-br",
        })
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            other => Err(format!("unsupported locale '{other}' (expected en or pt-br)")),
        }
    }
}

/// Calendar and duration features computed from a trip's timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub duration_minutes: f64,
    pub weekday: Weekday,
    pub hour_of_day: u32,
    pub month: u32,
    pub is_weekend: bool,
}

impl DerivedFields {
    /// Sunday=1 … Saturday=7.
    pub fn weekday_number(&self) -> u32 {
        self.weekday.number_from_sunday()
    }

    /// Monday=1 … Sunday=7, the position in [`WEEKDAY_DISPLAY_ORDER`] plus one.
    pub fn display_ordinal(&self) -> u32 {
        self.weekday.number_from_monday()
    }
}

/// A cleaned trip with its derived fields attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTrip {
    pub trip: TripRecord,
    pub fields: DerivedFields,
}

/// Computes the derived fields for one trip. Features are taken from the
/// start timestamp.
pub fn derive(trip: &TripRecord) -> DerivedFields {
    let start = trip.start_time;
    let weekday = start.weekday();

    DerivedFields {
        duration_minutes: trip.duration_minutes(),
        weekday,
        hour_of_day: start.hour(),
        month: start.month(),
        is_weekend: WEEKEND_NUMBERS.contains(&weekday.number_from_sunday()),
    }
}

#[tracing::instrument(skip_all, fields(trips = trips.len()))]
pub fn derive_all(trips: Vec<TripRecord>) -> Vec<DerivedTrip> {
    trips
        .into_iter()
        .map(|trip| {
            let fields = derive(&trip);
            DerivedTrip { trip, fields }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserClass, VehicleKind};
    use chrono::{Duration, NaiveDate};

    fn trip_on(y: i32, m: u32, d: u32, h: u32, minutes: i64) -> TripRecord {
        let start = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        TripRecord {
            id: "R000001".into(),
            vehicle_kind: VehicleKind::ClassicBike,
            start_time: start,
            end_time: start + Duration::seconds(minutes * 60 + 30),
            start_location: Some("Station_1".into()),
            end_location: Some("Station_1".into()),
            user_class: UserClass::Subscriber,
        }
    }

    #[test]
    fn test_derive_calendar_fields() {
        // 2023-03-15 is a Wednesday
        let fields = derive(&trip_on(2023, 3, 15, 17, 20));
        assert_eq!(fields.weekday, Weekday::Wed);
        assert_eq!(fields.weekday_number(), 4);
        assert_eq!(fields.display_ordinal(), 3);
        assert_eq!(fields.hour_of_day, 17);
        assert_eq!(fields.month, 3);
        assert!(!fields.is_weekend);
        assert_eq!(fields.duration_minutes, 20.5);
    }

    #[test]
    fn test_weekend_rule_uses_sunday_numbering() {
        // 2023-01-01 is a Sunday, 2023-01-07 a Saturday, 2023-01-02 a Monday
        let sunday = derive(&trip_on(2023, 1, 1, 9, 10));
        let saturday = derive(&trip_on(2023, 1, 7, 9, 10));
        let monday = derive(&trip_on(2023, 1, 2, 9, 10));

        assert_eq!(sunday.weekday_number(), 1);
        assert_eq!(saturday.weekday_number(), 7);
        assert!(sunday.is_weekend);
        assert!(saturday.is_weekend);
        assert!(!monday.is_weekend);

        assert_eq!(sunday.display_ordinal(), 7);
        assert_eq!(monday.display_ordinal(), 1);
    }

    #[test]
    fn test_display_order_starts_monday() {
        for (i, day) in WEEKDAY_DISPLAY_ORDER.iter().enumerate() {
            assert_eq!(day.number_from_monday() as usize, i + 1);
        }
    }

    #[test]
    fn test_locale_labels() {
        assert_eq!(Locale::En.weekday_name(Weekday::Mon), "Monday");
        assert_eq!(Locale::PtBr.weekday_name(Weekday::Sun), "Domingo");
        assert_eq!(Locale::En.month_abbr(12), "Dec");
        assert_eq!(Locale::PtBr.month_abbr(2), "Fev");
        assert_eq!(Locale::PtBr.month_name(3), "Março");
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_derive_all_keeps_order() {
        let trips = vec![trip_on(2023, 1, 1, 0, 5), trip_on(2023, 12, 31, 23, 5)];
        let derived = derive_all(trips.clone());
        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].trip, trips[0]);
        assert_eq!(derived[1].fields.month, 12);
        assert_eq!(derived[1].fields.hour_of_day, 23);
    }
}

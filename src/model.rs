//! Trip record types shared by every pipeline stage.
//!
//! Field names on the wire follow the public Divvy trip-data layout
//! (`ride_id`, `rideable_type`, `member_casual`, ...), so synthetic datasets
//! written by this crate can be loaded back like a real export.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PipelineError, Result};

/// Timestamp layout used in trip CSVs. `%.f` keeps fractional seconds only
/// when they are non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parses a trip timestamp, accepting both the space and the ISO `T` separator.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .ok()
}

fn serialize_timestamp<S: Serializer>(
    value: &NaiveDateTime,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(&value.format(TIMESTAMP_FORMAT))
}

/// Rider category: annual members versus pay-per-ride casual users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserClass {
    #[serde(rename = "member")]
    Subscriber,
    #[serde(rename = "casual")]
    Occasional,
}

impl UserClass {
    pub const ALL: [UserClass; 2] = [UserClass::Subscriber, UserClass::Occasional];

    /// Value used in trip CSVs.
    pub fn as_str(self) -> &'static str {
        match self {
            UserClass::Subscriber => "member",
            UserClass::Occasional => "casual",
        }
    }

    /// Position in [`UserClass::ALL`], used to index fixed-width count columns.
    pub fn index(self) -> usize {
        match self {
            UserClass::Subscriber => 0,
            UserClass::Occasional => 1,
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserClass {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "member" | "Subscriber" => Ok(UserClass::Subscriber),
            "casual" | "Customer" => Ok(UserClass::Occasional),
            other => Err(other.to_string()),
        }
    }
}

/// Category of bicycle used for a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    ClassicBike,
    ElectricBike,
    DockedBike,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 3] = [
        VehicleKind::ClassicBike,
        VehicleKind::ElectricBike,
        VehicleKind::DockedBike,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::ClassicBike => "classic_bike",
            VehicleKind::ElectricBike => "electric_bike",
            VehicleKind::DockedBike => "docked_bike",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "classic_bike" => Ok(VehicleKind::ClassicBike),
            "electric_bike" => Ok(VehicleKind::ElectricBike),
            "docked_bike" => Ok(VehicleKind::DockedBike),
            other => Err(other.to_string()),
        }
    }
}

/// A single validated trip.
///
/// Equality covers every field, which is what duplicate removal keys on.
/// Station names are optional: public exports leave them blank for dockless
/// trips, and no aggregation reads them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TripRecord {
    #[serde(rename = "ride_id")]
    pub id: String,
    #[serde(rename = "rideable_type")]
    pub vehicle_kind: VehicleKind,
    #[serde(rename = "started_at", serialize_with = "serialize_timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "ended_at", serialize_with = "serialize_timestamp")]
    pub end_time: NaiveDateTime,
    #[serde(rename = "start_station_name")]
    pub start_location: Option<String>,
    #[serde(rename = "end_station_name")]
    pub end_location: Option<String>,
    #[serde(rename = "member_casual")]
    pub user_class: UserClass,
}

impl TripRecord {
    /// Trip length in minutes at millisecond resolution. Negative when the
    /// end precedes the start; the cleaner drops those.
    pub fn duration_minutes(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 60_000.0
    }
}

/// A trip row exactly as read from a CSV source, before validation.
///
/// Every column is optional so that missing values can be counted instead of
/// failing deserialization on the first gap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct RawTrip {
    pub ride_id: Option<String>,
    pub rideable_type: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub start_station_name: Option<String>,
    pub end_station_name: Option<String>,
    pub member_casual: Option<String>,
}

impl RawTrip {
    /// Column names in file order, used for the null report.
    pub const FIELDS: [&'static str; 7] = [
        "ride_id",
        "rideable_type",
        "started_at",
        "ended_at",
        "start_station_name",
        "end_station_name",
        "member_casual",
    ];

    /// Values paired with their column names, in [`RawTrip::FIELDS`] order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("ride_id", self.ride_id.as_deref()),
            ("rideable_type", self.rideable_type.as_deref()),
            ("started_at", self.started_at.as_deref()),
            ("ended_at", self.ended_at.as_deref()),
            ("start_station_name", self.start_station_name.as_deref()),
            ("end_station_name", self.end_station_name.as_deref()),
            ("member_casual", self.member_casual.as_deref()),
        ]
    }

    /// Validates the row and converts it into a [`TripRecord`].
    ///
    /// `row` is the 1-based data row number used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingField`] for an absent required value and
    /// [`PipelineError::InvalidValue`] for one that does not parse. Blank
    /// station names are kept as `None`.
    pub fn into_trip(self, row: usize) -> Result<TripRecord> {
        fn required(row: usize, field: &'static str, value: Option<String>) -> Result<String> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(PipelineError::MissingField { row, field }),
            }
        }

        fn optional(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        fn time(row: usize, field: &'static str, value: String) -> Result<NaiveDateTime> {
            parse_timestamp(&value).ok_or(PipelineError::InvalidValue { row, field, value })
        }

        let id = required(row, "ride_id", self.ride_id)?;
        let vehicle_kind = required(row, "rideable_type", self.rideable_type)?;
        let vehicle_kind = vehicle_kind
            .parse::<VehicleKind>()
            .map_err(|value| PipelineError::InvalidValue {
                row,
                field: "rideable_type",
                value,
            })?;
        let start_time = time(row, "started_at", required(row, "started_at", self.started_at)?)?;
        let end_time = time(row, "ended_at", required(row, "ended_at", self.ended_at)?)?;
        let start_location = optional(self.start_station_name);
        let end_location = optional(self.end_station_name);
        let user_class = required(row, "member_casual", self.member_casual)?
            .parse::<UserClass>()
            .map_err(|value| PipelineError::InvalidValue {
                row,
                field: "member_casual",
                value,
            })?;

        Ok(TripRecord {
            id,
            vehicle_kind,
            start_time,
            end_time,
            start_location,
            end_location,
            user_class,
        })
    }
}

//! Run configuration for the analysis pipeline.

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};
use crate::features::Locale;

pub const DEFAULT_RECORDS: usize = 50_000;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_YEAR: i32 = 2023;

/// Parameters for the synthetic trip generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub n_records: usize,
    pub seed: u64,
    pub year: i32,
    /// Generated durations are clipped into this range, in minutes.
    pub min_duration_minutes: f64,
    pub max_duration_minutes: f64,
    pub station_count: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            n_records: DEFAULT_RECORDS,
            seed: DEFAULT_SEED,
            year: DEFAULT_YEAR,
            min_duration_minutes: 5.0,
            max_duration_minutes: 120.0,
            station_count: 100,
        }
    }
}

impl SourceConfig {
    pub fn with_records(mut self, n_records: usize) -> Self {
        self.n_records = n_records;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] for an empty station pool, an
    /// inverted duration range or a year chrono cannot represent.
    pub fn validate(&self) -> Result<()> {
        if self.station_count == 0 {
            return Err(PipelineError::Configuration(
                "station_count must be at least 1".into(),
            ));
        }
        if !(self.min_duration_minutes > 0.0
            && self.min_duration_minutes <= self.max_duration_minutes)
        {
            return Err(PipelineError::Configuration(format!(
                "invalid duration range [{}, {}]",
                self.min_duration_minutes, self.max_duration_minutes
            )));
        }
        if chrono::NaiveDate::from_ymd_opt(self.year, 12, 31).is_none() {
            return Err(PipelineError::Configuration(format!(
                "year {} is out of range",
                self.year
            )));
        }
        Ok(())
    }
}

/// Plausibility bounds applied by the outlier filter, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    pub min_duration_minutes: f64,
    pub max_duration_minutes: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_duration_minutes: 1.0,
            max_duration_minutes: 1440.0,
        }
    }
}

/// Everything a single batch run needs besides its input records.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub source: SourceConfig,
    pub cleaning: CleaningConfig,
    pub locale: Locale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_is_valid() {
        assert!(SourceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_duration_range_rejected() {
        let config = SourceConfig {
            min_duration_minutes: 30.0,
            max_duration_minutes: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_station_pool_rejected() {
        let config = SourceConfig {
            station_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

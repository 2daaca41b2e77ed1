//! Trip aggregation and reporting tables.
//!
//! This module groups cleaned trips by user class and calendar dimensions,
//! computes duration statistics and vehicle preference, and derives the
//! headline numbers used by the narrative. Artifacts can be published to S3.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod writetos3;

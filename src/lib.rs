pub mod analyzers;
pub mod clean;
pub mod config;
pub mod errors;
pub mod features;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod output;
pub mod parser;
pub mod stats;
pub mod synthetic;

pub mod config;
pub mod error;
pub mod observations;
pub mod telemetry;

//! Placement core for the recruitment marketplace: commission splits, the application review
//! lifecycle, and duplicate candidate screening, plus the configuration and telemetry shared by
//! the service host.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

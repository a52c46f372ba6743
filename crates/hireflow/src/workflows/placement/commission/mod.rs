//! Commission terms and the pure split calculations derived from them.

mod config;
mod engine;
mod terms;

pub use config::CommissionSettings;
pub use engine::{CommissionBreakdown, CommissionEngine, CommissionQuote, FixedCommissionSplit};
pub use terms::{CommissionAnomaly, CommissionType, JobCommissionTerms};

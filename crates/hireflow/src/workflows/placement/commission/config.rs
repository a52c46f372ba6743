use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_MIN_PERCENTAGE: f64 = 1.0;
pub(crate) const DEFAULT_MAX_PERCENTAGE: f64 = 50.0;
pub(crate) const DEFAULT_REDUCTION_PERCENTAGE: f64 = 40.0;

/// Commission dials shared by listing forms, the engine, and payout records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionSettings {
    /// Lowest commission percentage a listing may advertise.
    pub min_percentage: f64,
    /// Highest commission percentage a listing may advertise.
    pub max_percentage: f64,
    /// Platform cut applied when a listing does not specify one.
    pub default_reduction_percentage: f64,
    /// Lower bound on the recruiter share in the percentage path. The same value bounds both
    /// the recruiter percentage and the recruiter currency amount.
    pub min_recruiter_floor: f64,
    /// ISO currency code stamped on payout records.
    pub currency: String,
}

impl Default for CommissionSettings {
    fn default() -> Self {
        Self {
            min_percentage: DEFAULT_MIN_PERCENTAGE,
            max_percentage: DEFAULT_MAX_PERCENTAGE,
            default_reduction_percentage: DEFAULT_REDUCTION_PERCENTAGE,
            min_recruiter_floor: DEFAULT_MIN_PERCENTAGE,
            currency: "INR".to_string(),
        }
    }
}

impl CommissionSettings {
    pub fn clamp_percentage(&self, percentage: f64) -> f64 {
        if !percentage.is_finite() {
            return self.min_percentage;
        }
        percentage.max(self.min_percentage).min(self.max_percentage)
    }

    pub fn clamp_reduction(&self, reduction: f64) -> f64 {
        if !reduction.is_finite() {
            return self.default_reduction_percentage;
        }
        reduction.max(0.0).min(100.0)
    }
}

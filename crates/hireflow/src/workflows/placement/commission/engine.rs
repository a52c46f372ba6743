use serde::{Deserialize, Serialize};

use super::config::CommissionSettings;
use super::terms::{CommissionAnomaly, CommissionType, JobCommissionTerms};

/// Derived commission split. Recomputed on demand and never stored as a source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub commission_type: CommissionType,
    pub original_amount: f64,
    pub recruiter_amount: f64,
    pub platform_fee_amount: f64,
    pub original_percentage: f64,
    pub recruiter_percentage: f64,
    pub platform_fee_percentage: f64,
}

impl CommissionBreakdown {
    pub const fn zeroed(commission_type: CommissionType) -> Self {
        Self {
            commission_type,
            original_amount: 0.0,
            recruiter_amount: 0.0,
            platform_fee_amount: 0.0,
            original_percentage: 0.0,
            recruiter_percentage: 0.0,
            platform_fee_percentage: 0.0,
        }
    }
}

/// Currency split for fixed-amount listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedCommissionSplit {
    pub recruiter_amount: f64,
    pub platform_fee_amount: f64,
}

/// Breakdown paired with the configuration problems observed while computing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionQuote {
    pub breakdown: CommissionBreakdown,
    pub anomalies: Vec<CommissionAnomaly>,
}

/// Stateless calculator. The `compute_*` functions trust their inputs and never clamp;
/// [`CommissionEngine::quote`] is the entry point for raw listing terms. Nothing here fails.
#[derive(Debug, Clone, Default)]
pub struct CommissionEngine {
    settings: CommissionSettings,
}

impl CommissionEngine {
    pub fn new(settings: CommissionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CommissionSettings {
        &self.settings
    }

    /// Split `original_percentage` of `salary_max` between recruiter and platform.
    ///
    /// The recruiter floor is a percentage value and is applied to both the recruiter
    /// percentage and the recruiter currency amount. The platform amount absorbs the
    /// difference so `recruiter_amount + platform_fee_amount == original_amount`.
    pub fn compute_percentage_commission(
        &self,
        salary_max: f64,
        original_percentage: f64,
        reduction_percentage: f64,
    ) -> CommissionBreakdown {
        if original_percentage <= 0.0 || salary_max <= 0.0 {
            return CommissionBreakdown::zeroed(CommissionType::Percentage);
        }

        let floor = self.settings.min_recruiter_floor;

        let percentage_reduction = original_percentage * reduction_percentage / 100.0;
        let recruiter_percentage = (original_percentage - percentage_reduction).max(floor);
        let platform_fee_percentage = original_percentage - recruiter_percentage;

        let original_amount = salary_max * original_percentage / 100.0;
        let reduction = original_amount * reduction_percentage / 100.0;
        let recruiter_amount = (original_amount - reduction).max(floor);
        let platform_fee_amount = original_amount - recruiter_amount;

        CommissionBreakdown {
            commission_type: CommissionType::Percentage,
            original_amount,
            recruiter_amount,
            platform_fee_amount,
            original_percentage,
            recruiter_percentage,
            platform_fee_percentage,
        }
    }

    /// Split a fixed commission. Unlike the percentage path the recruiter floor here is zero.
    pub fn compute_fixed_commission_breakdown(
        &self,
        fixed_amount: f64,
        reduction_percentage: f64,
    ) -> FixedCommissionSplit {
        if fixed_amount <= 0.0 {
            return FixedCommissionSplit {
                recruiter_amount: 0.0,
                platform_fee_amount: 0.0,
            };
        }

        let platform_fee_amount = fixed_amount * reduction_percentage / 100.0;
        FixedCommissionSplit {
            recruiter_amount: (fixed_amount - platform_fee_amount).max(0.0),
            platform_fee_amount,
        }
    }

    /// Clamp raw listing terms the way listing forms do, then derive the split. Anomalies
    /// are detected on the raw terms and returned for the caller to report.
    pub fn quote(&self, terms: &JobCommissionTerms, salary_max: f64) -> CommissionQuote {
        CommissionQuote {
            breakdown: self.recompute_on_change(&terms.sanitized(&self.settings), salary_max),
            anomalies: terms.anomalies(salary_max, &self.settings),
        }
    }

    /// Rebuild the full breakdown from the current terms. The result replaces any previous
    /// breakdown wholesale: fields of the inactive branch are always zero.
    pub fn recompute_on_change(
        &self,
        terms: &JobCommissionTerms,
        salary_max: f64,
    ) -> CommissionBreakdown {
        match terms.commission_type {
            CommissionType::Percentage => self.compute_percentage_commission(
                salary_max,
                terms.original_percentage,
                terms.reduction_percentage,
            ),
            CommissionType::Fixed => {
                let split = self.compute_fixed_commission_breakdown(
                    terms.fixed_amount,
                    terms.reduction_percentage,
                );
                let original_amount = if terms.fixed_amount > 0.0 {
                    terms.fixed_amount
                } else {
                    0.0
                };

                CommissionBreakdown {
                    original_amount,
                    recruiter_amount: split.recruiter_amount,
                    platform_fee_amount: split.platform_fee_amount,
                    ..CommissionBreakdown::zeroed(CommissionType::Fixed)
                }
            }
        }
    }
}

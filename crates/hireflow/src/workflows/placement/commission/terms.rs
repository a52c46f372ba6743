use serde::{Deserialize, Serialize};

use super::config::{CommissionSettings, DEFAULT_REDUCTION_PERCENTAGE};

/// How a listing expresses the commission owed on a hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionType {
    Percentage,
    Fixed,
}

impl CommissionType {
    pub const fn label(self) -> &'static str {
        match self {
            CommissionType::Percentage => "PERCENTAGE",
            CommissionType::Fixed => "FIXED",
        }
    }
}

/// Commission configuration attached to a job listing.
///
/// Only one branch is active at a time: percentage listings carry `fixed_amount == 0` and fixed
/// listings carry `original_percentage == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCommissionTerms {
    pub commission_type: CommissionType,
    #[serde(default)]
    pub original_percentage: f64,
    #[serde(default)]
    pub fixed_amount: f64,
    #[serde(default = "default_reduction")]
    pub reduction_percentage: f64,
}

fn default_reduction() -> f64 {
    DEFAULT_REDUCTION_PERCENTAGE
}

impl JobCommissionTerms {
    pub fn percentage(original_percentage: f64, reduction_percentage: f64) -> Self {
        Self {
            commission_type: CommissionType::Percentage,
            original_percentage,
            fixed_amount: 0.0,
            reduction_percentage,
        }
    }

    pub fn fixed(fixed_amount: f64, reduction_percentage: f64) -> Self {
        Self {
            commission_type: CommissionType::Fixed,
            original_percentage: 0.0,
            fixed_amount,
            reduction_percentage,
        }
    }

    /// Change the commission type, zeroing whichever branch becomes inactive.
    pub fn switch_type(&mut self, commission_type: CommissionType) {
        self.commission_type = commission_type;
        match commission_type {
            CommissionType::Percentage => self.fixed_amount = 0.0,
            CommissionType::Fixed => self.original_percentage = 0.0,
        }
    }

    /// Caller-side clamp applied before the terms reach the engine.
    pub fn sanitized(&self, settings: &CommissionSettings) -> Self {
        let reduction_percentage = settings.clamp_reduction(self.reduction_percentage);
        match self.commission_type {
            CommissionType::Percentage => Self::percentage(
                settings.clamp_percentage(self.original_percentage),
                reduction_percentage,
            ),
            CommissionType::Fixed => Self::fixed(self.fixed_amount.max(0.0), reduction_percentage),
        }
    }

    /// Report configuration problems that the engine tolerates by zeroing its output.
    pub fn anomalies(
        &self,
        salary_max: f64,
        settings: &CommissionSettings,
    ) -> Vec<CommissionAnomaly> {
        let mut anomalies = Vec::new();

        if salary_max < 0.0 {
            anomalies.push(CommissionAnomaly::NegativeSalary { salary_max });
        }

        if self.original_percentage != 0.0 && self.fixed_amount != 0.0 {
            anomalies.push(CommissionAnomaly::BothBranchesActive {
                original_percentage: self.original_percentage,
                fixed_amount: self.fixed_amount,
            });
        }

        match self.commission_type {
            CommissionType::Percentage => {
                let percentage = self.original_percentage;
                if percentage < settings.min_percentage || percentage > settings.max_percentage {
                    anomalies.push(CommissionAnomaly::PercentageOutOfBounds {
                        percentage,
                        min: settings.min_percentage,
                        max: settings.max_percentage,
                    });
                }
            }
            CommissionType::Fixed => {
                if self.fixed_amount < 0.0 {
                    anomalies.push(CommissionAnomaly::NegativeFixedAmount {
                        fixed_amount: self.fixed_amount,
                    });
                }
            }
        }

        if !(0.0..=100.0).contains(&self.reduction_percentage) {
            anomalies.push(CommissionAnomaly::ReductionOutOfBounds {
                reduction_percentage: self.reduction_percentage,
            });
        }

        anomalies
    }
}

/// Upstream configuration bugs detected while quoting a commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommissionAnomaly {
    NegativeSalary {
        salary_max: f64,
    },
    BothBranchesActive {
        original_percentage: f64,
        fixed_amount: f64,
    },
    NegativeFixedAmount {
        fixed_amount: f64,
    },
    PercentageOutOfBounds {
        percentage: f64,
        min: f64,
        max: f64,
    },
    ReductionOutOfBounds {
        reduction_percentage: f64,
    },
}

impl CommissionAnomaly {
    pub fn summary(&self) -> String {
        match self {
            CommissionAnomaly::NegativeSalary { salary_max } => {
                format!("salary max {salary_max} is negative")
            }
            CommissionAnomaly::BothBranchesActive {
                original_percentage,
                fixed_amount,
            } => format!(
                "both percentage ({original_percentage}) and fixed amount ({fixed_amount}) are set"
            ),
            CommissionAnomaly::NegativeFixedAmount { fixed_amount } => {
                format!("fixed amount {fixed_amount} is negative")
            }
            CommissionAnomaly::PercentageOutOfBounds { percentage, min, max } => {
                format!("percentage {percentage} outside [{min}, {max}]")
            }
            CommissionAnomaly::ReductionOutOfBounds {
                reduction_percentage,
            } => format!("reduction {reduction_percentage} outside [0, 100]"),
        }
    }
}

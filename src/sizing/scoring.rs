//! Compatibility classification and weighted configuration scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Capacity factor treated as a perfect score.
const REFERENCE_CAPACITY_FACTOR: f64 = 0.22;
/// DC/AC distance from the optimum at which compatibility scores zero.
const RATIO_SCORE_SPAN: f64 = 0.5;

/// DC/AC-ratio compatibility class, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityStatus {
    Excellent,
    Good,
    Acceptable,
    Problematic,
}

impl CompatibilityStatus {
    /// Classifies a DC/AC ratio.
    ///
    /// | status      | ratio                         |
    /// |-------------|-------------------------------|
    /// | excellent   | 1.00 ..= 1.25                 |
    /// | good        | 0.90 .. 1.00, 1.25 ..= 1.35   |
    /// | acceptable  | 0.80 .. 0.90, 1.35 ..= 1.50   |
    /// | problematic | anything else                 |
    pub fn from_dc_ac_ratio(ratio: f64) -> Self {
        if (1.0..=1.25).contains(&ratio) {
            Self::Excellent
        } else if (0.9..1.0).contains(&ratio) || (1.25..=1.35).contains(&ratio) {
            Self::Good
        } else if (0.8..0.9).contains(&ratio) || (1.35..=1.5).contains(&ratio) {
            Self::Acceptable
        } else {
            Self::Problematic
        }
    }

    /// Parses the lowercase name used in configs and query strings.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "acceptable" => Some(Self::Acceptable),
            "problematic" => Some(Self::Problematic),
            _ => None,
        }
    }
}

impl fmt::Display for CompatibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Problematic => "problematic",
        };
        f.write_str(name)
    }
}

/// Relative weights of the score components. Normalized when applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreWeights {
    pub compatibility: f64,
    pub capacity_factor: f64,
    pub coverage: f64,
    pub budget: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            compatibility: 0.4,
            capacity_factor: 0.3,
            coverage: 0.2,
            budget: 0.1,
        }
    }
}

impl ScoreWeights {
    fn sum(&self) -> f64 {
        self.compatibility + self.capacity_factor + self.coverage + self.budget
    }

    /// # Errors
    ///
    /// Fails if any weight is negative or all are zero.
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("weights.compatibility", self.compatibility),
            ("weights.capacity_factor", self.capacity_factor),
            ("weights.coverage", self.coverage),
            ("weights.budget", self.budget),
        ];
        for (field, w) in all {
            if !(w.is_finite() && w >= 0.0) {
                return Err(SizingError::invalid(field, "must be finite and >= 0"));
            }
        }
        if self.sum() <= 0.0 {
            return Err(SizingError::invalid("weights", "at least one weight must be > 0"));
        }
        Ok(())
    }
}

/// Component scores (each 0.0-1.0) and the weighted total (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub compatibility: f64,
    pub capacity_factor: f64,
    pub coverage: f64,
    pub budget: f64,
    pub total: f64,
}

/// Linear falloff from 1.0 at `optimal` to 0.0 half a ratio point away.
pub fn compatibility_score(dc_ac_ratio: f64, optimal: f64) -> f64 {
    (1.0 - (dc_ac_ratio - optimal).abs() / RATIO_SCORE_SPAN).clamp(0.0, 1.0)
}

pub fn capacity_factor_score(capacity_factor: f64) -> f64 {
    (capacity_factor / REFERENCE_CAPACITY_FACTOR).clamp(0.0, 1.0)
}

/// Penalizes both under- and over-coverage. Neutral when no consumption is
/// known.
pub fn coverage_score(coverage_ratio: Option<f64>) -> f64 {
    coverage_ratio.map_or(1.0, |c| (1.0 - (1.0 - c).abs()).clamp(0.0, 1.0))
}

/// Full marks within budget, falling linearly to zero at twice the budget.
pub fn budget_score(cost: f64, budget: Option<f64>) -> f64 {
    match budget {
        Some(b) if b > 0.0 && cost > b => (1.0 - (cost - b) / b).max(0.0),
        _ => 1.0,
    }
}

/// Inputs to [`score`] for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub dc_ac_ratio: f64,
    pub optimal_dc_ac_ratio: f64,
    pub capacity_factor: f64,
    pub coverage_ratio: Option<f64>,
    pub cost: f64,
    pub budget: Option<f64>,
}

/// Weighted score of one configuration.
pub fn score(inputs: &ScoreInputs, weights: &ScoreWeights) -> ScoreBreakdown {
    let compatibility = compatibility_score(inputs.dc_ac_ratio, inputs.optimal_dc_ac_ratio);
    let capacity_factor = capacity_factor_score(inputs.capacity_factor);
    let coverage = coverage_score(inputs.coverage_ratio);
    let budget = budget_score(inputs.cost, inputs.budget);

    let sum = weights.sum();
    let total = if sum > 0.0 {
        100.0
            * (weights.compatibility * compatibility
                + weights.capacity_factor * capacity_factor
                + weights.coverage * coverage
                + weights.budget * budget)
            / sum
    } else {
        0.0
    };

    ScoreBreakdown {
        compatibility,
        capacity_factor,
        coverage,
        budget,
        total,
    }
}

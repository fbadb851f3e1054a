//! System loss categories and their multiplicative composition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Fractional losses by category (0.03 = 3%).
///
/// Losses compose multiplicatively: a system with 10% shading and 10% soiling
/// keeps `0.9 × 0.9 = 81%` of its output, not 80%.
///
/// # Examples
///
/// ```
/// use pv_sizing::sizing::losses::LossProfile;
///
/// let losses = LossProfile {
///     shading: 0.10,
///     soiling: 0.10,
///     ..LossProfile::none()
/// };
/// assert!((losses.system_efficiency() - 0.81).abs() < 1e-12);
/// assert!((losses.total_loss_pct() - 19.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossProfile {
    pub shading: f64,
    pub mismatch: f64,
    pub wiring: f64,
    pub soiling: f64,
    pub inverter: f64,
    pub temperature: f64,
}

impl Default for LossProfile {
    fn default() -> Self {
        Self {
            shading: 0.03,
            mismatch: 0.02,
            wiring: 0.02,
            soiling: 0.03,
            inverter: 0.03,
            temperature: 0.08,
        }
    }
}

impl LossProfile {
    /// A lossless profile, mostly useful as a struct-update base.
    pub fn none() -> Self {
        Self {
            shading: 0.0,
            mismatch: 0.0,
            wiring: 0.0,
            soiling: 0.0,
            inverter: 0.0,
            temperature: 0.0,
        }
    }

    /// Named categories in a fixed order.
    pub fn categories(&self) -> [(&'static str, f64); 6] {
        [
            ("shading", self.shading),
            ("mismatch", self.mismatch),
            ("wiring", self.wiring),
            ("soiling", self.soiling),
            ("inverter", self.inverter),
            ("temperature", self.temperature),
        ]
    }

    /// Checks every category lies in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] for the first offending category.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.categories() {
            if !(0.0..1.0).contains(&value) {
                return Err(SizingError::invalid(
                    format!("losses.{name}"),
                    format!("must be in [0.0, 1.0), got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Fraction of nominal output that survives all losses: `Π(1 - lossᵢ)`.
    pub fn system_efficiency(&self) -> f64 {
        self.categories().iter().map(|(_, l)| 1.0 - l).product()
    }

    /// Combined loss fraction: `1 - Π(1 - lossᵢ)`.
    pub fn total_loss(&self) -> f64 {
        1.0 - self.system_efficiency()
    }

    pub fn total_loss_pct(&self) -> f64 {
        self.total_loss() * 100.0
    }

    /// Efficiency with the temperature category excluded, for callers that
    /// model temperature month by month.
    pub fn efficiency_without_temperature(&self) -> f64 {
        Self {
            temperature: 0.0,
            ..*self
        }
        .system_efficiency()
    }

    /// Replaces the inverter category with the loss implied by a datasheet
    /// efficiency.
    pub fn with_inverter_efficiency(self, efficiency: f64) -> Self {
        Self {
            inverter: (1.0 - efficiency).clamp(0.0, 0.999),
            ..self
        }
    }
}

impl fmt::Display for LossProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .categories()
            .iter()
            .map(|(name, v)| format!("{name}={:.1}%", v * 100.0))
            .collect();
        write!(f, "{} (total {:.1}%)", parts.join(" "), self.total_loss_pct())
    }
}

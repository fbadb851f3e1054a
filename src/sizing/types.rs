//! Result records produced by the dimensioner.

use std::fmt;

use serde::Serialize;

use super::scoring::{CompatibilityStatus, ScoreBreakdown};
use super::strings::VoltageWindow;

/// Physical layout of one candidate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Configuration {
    pub modules_per_string: u32,
    /// Strings across all inverters.
    pub string_count: u32,
    pub inverter_count: u32,
    pub total_modules: u32,
    /// Installed DC power (kWp).
    pub dc_power_kw: f64,
}

/// One feasible module/inverter pairing, evaluated and scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensioningResult {
    /// Module model name.
    pub module: String,
    /// Inverter model name.
    pub inverter: String,
    pub configuration: Configuration,
    pub window: VoltageWindow,
    pub monthly_generation_kwh: [f64; 12],
    pub annual_generation_kwh: f64,
    pub dc_ac_ratio: f64,
    pub capacity_factor: f64,
    pub compatibility_status: CompatibilityStatus,
    pub score: ScoreBreakdown,
    /// Capital cost from the cost model.
    pub estimated_cost: f64,
    pub warnings: Vec<String>,
}

impl DimensioningResult {
    /// Stable label for logs and tables.
    pub fn label(&self) -> String {
        format!("{} + {}", self.module, self.inverter)
    }
}

impl fmt::Display for DimensioningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.configuration;
        write!(
            f,
            "score={:>5.1} | {} | {}x{} = {} modules ({:.2} kWp) on {} inverter(s) | \
             dc/ac={:.2} ({}) | {:.0} kWh/yr  cf={:.1}% | cost={:.0}",
            self.score.total,
            self.label(),
            c.modules_per_string,
            c.string_count,
            c.total_modules,
            c.dc_power_kw,
            c.inverter_count,
            self.dc_ac_ratio,
            self.compatibility_status,
            self.annual_generation_kwh,
            self.capacity_factor * 100.0,
            self.estimated_cost,
        )?;
        if !self.warnings.is_empty() {
            write!(f, " | warnings: {}", self.warnings.len())?;
        }
        Ok(())
    }
}

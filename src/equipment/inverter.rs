use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Highest DC input voltage accepted in a datasheet (V).
pub const MAX_DC_VOLTAGE_LIMIT_V: f64 = 2000.0;
/// Upper bound on MPP trackers per unit.
pub const MAX_MPPT_COUNT: u32 = 32;
/// Upper bound on parallel strings per tracker.
pub const MAX_STRINGS_PER_MPPT: u32 = 16;

fn default_efficiency() -> f64 {
    0.97
}

fn default_strings_per_mppt() -> u32 {
    1
}

/// A grid-tied string inverter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inverter {
    /// Model designation, used as the catalog key.
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    /// Rated AC output power (W).
    pub ac_power_w: f64,
    /// Absolute maximum DC input voltage (V).
    pub max_dc_voltage_v: f64,
    /// Lower bound of the MPPT operating window (V).
    pub mppt_min_v: f64,
    /// Upper bound of the MPPT operating window (V).
    pub mppt_max_v: f64,
    /// Number of independent MPP trackers.
    pub mppt_count: u32,
    /// Parallel strings accepted per tracker.
    #[serde(default = "default_strings_per_mppt")]
    pub strings_per_mppt: u32,
    /// Maximum usable input current per tracker (A).
    pub max_input_current_a: f64,
    /// Weighted conversion efficiency (0.0-1.0).
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    /// Unit price in project currency.
    #[serde(default)]
    pub price: f64,
}

impl Inverter {
    /// Maximum number of strings one unit accepts.
    pub fn max_strings(&self) -> u32 {
        self.mppt_count.saturating_mul(self.strings_per_mppt)
    }

    /// Rated AC output in kW.
    pub fn ac_power_kw(&self) -> f64 {
        self.ac_power_w / 1000.0
    }

    /// Checks that the datasheet values are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] naming the inverter and field.
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("inverter `{}`.{name}", self.model);
        for (name, value) in [
            ("ac_power_w", self.ac_power_w),
            ("max_dc_voltage_v", self.max_dc_voltage_v),
            ("mppt_min_v", self.mppt_min_v),
            ("mppt_max_v", self.mppt_max_v),
            ("max_input_current_a", self.max_input_current_a),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SizingError::invalid(field(name), "must be > 0"));
            }
        }
        if self.mppt_min_v >= self.mppt_max_v {
            return Err(SizingError::invalid(field("mppt_min_v"), "must be < mppt_max_v"));
        }
        if self.mppt_max_v > self.max_dc_voltage_v {
            return Err(SizingError::invalid(
                field("mppt_max_v"),
                "must be <= max_dc_voltage_v",
            ));
        }
        if self.max_dc_voltage_v > MAX_DC_VOLTAGE_LIMIT_V {
            return Err(SizingError::invalid(
                field("max_dc_voltage_v"),
                format!("must be <= {MAX_DC_VOLTAGE_LIMIT_V}"),
            ));
        }
        if !(1..=MAX_MPPT_COUNT).contains(&self.mppt_count) {
            return Err(SizingError::invalid(
                field("mppt_count"),
                format!("must be in [1, {MAX_MPPT_COUNT}]"),
            ));
        }
        if !(1..=MAX_STRINGS_PER_MPPT).contains(&self.strings_per_mppt) {
            return Err(SizingError::invalid(
                field("strings_per_mppt"),
                format!("must be in [1, {MAX_STRINGS_PER_MPPT}]"),
            ));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(SizingError::invalid(field("efficiency"), "must be in (0.0, 1.0]"));
        }
        if !(self.price.is_finite() && self.price >= 0.0) {
            return Err(SizingError::invalid(field("price"), "must be >= 0"));
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Reference cell temperature for datasheet (STC) values.
pub const STC_CELL_TEMP_C: f64 = 25.0;
/// Smallest open-circuit voltage accepted for a module (V).
pub const MIN_VOC_V: f64 = 1.0;

fn default_temp_coeff_voc() -> f64 {
    -0.28
}

fn default_temp_coeff_pmax() -> f64 {
    -0.37
}

fn default_noct() -> f64 {
    45.0
}

/// A photovoltaic module as described by its datasheet.
///
/// Electrical values are at STC (1000 W/m², 25 °C cell). Temperature
/// coefficients are in percent per kelvin and are negative for crystalline
/// silicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvModule {
    /// Model designation, used as the catalog key.
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    /// Rated power at STC (W).
    pub nominal_power_w: f64,
    /// Voltage at maximum power point (V).
    pub vmpp_v: f64,
    /// Open-circuit voltage (V).
    pub voc_v: f64,
    /// Current at maximum power point (A).
    pub impp_a: f64,
    /// Short-circuit current (A).
    pub isc_a: f64,
    /// Module area (m²).
    pub area_m2: f64,
    /// Voc temperature coefficient (%/°C).
    #[serde(default = "default_temp_coeff_voc")]
    pub temp_coeff_voc_pct: f64,
    /// Pmax temperature coefficient (%/°C). Also used for Vmpp.
    #[serde(default = "default_temp_coeff_pmax")]
    pub temp_coeff_pmax_pct: f64,
    /// Nominal operating cell temperature (°C).
    #[serde(default = "default_noct")]
    pub noct_c: f64,
    /// Unit price in project currency.
    #[serde(default)]
    pub price: f64,
}

impl PvModule {
    /// Open-circuit voltage at the given cell temperature.
    ///
    /// Cold cells raise Voc, which is what bounds the string length from
    /// above.
    pub fn voc_at(&self, cell_temp_c: f64) -> f64 {
        self.voc_v * (1.0 + self.temp_coeff_voc_pct / 100.0 * (cell_temp_c - STC_CELL_TEMP_C))
    }

    /// MPP voltage at the given cell temperature.
    pub fn vmpp_at(&self, cell_temp_c: f64) -> f64 {
        self.vmpp_v * (1.0 + self.temp_coeff_pmax_pct / 100.0 * (cell_temp_c - STC_CELL_TEMP_C))
    }

    /// Rated power in kW.
    pub fn nominal_power_kw(&self) -> f64 {
        self.nominal_power_w / 1000.0
    }

    /// Checks that the datasheet values are physically meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] naming the module and field.
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("module `{}`.{name}", self.model);
        for (name, value) in [
            ("nominal_power_w", self.nominal_power_w),
            ("vmpp_v", self.vmpp_v),
            ("voc_v", self.voc_v),
            ("impp_a", self.impp_a),
            ("isc_a", self.isc_a),
            ("area_m2", self.area_m2),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SizingError::invalid(field(name), "must be > 0"));
            }
        }
        if self.voc_v < MIN_VOC_V {
            return Err(SizingError::invalid(
                field("voc_v"),
                format!("must be >= {MIN_VOC_V} V"),
            ));
        }
        if self.vmpp_v >= self.voc_v {
            return Err(SizingError::invalid(field("vmpp_v"), "must be < voc_v"));
        }
        if self.impp_a > self.isc_a {
            return Err(SizingError::invalid(field("impp_a"), "must be <= isc_a"));
        }
        if !(-2.0..=0.0).contains(&self.temp_coeff_voc_pct) {
            return Err(SizingError::invalid(
                field("temp_coeff_voc_pct"),
                "must be in [-2.0, 0.0] %/°C",
            ));
        }
        if !(-2.0..=0.0).contains(&self.temp_coeff_pmax_pct) {
            return Err(SizingError::invalid(
                field("temp_coeff_pmax_pct"),
                "must be in [-2.0, 0.0] %/°C",
            ));
        }
        if !(self.price.is_finite() && self.price >= 0.0) {
            return Err(SizingError::invalid(field("price"), "must be >= 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> PvModule {
        PvModule {
            model: "M400".into(),
            manufacturer: "Acme".into(),
            nominal_power_w: 400.0,
            vmpp_v: 34.0,
            voc_v: 41.0,
            impp_a: 11.76,
            isc_a: 12.3,
            area_m2: 1.9,
            temp_coeff_voc_pct: -0.30,
            temp_coeff_pmax_pct: -0.40,
            noct_c: 45.0,
            price: 500.0,
        }
    }

    #[test]
    fn voc_rises_in_the_cold() {
        let m = module();
        assert!((m.voc_at(25.0) - 41.0).abs() < 1e-9);
        assert!((m.voc_at(-5.0) - 44.69).abs() < 1e-9);
    }

    #[test]
    fn vmpp_drops_when_hot() {
        let m = module();
        assert!((m.vmpp_at(70.0) - 27.88).abs() < 1e-9);
    }

    #[test]
    fn valid_module_passes() {
        assert!(module().validate().is_ok());
    }

    #[test]
    fn vmpp_above_voc_rejected() {
        let mut m = module();
        m.vmpp_v = 45.0;
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("vmpp_v"));
    }

    #[test]
    fn tiny_voc_rejected() {
        let mut m = module();
        m.voc_v = 1.0e-6;
        m.vmpp_v = 1.0e-7;
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("voc_v"));
    }

    #[test]
    fn positive_temperature_coefficient_rejected() {
        let mut m = module();
        m.temp_coeff_voc_pct = 0.3;
        assert!(m.validate().is_err());
    }
}

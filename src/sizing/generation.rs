//! Monthly energy generation estimate.

use serde::{Deserialize, Serialize};

use super::losses::LossProfile;
use crate::equipment::PvModule;
use crate::irradiance::regional::monthly_ambient_temp_c;
use crate::irradiance::{MonthlyIrradiation, Site};

/// Irradiance at which the NOCT cell temperature rise is specified (W/m²).
const NOCT_IRRADIANCE_W_M2: f64 = 800.0;
/// Ambient temperature at NOCT conditions (°C).
const NOCT_AMBIENT_C: f64 = 20.0;
/// Representative in-plane irradiance during productive hours (W/m²).
const OPERATING_IRRADIANCE_W_M2: f64 = 800.0;

/// How temperature losses enter the monthly estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalModel {
    /// Use the loss profile's fixed temperature category for every month.
    #[default]
    Static,
    /// Derive a per-month temperature loss from the zone's ambient
    /// temperatures and the module's Pmax coefficient.
    Monthly,
}

/// Per-month temperature loss fraction for `module` at `site`.
pub fn monthly_temperature_losses(module: &PvModule, site: &Site) -> [f64; 12] {
    let rise = (module.noct_c - NOCT_AMBIENT_C) * OPERATING_IRRADIANCE_W_M2 / NOCT_IRRADIANCE_W_M2;
    monthly_ambient_temp_c(site.latitude).map(|ambient| {
        let cell = ambient + rise;
        (-module.temp_coeff_pmax_pct / 100.0 * (cell - 25.0)).clamp(0.0, 0.5)
    })
}

/// Estimates generation for each month (kWh).
///
/// `dc_kw × in-plane irradiation[m] × efficiency[m]`, where the regional
/// seasonal variation and days-per-month are already folded into the
/// monthly irradiation totals.
pub fn monthly_generation(
    dc_kw: f64,
    irradiation: &MonthlyIrradiation,
    site: &Site,
    losses: &LossProfile,
    thermal: ThermalModel,
    module: &PvModule,
) -> [f64; 12] {
    let in_plane = irradiation.in_array_plane(site);
    match thermal {
        ThermalModel::Static => {
            let eff = losses.system_efficiency();
            in_plane.map(|h| dc_kw * h * eff)
        }
        ThermalModel::Monthly => {
            let base = losses.efficiency_without_temperature();
            let thermal_losses = monthly_temperature_losses(module, site);
            std::array::from_fn(|m| dc_kw * in_plane[m] * base * (1.0 - thermal_losses[m]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irradiance::regional::regional_irradiation;
    use crate::irradiance::{IrradianceOrigin, IrradiancePlane};

    fn module() -> PvModule {
        PvModule {
            model: "M400".into(),
            manufacturer: String::new(),
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

    fn site(latitude: f64) -> Site {
        Site {
            latitude,
            longitude: 0.0,
            tilt_deg: crate::irradiance::optimal_tilt_deg(latitude),
            azimuth_deg: if latitude >= 0.0 { 180.0 } else { 0.0 },
            min_ambient_temp_c: -5.0,
            max_cell_temp_c: 70.0,
        }
    }

    #[test]
    fn flat_irradiation_scales_linearly() {
        let irr = MonthlyIrradiation::new(
            &[100.0; 12],
            IrradiancePlane::PlaneOfArray,
            IrradianceOrigin::Provided,
        )
        .expect("valid values");
        let losses = LossProfile::none();
        let kwh =
            monthly_generation(5.0, &irr, &site(40.0), &losses, ThermalModel::Static, &module());
        assert!(kwh.iter().all(|v| (v - 500.0).abs() < 1e-9));
    }

    #[test]
    fn annual_matches_dc_times_irradiation_times_efficiency() {
        let s = site(-23.55);
        let irr = regional_irradiation(s.latitude);
        let losses = LossProfile::default();
        let kwh = monthly_generation(6.4, &irr, &s, &losses, ThermalModel::Static, &module());
        let annual: f64 = kwh.iter().sum();
        let expected = 6.4 * irr.annual() * losses.system_efficiency();
        assert!((annual - expected).abs() < 1e-6);
    }

    #[test]
    fn generation_follows_seasons() {
        let s = site(45.0);
        let irr = regional_irradiation(s.latitude);
        let losses = LossProfile::default();
        let kwh = monthly_generation(5.0, &irr, &s, &losses, ThermalModel::Static, &module());
        assert!(kwh[6] > kwh[0]);
    }

    #[test]
    fn monthly_thermal_losses_peak_in_summer() {
        let losses = monthly_temperature_losses(&module(), &site(45.0));
        assert!(losses[6] > losses[0]);
        assert!(losses.iter().all(|l| (0.0..=0.5).contains(l)));
    }

    #[test]
    fn cold_climate_has_small_thermal_loss() {
        let losses = monthly_temperature_losses(&module(), &site(70.0));
        // Polar January: -20 + 25 = 5 °C cell, below STC.
        assert_eq!(losses[0], 0.0);
    }

    #[test]
    fn monthly_thermal_model_differs_from_static() {
        let s = site(10.5);
        let irr = regional_irradiation(s.latitude);
        let losses = LossProfile::default();
        let fixed = monthly_generation(5.0, &irr, &s, &losses, ThermalModel::Static, &module());
        let monthly = monthly_generation(5.0, &irr, &s, &losses, ThermalModel::Monthly, &module());
        assert!(fixed.iter().zip(monthly.iter()).any(|(a, b)| (a - b).abs() > 1e-6));
    }
}

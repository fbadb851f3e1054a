//! Static regional irradiation tables used when no measured data is available.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DAYS_IN_MONTH, IrradianceOrigin, IrradiancePlane, MonthlyIrradiation, Site};
use super::source::IrradianceSource;
use crate::error::Result;

/// Latitude band used to index the regional tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateZone {
    Equatorial,
    Tropical,
    Subtropical,
    Temperate,
    Boreal,
    Polar,
}

impl ClimateZone {
    pub const ALL: [ClimateZone; 6] = [
        ClimateZone::Equatorial,
        ClimateZone::Tropical,
        ClimateZone::Subtropical,
        ClimateZone::Temperate,
        ClimateZone::Boreal,
        ClimateZone::Polar,
    ];

    /// Zone for a latitude; the hemisphere does not matter here.
    pub fn from_latitude(latitude: f64) -> Self {
        let lat = latitude.abs();
        if lat < 10.0 {
            Self::Equatorial
        } else if lat < 23.5 {
            Self::Tropical
        } else if lat < 35.0 {
            Self::Subtropical
        } else if lat < 50.0 {
            Self::Temperate
        } else if lat < 66.5 {
            Self::Boreal
        } else {
            Self::Polar
        }
    }

    /// Annual mean daily irradiation on an optimally tilted plane
    /// (kWh/m²/day).
    pub fn peak_sun_hours(self) -> f64 {
        match self {
            Self::Equatorial => 4.9,
            Self::Tropical => 5.5,
            Self::Subtropical => 5.2,
            Self::Temperate => 4.0,
            Self::Boreal => 3.0,
            Self::Polar => 2.2,
        }
    }

    /// Raw northern-hemisphere seasonal shape, January first. Not normalized.
    #[rustfmt::skip]
    fn seasonal_shape(self) -> [f64; 12] {
        match self {
            Self::Equatorial => [0.97, 1.00, 1.02, 1.00, 0.99, 0.97, 0.98, 1.01, 1.03, 1.02, 0.99, 0.96],
            Self::Tropical => [0.88, 0.94, 1.02, 1.07, 1.09, 1.06, 1.04, 1.05, 1.03, 0.98, 0.91, 0.86],
            Self::Subtropical => [0.72, 0.82, 0.97, 1.09, 1.18, 1.21, 1.20, 1.15, 1.04, 0.90, 0.76, 0.68],
            Self::Temperate => [0.45, 0.63, 0.90, 1.18, 1.35, 1.42, 1.43, 1.30, 1.05, 0.75, 0.50, 0.40],
            Self::Boreal => [0.20, 0.42, 0.85, 1.30, 1.65, 1.80, 1.72, 1.40, 0.95, 0.55, 0.26, 0.14],
            Self::Polar => [0.02, 0.15, 0.70, 1.45, 2.10, 2.40, 2.20, 1.60, 0.85, 0.30, 0.05, 0.00],
        }
    }

    /// Northern-hemisphere monthly mean ambient temperature (°C).
    #[rustfmt::skip]
    fn ambient_shape_c(self) -> [f64; 12] {
        match self {
            Self::Equatorial => [27.0; 12],
            Self::Tropical => [22.0, 23.0, 25.0, 27.0, 28.0, 28.0, 28.0, 28.0, 27.0, 26.0, 24.0, 22.0],
            Self::Subtropical => [10.0, 12.0, 15.0, 19.0, 23.0, 27.0, 29.0, 29.0, 26.0, 21.0, 15.0, 11.0],
            Self::Temperate => [1.0, 2.0, 6.0, 10.0, 15.0, 18.0, 20.0, 20.0, 16.0, 11.0, 6.0, 2.0],
            Self::Boreal => [-8.0, -7.0, -2.0, 4.0, 10.0, 15.0, 17.0, 15.0, 10.0, 4.0, -2.0, -6.0],
            Self::Polar => [-20.0, -20.0, -17.0, -10.0, -2.0, 4.0, 7.0, 5.0, 0.0, -8.0, -15.0, -18.0],
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equatorial => "equatorial",
            Self::Tropical => "tropical",
            Self::Subtropical => "subtropical",
            Self::Temperate => "temperate",
            Self::Boreal => "boreal",
            Self::Polar => "polar",
        };
        f.write_str(name)
    }
}

/// Rotates a northern-hemisphere monthly series by six months for the south.
fn for_hemisphere(values: [f64; 12], latitude: f64) -> [f64; 12] {
    if latitude >= 0.0 {
        return values;
    }
    std::array::from_fn(|m| values[(m + 6) % 12])
}

/// Seasonal variation factors for a latitude, January first.
///
/// Normalized so that the day-weighted mean is exactly one, i.e.
/// `Σ factor[m] × days[m] = 365`.
pub fn seasonal_variation(latitude: f64) -> [f64; 12] {
    let shape = for_hemisphere(ClimateZone::from_latitude(latitude).seasonal_shape(), latitude);
    let weighted: f64 = shape
        .iter()
        .zip(DAYS_IN_MONTH)
        .map(|(s, d)| s * f64::from(d))
        .sum();
    let scale = 365.0 / weighted;
    shape.map(|s| s * scale)
}

/// Monthly mean ambient temperature for a latitude (°C), January first.
pub fn monthly_ambient_temp_c(latitude: f64) -> [f64; 12] {
    for_hemisphere(ClimateZone::from_latitude(latitude).ambient_shape_c(), latitude)
}

/// Monthly irradiation on the optimal plane from the regional tables.
pub fn regional_irradiation(latitude: f64) -> MonthlyIrradiation {
    let zone = ClimateZone::from_latitude(latitude);
    let psh = zone.peak_sun_hours();
    let variation = seasonal_variation(latitude);
    let mut kwh_m2 = [0.0; 12];
    for (m, value) in kwh_m2.iter_mut().enumerate() {
        *value = psh * variation[m] * f64::from(DAYS_IN_MONTH[m]);
    }
    MonthlyIrradiation {
        kwh_m2,
        plane: IrradiancePlane::Optimal,
        origin: IrradianceOrigin::Regional(zone),
    }
}

/// Irradiance source backed by the static regional tables. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegionalTables;

impl IrradianceSource for RegionalTables {
    fn name(&self) -> &str {
        "regional"
    }

    fn monthly_irradiation(&self, site: &Site) -> Result<MonthlyIrradiation> {
        Ok(regional_irradiation(site.latitude))
    }
}

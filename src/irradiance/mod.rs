//! Site description and monthly irradiation data.

pub mod orientation;
pub mod regional;
#[cfg(feature = "remote")]
pub mod remote;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

pub use orientation::{optimal_tilt_deg, orientation_factor};
pub use regional::{ClimateZone, RegionalTables};
#[cfg(feature = "remote")]
pub use remote::RemoteIrradiance;
pub use source::{IrradianceSource, ProvidedIrradiation, WithFallback};

/// Days per month for a non-leap year.
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Three-letter month labels, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Installation site: location, array orientation, and design temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Array tilt from horizontal (degrees).
    pub tilt_deg: f64,
    /// Array azimuth, degrees clockwise from north.
    pub azimuth_deg: f64,
    /// Record low ambient temperature; sets the cold Voc.
    pub min_ambient_temp_c: f64,
    /// Worst-case cell temperature; sets the hot Vmpp.
    pub max_cell_temp_c: f64,
}

impl Site {
    pub fn climate_zone(&self) -> ClimateZone {
        ClimateZone::from_latitude(self.latitude)
    }

    pub fn is_southern(&self) -> bool {
        self.latitude < 0.0
    }

    /// Orientation correction for this site's tilt and azimuth.
    pub fn orientation_factor(&self) -> f64 {
        orientation_factor(self.latitude, self.tilt_deg, self.azimuth_deg)
    }
}

/// Which plane the irradiation values refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrradiancePlane {
    /// Optimally tilted, equator-facing plane; orientation correction applies.
    Optimal,
    /// The array's own plane; values are used as-is.
    PlaneOfArray,
}

/// Where a set of monthly values came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrradianceOrigin {
    Regional(ClimateZone),
    Provided,
    Remote(String),
}

/// Monthly irradiation totals (kWh/m² per month), January first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyIrradiation {
    pub kwh_m2: [f64; 12],
    pub plane: IrradiancePlane,
    pub origin: IrradianceOrigin,
}

impl MonthlyIrradiation {
    /// Wraps twelve monthly totals after checking they are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidInput`] if the slice is not twelve long
    /// or holds negative or non-finite values, or sums to zero.
    pub fn new(values: &[f64], plane: IrradiancePlane, origin: IrradianceOrigin) -> Result<Self> {
        let kwh_m2: [f64; 12] = values.try_into().map_err(|_| {
            SizingError::invalid(
                "irradiation",
                format!("expected 12 monthly values, got {}", values.len()),
            )
        })?;
        if kwh_m2.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SizingError::invalid(
                "irradiation",
                "monthly values must be finite and >= 0",
            ));
        }
        if kwh_m2.iter().sum::<f64>() <= 0.0 {
            return Err(SizingError::invalid("irradiation", "annual total must be > 0"));
        }
        Ok(Self {
            kwh_m2,
            plane,
            origin,
        })
    }

    /// Annual total (kWh/m²).
    pub fn annual(&self) -> f64 {
        self.kwh_m2.iter().sum()
    }

    /// Mean daily irradiation for a month (peak sun hours).
    pub fn daily_mean(&self, month: usize) -> f64 {
        self.kwh_m2[month] / f64::from(DAYS_IN_MONTH[month])
    }

    /// Irradiation in the array plane for the given site.
    pub fn in_array_plane(&self, site: &Site) -> [f64; 12] {
        let factor = match self.plane {
            IrradiancePlane::Optimal => site.orientation_factor(),
            IrradiancePlane::PlaneOfArray => 1.0,
        };
        self.kwh_m2.map(|v| v * factor)
    }
}

//! Monthly electricity consumption and consumption-derived sizing.

use serde::Serialize;

use crate::error::{Result, SizingError};
use crate::irradiance::{MonthlyIrradiation, Site};

/// Twelve monthly consumption totals (kWh), January first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionProfile {
    monthly_kwh: [f64; 12],
    /// Energy billed every month regardless of generation (kWh).
    minimum_billable_kwh: f64,
}

impl ConsumptionProfile {
    /// # Errors
    ///
    /// Fails unless `values` holds twelve finite, non-negative totals.
    pub fn from_monthly(values: &[f64]) -> Result<Self> {
        let monthly_kwh: [f64; 12] = values.try_into().map_err(|_| {
            SizingError::invalid(
                "consumption.monthly_kwh",
                format!("expected 12 monthly values, got {}", values.len()),
            )
        })?;
        if monthly_kwh.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SizingError::invalid(
                "consumption.monthly_kwh",
                "monthly values must be finite and >= 0",
            ));
        }
        Ok(Self {
            monthly_kwh,
            minimum_billable_kwh: 0.0,
        })
    }

    /// The same consumption every month.
    ///
    /// # Errors
    ///
    /// Fails on a negative or non-finite average.
    pub fn from_average(kwh_per_month: f64) -> Result<Self> {
        Self::from_monthly(&[kwh_per_month; 12])
    }

    /// Sets the per-month energy that generation cannot offset (a utility's
    /// minimum charge or availability fee).
    ///
    /// # Errors
    ///
    /// Fails on a negative or non-finite value.
    pub fn with_minimum_billable(self, kwh_per_month: f64) -> Result<Self> {
        if !(kwh_per_month.is_finite() && kwh_per_month >= 0.0) {
            return Err(SizingError::invalid(
                "consumption.minimum_billable_kwh",
                "must be finite and >= 0",
            ));
        }
        Ok(Self {
            minimum_billable_kwh: kwh_per_month,
            ..self
        })
    }

    pub fn monthly_kwh(&self) -> &[f64; 12] {
        &self.monthly_kwh
    }

    pub fn minimum_billable_kwh(&self) -> f64 {
        self.minimum_billable_kwh
    }

    pub fn annual_kwh(&self) -> f64 {
        self.monthly_kwh.iter().sum()
    }

    /// Consumption above the minimum billable energy, per month.
    pub fn offsettable_monthly_kwh(&self) -> [f64; 12] {
        self.monthly_kwh
            .map(|c| (c - self.minimum_billable_kwh).max(0.0))
    }

    pub fn offsettable_annual_kwh(&self) -> f64 {
        self.offsettable_monthly_kwh().iter().sum()
    }

    /// DC power needed for generation to match the offsettable consumption.
    ///
    /// `kWp = offsettable kWh / (in-plane annual irradiation × efficiency)`,
    /// where the in-plane figure already carries the orientation correction.
    ///
    /// # Errors
    ///
    /// Fails when nothing is offsettable or the efficiency is not positive.
    pub fn target_power_kw(
        &self,
        irradiation: &MonthlyIrradiation,
        site: &Site,
        system_efficiency: f64,
    ) -> Result<f64> {
        let offsettable = self.offsettable_annual_kwh();
        if offsettable <= 0.0 {
            return Err(SizingError::invalid(
                "consumption",
                "no consumption above the minimum billable energy",
            ));
        }
        if system_efficiency <= 0.0 {
            return Err(SizingError::invalid("losses", "system efficiency must be > 0"));
        }
        let in_plane: f64 = irradiation.in_array_plane(site).iter().sum();
        if in_plane <= 0.0 {
            return Err(SizingError::invalid("irradiation", "in-plane annual total must be > 0"));
        }
        Ok(offsettable / (in_plane * system_efficiency))
    }

    /// Annual generation over offsettable consumption, or `None` when
    /// nothing is offsettable.
    pub fn coverage_ratio(&self, annual_generation_kwh: f64) -> Option<f64> {
        let offsettable = self.offsettable_annual_kwh();
        (offsettable > 0.0).then(|| annual_generation_kwh / offsettable)
    }

    /// Generation as a percentage of consumption, month by month. Months
    /// without consumption report zero.
    pub fn monthly_coverage_pct(&self, generation_kwh: &[f64; 12]) -> [f64; 12] {
        std::array::from_fn(|m| {
            let c = self.monthly_kwh[m];
            if c > 0.0 { 100.0 * generation_kwh[m] / c } else { 0.0 }
        })
    }
}

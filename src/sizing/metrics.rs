//! Performance indicators for a dimensioned system.

use std::fmt;

use serde::Serialize;

use super::engine::DimensioningInput;
use super::types::DimensioningResult;
use crate::equipment::{Inverter, PvModule};

/// Grid emission factor used when a project does not set one (kg CO₂/kWh).
pub const DEFAULT_GRID_EMISSION_KG_PER_KWH: f64 = 0.4;

/// Headline figures for one configuration.
///
/// Derived from a [`DimensioningResult`] so the report and the ranking can
/// never disagree about generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// Installed DC power (kWp).
    pub dc_power_kw: f64,
    /// Combined inverter AC rating (kW).
    pub ac_power_kw: f64,
    pub annual_generation_kwh: f64,
    /// Annual generation per installed kWp (kWh/kWp).
    pub specific_yield: f64,
    /// Final yield over reference yield (in-plane irradiation in kWh/m²
    /// against 1 kW/m² STC).
    pub performance_ratio: f64,
    pub capacity_factor: f64,
    /// Combined loss implied by the performance ratio (%).
    pub total_loss_pct: f64,
    /// Module area (m²).
    pub array_area_m2: f64,
    /// Emissions avoided per year (kg CO₂).
    pub co2_avoided_kg: f64,
    /// Annual generation over offsettable consumption (%), when known.
    pub consumption_coverage_pct: Option<f64>,
}

impl PerformanceReport {
    pub fn from_result(
        result: &DimensioningResult,
        module: &PvModule,
        inverter: &Inverter,
        input: &DimensioningInput<'_>,
        grid_emission_kg_per_kwh: f64,
    ) -> Self {
        let c = &result.configuration;
        let annual = result.annual_generation_kwh;
        let specific_yield = if c.dc_power_kw > 0.0 {
            annual / c.dc_power_kw
        } else {
            0.0
        };
        let reference_yield: f64 = input.irradiation.in_array_plane(input.site).iter().sum();
        let performance_ratio = if reference_yield > 0.0 {
            specific_yield / reference_yield
        } else {
            0.0
        };

        Self {
            dc_power_kw: c.dc_power_kw,
            ac_power_kw: inverter.ac_power_kw() * f64::from(c.inverter_count),
            annual_generation_kwh: annual,
            specific_yield,
            performance_ratio,
            capacity_factor: result.capacity_factor,
            total_loss_pct: (1.0 - performance_ratio) * 100.0,
            array_area_m2: module.area_m2 * f64::from(c.total_modules),
            co2_avoided_kg: annual * grid_emission_kg_per_kwh,
            consumption_coverage_pct: input
                .consumption
                .and_then(|p| p.coverage_ratio(annual))
                .map(|r| r * 100.0),
        }
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Performance Report ---")?;
        writeln!(f, "DC power:              {:.2} kWp", self.dc_power_kw)?;
        writeln!(f, "AC power:              {:.2} kW", self.ac_power_kw)?;
        writeln!(f, "Annual generation:     {:.0} kWh", self.annual_generation_kwh)?;
        writeln!(f, "Specific yield:        {:.0} kWh/kWp", self.specific_yield)?;
        writeln!(f, "Performance ratio:     {:.1}%", self.performance_ratio * 100.0)?;
        writeln!(f, "Capacity factor:       {:.1}%", self.capacity_factor * 100.0)?;
        writeln!(f, "Total losses:          {:.1}%", self.total_loss_pct)?;
        writeln!(f, "Array area:            {:.1} m2", self.array_area_m2)?;
        write!(f, "CO2 avoided:           {:.0} kg/yr", self.co2_avoided_kg)?;
        if let Some(pct) = self.consumption_coverage_pct {
            write!(f, "\nConsumption coverage:  {pct:.1}%")?;
        }
        Ok(())
    }
}

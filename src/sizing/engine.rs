//! Pair evaluation and ranking over a catalog.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::generation::{ThermalModel, monthly_generation};
use super::losses::LossProfile;
use super::scoring::{CompatibilityStatus, ScoreInputs, ScoreWeights, score};
use super::strings::{VoltageWindow, search_layout, strings_per_mppt};
use super::types::{Configuration, DimensioningResult};
use crate::consumption::ConsumptionProfile;
use crate::equipment::{Catalog, Inverter, PvModule};
use crate::error::{Result, SizingError};
use crate::financial::CostModel;
use crate::irradiance::{MonthlyIrradiation, Site};

const HOURS_PER_YEAR: f64 = 8760.0;

/// Tunables for the dimensioner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingSettings {
    /// Upper DC/AC ratio used to decide how many inverters a target needs.
    pub max_dc_ac_ratio: f64,
    /// Ratio at which the compatibility score peaks.
    pub optimal_dc_ac_ratio: f64,
    /// Pairings that would need more inverters than this are dropped.
    pub max_inverters: u32,
    /// Replace the inverter loss category with each inverter's datasheet
    /// efficiency.
    pub datasheet_inverter_efficiency: bool,
    pub thermal_model: ThermalModel,
    /// Length of the ranking kept in project reports.
    pub max_results: usize,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            max_dc_ac_ratio: 1.35,
            optimal_dc_ac_ratio: 1.15,
            max_inverters: 10,
            datasheet_inverter_efficiency: true,
            thermal_model: ThermalModel::Static,
            max_results: 10,
        }
    }
}

impl SizingSettings {
    /// # Errors
    ///
    /// Fails on non-positive ratios or a zero cap.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_dc_ac_ratio.is_finite() && self.max_dc_ac_ratio > 0.0) {
            return Err(SizingError::invalid("sizing.max_dc_ac_ratio", "must be > 0"));
        }
        if !(self.optimal_dc_ac_ratio.is_finite() && self.optimal_dc_ac_ratio > 0.0) {
            return Err(SizingError::invalid("sizing.optimal_dc_ac_ratio", "must be > 0"));
        }
        if self.max_inverters == 0 {
            return Err(SizingError::invalid("sizing.max_inverters", "must be > 0"));
        }
        if self.max_results == 0 {
            return Err(SizingError::invalid("sizing.max_results", "must be > 0"));
        }
        Ok(())
    }
}

/// Everything about one project the dimensioner needs, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct DimensioningInput<'a> {
    pub site: &'a Site,
    /// Requested DC power (kWp).
    pub target_power_kw: f64,
    pub losses: &'a LossProfile,
    pub irradiation: &'a MonthlyIrradiation,
    pub consumption: Option<&'a ConsumptionProfile>,
    pub budget: Option<f64>,
    pub costs: &'a CostModel,
}

/// Evaluates every module/inverter pair of a catalog and ranks the feasible
/// ones.
#[derive(Debug, Clone)]
pub struct Dimensioner<'a> {
    catalog: &'a Catalog,
    settings: SizingSettings,
    weights: ScoreWeights,
}

impl<'a> Dimensioner<'a> {
    pub fn new(catalog: &'a Catalog, settings: SizingSettings, weights: ScoreWeights) -> Self {
        Self {
            catalog,
            settings,
            weights,
        }
    }

    pub fn settings(&self) -> &SizingSettings {
        &self.settings
    }

    /// Ranked results, best first. Ties on score order by module then
    /// inverter name so output is deterministic.
    ///
    /// An empty vector means no pair is feasible; that is not an error here.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive target, invalid losses, settings or weights.
    pub fn run(&self, input: &DimensioningInput<'_>) -> Result<Vec<DimensioningResult>> {
        if !(input.target_power_kw.is_finite() && input.target_power_kw > 0.0) {
            return Err(SizingError::invalid(
                "target.power_kw",
                format!("must be > 0, got {}", input.target_power_kw),
            ));
        }
        input.losses.validate()?;
        self.settings.validate()?;
        self.weights.validate()?;

        let mut results: Vec<DimensioningResult> = self
            .catalog
            .pairs()
            .filter_map(|(module, inverter)| self.evaluate(module, inverter, input))
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total
                .total_cmp(&a.score.total)
                .then_with(|| a.module.cmp(&b.module))
                .then_with(|| a.inverter.cmp(&b.inverter))
        });

        info!(
            target_kw = input.target_power_kw,
            pairs = self.catalog.modules().len() * self.catalog.inverters().len(),
            feasible = results.len(),
            "dimensioning finished"
        );
        Ok(results)
    }

    /// Number of inverters a target needs: enough AC capacity at the maximum
    /// DC/AC ratio, and enough string inputs for the longest feasible strings.
    fn inverter_count(
        &self,
        target_kw: f64,
        target_modules: u32,
        window: &VoltageWindow,
        inverter: &Inverter,
    ) -> u32 {
        let dc_per_inverter = inverter.ac_power_kw() * self.settings.max_dc_ac_ratio;
        let by_power = (target_kw / dc_per_inverter).ceil();
        let per_inverter = window
            .max_modules_per_string
            .saturating_mul(inverter.max_strings());
        let by_inputs = target_modules.div_ceil(per_inverter.max(1));
        (by_power as u32).max(by_inputs).max(1)
    }

    /// Sizes and scores one pairing; `None` when the pair cannot be wired or
    /// would need too many inverters.
    pub fn evaluate(
        &self,
        module: &PvModule,
        inverter: &Inverter,
        input: &DimensioningInput<'_>,
    ) -> Option<DimensioningResult> {
        let Some(window) = VoltageWindow::for_pair(module, inverter, input.site) else {
            debug!(
                module = %module.model,
                inverter = %inverter.model,
                "voltage window empty, pair excluded"
            );
            return None;
        };

        let module_kw = module.nominal_power_kw();
        let target_kw = input.target_power_kw;
        let target_modules = (target_kw / module_kw).round().max(1.0) as u32;

        let inverter_count = self.inverter_count(target_kw, target_modules, &window, inverter);
        if inverter_count > self.settings.max_inverters {
            debug!(
                module = %module.model,
                inverter = %inverter.model,
                needed = inverter_count,
                max = self.settings.max_inverters,
                "too many inverters, pair excluded"
            );
            return None;
        }

        let max_strings = inverter.max_strings().saturating_mul(inverter_count);
        let layout = search_layout(&window, target_kw, module_kw, max_strings);
        let inverter_count = inverter_count.min(layout.string_count);

        let dc_power_kw = f64::from(layout.total_modules) * module_kw;
        let ac_power_kw = inverter.ac_power_kw() * f64::from(inverter_count);
        let dc_ac_ratio = dc_power_kw / ac_power_kw;

        let losses = if self.settings.datasheet_inverter_efficiency {
            input.losses.with_inverter_efficiency(inverter.efficiency)
        } else {
            *input.losses
        };
        let monthly_generation_kwh = monthly_generation(
            dc_power_kw,
            input.irradiation,
            input.site,
            &losses,
            self.settings.thermal_model,
            module,
        );
        let annual_generation_kwh: f64 = monthly_generation_kwh.iter().sum();
        let capacity_factor = annual_generation_kwh / (dc_power_kw * HOURS_PER_YEAR);
        let compatibility_status = CompatibilityStatus::from_dc_ac_ratio(dc_ac_ratio);

        let estimated_cost = input.costs.system_cost(
            module.price,
            layout.total_modules,
            inverter.price,
            inverter_count,
            dc_power_kw,
        );
        let coverage_ratio = input
            .consumption
            .and_then(|c| c.coverage_ratio(annual_generation_kwh));

        let score = score(
            &ScoreInputs {
                dc_ac_ratio,
                optimal_dc_ac_ratio: self.settings.optimal_dc_ac_ratio,
                capacity_factor,
                coverage_ratio,
                cost: estimated_cost,
                budget: input.budget,
            },
            &self.weights,
        );

        let configuration = Configuration {
            modules_per_string: layout.modules_per_string,
            string_count: layout.string_count,
            inverter_count,
            total_modules: layout.total_modules,
            dc_power_kw,
        };
        let warnings = warnings(
            module,
            inverter,
            input,
            &configuration,
            dc_ac_ratio,
            compatibility_status,
        );

        Some(DimensioningResult {
            module: module.model.clone(),
            inverter: inverter.model.clone(),
            configuration,
            window,
            monthly_generation_kwh,
            annual_generation_kwh,
            dc_ac_ratio,
            capacity_factor,
            compatibility_status,
            score,
            estimated_cost,
            warnings,
        })
    }
}

fn warnings(
    module: &PvModule,
    inverter: &Inverter,
    input: &DimensioningInput<'_>,
    config: &Configuration,
    dc_ac_ratio: f64,
    status: CompatibilityStatus,
) -> Vec<String> {
    let mut out = Vec::new();

    let module_kw = module.nominal_power_kw();
    let deviation_kw = config.dc_power_kw - input.target_power_kw;
    if deviation_kw.abs() > module_kw + 1e-9 {
        out.push(format!(
            "installed {:.2} kWp differs from the {:.2} kWp target by more than one module ({:+.2} kWp)",
            config.dc_power_kw, input.target_power_kw, deviation_kw
        ));
    }

    let vmpp_cold =
        module.vmpp_at(input.site.min_ambient_temp_c) * f64::from(config.modules_per_string);
    if vmpp_cold > inverter.mppt_max_v {
        out.push(format!(
            "string Vmpp {vmpp_cold:.0} V at {:.0} °C exceeds the MPPT maximum of {:.0} V",
            input.site.min_ambient_temp_c, inverter.mppt_max_v
        ));
    }

    let per_tracker = strings_per_mppt(config.string_count, config.inverter_count, inverter);
    let current = module.isc_a * f64::from(per_tracker);
    if current > inverter.max_input_current_a {
        out.push(format!(
            "{per_tracker} string(s) per MPPT draw {current:.1} A, above the {:.1} A input limit",
            inverter.max_input_current_a
        ));
    }

    if status == CompatibilityStatus::Problematic {
        out.push(format!("DC/AC ratio {dc_ac_ratio:.2} is outside the acceptable 0.80-1.50 band"));
    }

    out
}

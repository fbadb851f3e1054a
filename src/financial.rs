//! System cost and simple investment analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};

/// Per-kWp costs on top of module and inverter prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostModel {
    /// Balance of system: mounting, cabling, protection (per kWp).
    pub bos_per_kwp: f64,
    /// Labour and commissioning (per kWp).
    pub installation_per_kwp: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            bos_per_kwp: 900.0,
            installation_per_kwp: 600.0,
        }
    }
}

impl CostModel {
    /// Capital cost of a configuration.
    pub fn system_cost(
        &self,
        module_price: f64,
        total_modules: u32,
        inverter_price: f64,
        inverter_count: u32,
        dc_kw: f64,
    ) -> f64 {
        module_price * f64::from(total_modules)
            + inverter_price * f64::from(inverter_count)
            + dc_kw * (self.bos_per_kwp + self.installation_per_kwp)
    }
}

/// Longest analysis horizon accepted (years).
pub const MAX_YEARS: u32 = 100;

/// Tariff and economic assumptions for the investment analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialParams {
    /// Energy price avoided per kWh generated.
    pub tariff_per_kwh: f64,
    /// Yearly tariff increase (0.05 = 5%).
    pub tariff_escalation: f64,
    /// Yearly output degradation (0.005 = 0.5%).
    pub degradation: f64,
    /// Discount rate for NPV and LCOE.
    pub discount_rate: f64,
    /// Yearly O&M cost as a share of capital cost.
    pub om_cost_fraction: f64,
    /// Analysis horizon (years).
    pub years: u32,
}

impl Default for FinancialParams {
    fn default() -> Self {
        Self {
            tariff_per_kwh: 0.85,
            tariff_escalation: 0.05,
            degradation: 0.005,
            discount_rate: 0.08,
            om_cost_fraction: 0.01,
            years: 25,
        }
    }
}

impl FinancialParams {
    /// # Errors
    ///
    /// Fails on negative prices or rates outside their sensible ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.tariff_per_kwh.is_finite() && self.tariff_per_kwh >= 0.0) {
            return Err(SizingError::invalid("financial.tariff_per_kwh", "must be >= 0"));
        }
        if !(0.0..1.0).contains(&self.degradation) {
            return Err(SizingError::invalid("financial.degradation", "must be in [0.0, 1.0)"));
        }
        if !(self.discount_rate.is_finite() && self.discount_rate > -1.0) {
            return Err(SizingError::invalid("financial.discount_rate", "must be > -1.0"));
        }
        if !(self.tariff_escalation.is_finite() && self.tariff_escalation > -1.0) {
            return Err(SizingError::invalid("financial.tariff_escalation", "must be > -1.0"));
        }
        if !(self.om_cost_fraction.is_finite() && self.om_cost_fraction >= 0.0) {
            return Err(SizingError::invalid("financial.om_cost_fraction", "must be >= 0"));
        }
        if !(1..=MAX_YEARS).contains(&self.years) {
            return Err(SizingError::invalid(
                "financial.years",
                format!("must be in [1, {MAX_YEARS}]"),
            ));
        }
        Ok(())
    }
}

/// Outcome of the investment analysis for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub capital_cost: f64,
    pub first_year_savings: f64,
    /// Years until cumulative net savings repay the capital cost.
    pub simple_payback_years: Option<f64>,
    pub npv: f64,
    pub irr: Option<f64>,
    /// Levelized cost of energy per kWh.
    pub lcoe: f64,
    /// Undiscounted net savings over the horizon, capital cost excluded.
    pub lifetime_savings: f64,
}

/// Net cash flow for years `1..=years` (index 0 is year 1), at most
/// [`MAX_YEARS`] long.
fn cash_flows(capital_cost: f64, first_year_kwh: f64, p: &FinancialParams) -> (Vec<f64>, Vec<f64>) {
    let om = capital_cost * p.om_cost_fraction;
    let years = p.years.min(MAX_YEARS);
    let mut flows = Vec::with_capacity(years as usize);
    let mut energy = Vec::with_capacity(years as usize);
    for year in 0..years {
        let y = f64::from(year);
        let kwh = first_year_kwh * (1.0 - p.degradation).powf(y);
        let tariff = p.tariff_per_kwh * (1.0 + p.tariff_escalation).powf(y);
        energy.push(kwh);
        flows.push(kwh * tariff - om);
    }
    (flows, energy)
}

fn npv_at(rate: f64, capital_cost: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + rate).powi(i as i32 + 1))
        .sum::<f64>()
        - capital_cost
}

/// Internal rate of return by bisection; `None` when NPV does not change
/// sign over `(-0.99, 1.0]`.
fn irr(capital_cost: f64, flows: &[f64]) -> Option<f64> {
    let (mut lo, mut hi) = (-0.99_f64, 1.0_f64);
    let (mut f_lo, f_hi) = (npv_at(lo, capital_cost, flows), npv_at(hi, capital_cost, flows));
    if f_lo.signum() == f_hi.signum() {
        return None;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv_at(mid, capital_cost, flows);
        if f_mid.abs() < 1e-9 || (hi - lo) < 1e-12 {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

fn payback(capital_cost: f64, flows: &[f64]) -> Option<f64> {
    if capital_cost <= 0.0 {
        return Some(0.0);
    }
    let mut cumulative = 0.0;
    for (i, cf) in flows.iter().enumerate() {
        let next = cumulative + cf;
        if next >= capital_cost && *cf > 0.0 {
            return Some(i as f64 + (capital_cost - cumulative) / cf);
        }
        cumulative = next;
    }
    None
}

/// Runs the investment analysis.
///
/// # Examples
///
/// ```
/// use pv_sizing::financial::{FinancialParams, analyze};
///
/// let p = FinancialParams {
///     tariff_per_kwh: 1.0,
///     tariff_escalation: 0.0,
///     degradation: 0.0,
///     om_cost_fraction: 0.0,
///     ..FinancialParams::default()
/// };
/// let s = analyze(10_000.0, 2_000.0, &p);
/// assert_eq!(s.simple_payback_years, Some(5.0));
/// ```
pub fn analyze(
    capital_cost: f64,
    first_year_kwh: f64,
    params: &FinancialParams,
) -> FinancialSummary {
    let (flows, energy) = cash_flows(capital_cost, first_year_kwh, params);
    let r = params.discount_rate;

    let om = capital_cost * params.om_cost_fraction;
    let mut discounted_cost = capital_cost;
    let mut discounted_energy = 0.0;
    for (i, kwh) in energy.iter().enumerate() {
        let d = (1.0 + r).powi(i as i32 + 1);
        discounted_cost += om / d;
        discounted_energy += kwh / d;
    }
    let lcoe = if discounted_energy > 0.0 {
        discounted_cost / discounted_energy
    } else {
        f64::INFINITY
    };

    FinancialSummary {
        capital_cost,
        first_year_savings: flows.first().copied().unwrap_or(0.0),
        simple_payback_years: payback(capital_cost, &flows),
        npv: npv_at(r, capital_cost, &flows),
        irr: irr(capital_cost, &flows),
        lcoe,
        lifetime_savings: flows.iter().sum(),
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial Summary ---")?;
        writeln!(f, "Capital cost:          {:.2}", self.capital_cost)?;
        writeln!(f, "First-year savings:    {:.2}", self.first_year_savings)?;
        match self.simple_payback_years {
            Some(y) => writeln!(f, "Simple payback:        {y:.1} years")?,
            None => writeln!(f, "Simple payback:        never")?,
        }
        writeln!(f, "NPV:                   {:.2}", self.npv)?;
        match self.irr {
            Some(irr) => writeln!(f, "IRR:                   {:.1}%", irr * 100.0)?,
            None => writeln!(f, "IRR:                   n/a")?,
        }
        writeln!(f, "LCOE:                  {:.4} per kWh", self.lcoe)?;
        write!(f, "Lifetime savings:      {:.2}", self.lifetime_savings)
    }
}

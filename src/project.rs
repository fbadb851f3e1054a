//! End-to-end dimensioning of one project.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::config::{CatalogConfig, IrradianceConfig, IrradianceSourceKind, ProjectConfig};
use crate::equipment::Catalog;
use crate::error::{Result, SizingError};
use crate::financial::{FinancialSummary, analyze};
use crate::irradiance::{
    ClimateZone, IrradianceSource, MONTH_NAMES, MonthlyIrradiation, ProvidedIrradiation,
    RegionalTables, Site,
};
use crate::sizing::{
    Dimensioner, DimensioningInput, DimensioningResult, LossProfile, PerformanceReport,
};

/// Irradiance source shared across threads.
pub type BoxedSource = Box<dyn IrradianceSource + Send + Sync>;

/// Builds the irradiance source chain for a configuration.
///
/// The remote source always sits in front of the regional tables. Without
/// the `remote` feature a remote configuration degrades to the tables.
///
/// # Errors
///
/// Fails on malformed provided values or when the HTTP client cannot be
/// created.
pub fn build_source(cfg: &IrradianceConfig) -> Result<BoxedSource> {
    match cfg.source {
        IrradianceSourceKind::Regional => Ok(Box::new(RegionalTables)),
        IrradianceSourceKind::Provided => {
            let values = cfg.monthly_kwh_m2.as_deref().ok_or_else(|| {
                SizingError::invalid(
                    "irradiance.monthly_kwh_m2",
                    "required when source = \"provided\"",
                )
            })?;
            Ok(Box::new(ProvidedIrradiation::new(values, cfg.plane)?))
        }
        IrradianceSourceKind::Remote => remote_source(cfg),
    }
}

#[cfg(feature = "remote")]
fn remote_source(cfg: &IrradianceConfig) -> Result<BoxedSource> {
    use std::time::Duration;

    use crate::irradiance::{RemoteIrradiance, WithFallback};

    let url = cfg.remote_url.as_deref().ok_or_else(|| {
        SizingError::invalid("irradiance.remote_url", "required when source = \"remote\"")
    })?;
    let remote = RemoteIrradiance::new(url, Duration::from_secs(cfg.timeout_secs))?;
    Ok(Box::new(WithFallback::new(remote, RegionalTables)))
}

#[cfg(not(feature = "remote"))]
fn remote_source(_cfg: &IrradianceConfig) -> Result<BoxedSource> {
    tracing::warn!("built without the `remote` feature, using regional irradiance tables");
    Ok(Box::new(RegionalTables))
}

/// Loads the configured catalog directory, or the built-in catalog.
///
/// # Errors
///
/// Fails if the directory's CSV tables are missing or invalid.
pub fn load_catalog(cfg: &CatalogConfig) -> Result<Catalog> {
    match &cfg.dir {
        Some(dir) => Catalog::from_dir(dir),
        None => Ok(Catalog::builtin()),
    }
}

/// Outcome of a project run: inputs as resolved, the ranking, and
/// performance and financial figures for the best configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub name: String,
    pub site: Site,
    pub climate_zone: ClimateZone,
    pub irradiation: MonthlyIrradiation,
    /// DC power the ranking was sized for (kWp).
    pub target_power_kw: f64,
    pub target_from_consumption: bool,
    pub consumption_kwh: Option<[f64; 12]>,
    pub losses: LossProfile,
    /// Feasible pairings before truncation.
    pub feasible_count: usize,
    /// Best first, at most `sizing.max_results` long, never empty.
    pub results: Vec<DimensioningResult>,
    pub performance: PerformanceReport,
    pub financial: FinancialSummary,
    /// Monthly generation over consumption for the best result (%).
    pub monthly_coverage_pct: Option<[f64; 12]>,
}

impl ProjectReport {
    pub fn best(&self) -> Option<&DimensioningResult> {
        self.results.first()
    }
}

/// Runs the whole pipeline for one project.
///
/// # Errors
///
/// Fails on an invalid configuration, an irradiance source error that no
/// fallback absorbed, or when no pairing in the catalog is feasible.
pub fn dimension_project(
    config: &ProjectConfig,
    catalog: &Catalog,
    source: &dyn IrradianceSource,
) -> Result<ProjectReport> {
    if let Some(first) = config.validate().into_iter().next() {
        return Err(SizingError::invalid(first.field, first.message));
    }

    let site = config.site();
    let irradiation = source.monthly_irradiation(&site)?;
    let consumption = config.consumption()?;

    let (target_power_kw, target_from_consumption) = match (config.target.power_kw, &consumption) {
        (Some(kw), _) => (kw, false),
        (None, Some(profile)) => (
            profile.target_power_kw(&irradiation, &site, config.losses.system_efficiency())?,
            true,
        ),
        (None, None) => {
            return Err(SizingError::invalid(
                "target",
                "set power_kw or a consumption profile",
            ));
        }
    };

    let input = DimensioningInput {
        site: &site,
        target_power_kw,
        losses: &config.losses,
        irradiation: &irradiation,
        consumption: consumption.as_ref(),
        budget: config.target.budget,
        costs: &config.costs,
    };
    let dimensioner = Dimensioner::new(catalog, config.sizing, config.weights);
    let mut results = dimensioner.run(&input)?;
    let feasible_count = results.len();
    if results.is_empty() {
        return Err(SizingError::NoFeasibleConfiguration {
            target_kw: target_power_kw,
        });
    }
    results.truncate(config.sizing.max_results);

    let best = &results[0];
    let (module, inverter) = match (
        catalog.module(&best.module),
        catalog.inverter(&best.inverter),
    ) {
        (Some(m), Some(i)) => (m, i),
        _ => {
            return Err(SizingError::Catalog(format!(
                "result references unknown equipment `{}`",
                best.label()
            )));
        }
    };
    let performance = PerformanceReport::from_result(
        best,
        module,
        inverter,
        &input,
        config.site.grid_emission_kg_per_kwh,
    );
    let financial = analyze(best.estimated_cost, best.annual_generation_kwh, &config.financial);
    let monthly_coverage_pct = consumption
        .as_ref()
        .map(|c| c.monthly_coverage_pct(&best.monthly_generation_kwh));

    info!(
        project = %config.name,
        target_kw = target_power_kw,
        best = %best.label(),
        score = best.score.total,
        "project dimensioned"
    );

    let report = ProjectReport {
        name: config.name.clone(),
        climate_zone: site.climate_zone(),
        site,
        irradiation,
        target_power_kw,
        target_from_consumption,
        consumption_kwh: consumption.as_ref().map(|c| *c.monthly_kwh()),
        losses: config.losses,
        feasible_count,
        results,
        performance,
        financial,
        monthly_coverage_pct,
    };
    Ok(report)
}

impl fmt::Display for ProjectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Project: {} ---", self.name)?;
        writeln!(
            f,
            "Site:                  {:.2}, {:.2} ({}), tilt {:.1} deg, azimuth {:.0} deg",
            self.site.latitude,
            self.site.longitude,
            self.climate_zone,
            self.site.tilt_deg,
            self.site.azimuth_deg
        )?;
        writeln!(
            f,
            "Irradiation:           {:.0} kWh/m2/yr",
            self.irradiation.annual()
        )?;
        let basis = if self.target_from_consumption {
            "from consumption"
        } else {
            "requested"
        };
        writeln!(f, "Target power:          {:.2} kWp ({basis})", self.target_power_kw)?;
        writeln!(f, "Losses:                {}", self.losses)?;
        writeln!(
            f,
            "Feasible pairings:     {} (showing {})",
            self.feasible_count,
            self.results.len()
        )?;
        writeln!(f)?;

        for (rank, r) in self.results.iter().enumerate() {
            writeln!(f, "#{:<2} {r}", rank + 1)?;
            for w in &r.warnings {
                writeln!(f, "      warning: {w}")?;
            }
        }

        if let Some(best) = self.best() {
            writeln!(f)?;
            writeln!(f, "--- Monthly Generation: {} ---", best.label())?;
            for (m, kwh) in best.monthly_generation_kwh.iter().enumerate() {
                let month = MONTH_NAMES[m];
                match &self.monthly_coverage_pct {
                    Some(cov) => writeln!(
                        f,
                        "{month}: {kwh:>8.0} kWh  ({:.0}% of consumption)",
                        cov[m]
                    )?,
                    None => writeln!(f, "{month}: {kwh:>8.0} kWh")?,
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "{}", self.performance)?;
        writeln!(f)?;
        write!(f, "{}", self.financial)
    }
}

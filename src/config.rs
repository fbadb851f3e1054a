//! TOML-based project configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consumption::ConsumptionProfile;
use crate::error::{Result as SizingResult, SizingError};
use crate::financial::{CostModel, FinancialParams};
use crate::irradiance::{IrradiancePlane, Site, optimal_tilt_deg};
use crate::sizing::metrics::DEFAULT_GRID_EMISSION_KG_PER_KWH;
use crate::sizing::{LossProfile, ScoreWeights, SizingSettings, ThermalModel};

/// Top-level project configuration parsed from TOML.
///
/// Every section has defaults; an empty file yields the residential preset's
/// site with default losses and settings. Load with
/// [`ProjectConfig::from_toml_file`] or pick a preset with
/// [`ProjectConfig::from_preset`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Free-form project name shown in reports.
    pub name: String,
    pub site: SiteConfig,
    pub target: TargetConfig,
    pub losses: LossProfile,
    pub sizing: SizingSettings,
    pub weights: ScoreWeights,
    pub costs: CostModel,
    pub financial: FinancialParams,
    pub irradiance: IrradianceConfig,
    pub catalog: CatalogConfig,
}

/// Location, orientation and design temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Array tilt (degrees). Omitted means the latitude's optimal tilt.
    pub tilt_deg: Option<f64>,
    /// Array azimuth, clockwise from north. Omitted means equator-facing.
    pub azimuth_deg: Option<f64>,
    /// Record low ambient temperature (°C).
    pub min_ambient_temp_c: f64,
    /// Worst-case cell temperature (°C).
    pub max_cell_temp_c: f64,
    /// Grid emission factor for the CO₂ estimate (kg/kWh).
    pub grid_emission_kg_per_kwh: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: -23.55,
            longitude: -46.63,
            tilt_deg: None,
            azimuth_deg: None,
            min_ambient_temp_c: 5.0,
            max_cell_temp_c: 70.0,
            grid_emission_kg_per_kwh: DEFAULT_GRID_EMISSION_KG_PER_KWH,
        }
    }
}

/// What the system is sized for.
///
/// An explicit `power_kw` wins; otherwise the target is derived from the
/// monthly or average consumption.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Requested DC power (kWp).
    pub power_kw: Option<f64>,
    /// Twelve monthly consumption totals (kWh).
    pub monthly_consumption_kwh: Option<Vec<f64>>,
    /// Average monthly consumption (kWh), used when no monthly values are given.
    pub average_consumption_kwh: Option<f64>,
    /// Per-month energy billed regardless of generation (kWh).
    pub minimum_billable_kwh: f64,
    /// Capital budget in project currency.
    pub budget: Option<f64>,
}

/// Longest accepted remote irradiance timeout (seconds).
pub const MAX_TIMEOUT_SECS: u64 = 120;

/// Where monthly irradiation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrradianceSourceKind {
    /// Latitude-band lookup tables.
    #[default]
    Regional,
    /// The twelve values in `monthly_kwh_m2`.
    Provided,
    /// HTTP irradiance service at `remote_url`, regional tables on failure.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IrradianceConfig {
    pub source: IrradianceSourceKind,
    /// Monthly totals (kWh/m²) for the `provided` source.
    pub monthly_kwh_m2: Option<Vec<f64>>,
    /// Plane the provided values refer to.
    pub plane: IrradiancePlane,
    /// Base URL of the irradiance service for the `remote` source.
    pub remote_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for IrradianceConfig {
    fn default() -> Self {
        Self {
            source: IrradianceSourceKind::Regional,
            monthly_kwh_m2: None,
            plane: IrradiancePlane::Optimal,
            remote_url: None,
            timeout_secs: 10,
        }
    }
}

/// Equipment catalog location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory holding `modules.csv` and `inverters.csv`. Omitted means
    /// the built-in catalog.
    pub dir: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.latitude"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<SizingError> for ConfigError {
    fn from(err: SizingError) -> Self {
        match err {
            SizingError::InvalidInput { field, message } => Self { field, message },
            other => Self::new("project", other.to_string()),
        }
    }
}

impl ProjectConfig {
    /// Single-family home in São Paulo sized from its electricity bill.
    pub fn residential() -> Self {
        Self {
            name: "Residential rooftop".to_string(),
            site: SiteConfig::default(),
            target: TargetConfig {
                average_consumption_kwh: Some(450.0),
                minimum_billable_kwh: 50.0,
                budget: Some(30_000.0),
                ..TargetConfig::default()
            },
            ..Self::default()
        }
    }

    /// Flat-roof commercial system near Madrid with a fixed power target.
    pub fn commercial() -> Self {
        Self {
            name: "Commercial flat roof".to_string(),
            site: SiteConfig {
                latitude: 40.42,
                longitude: -3.70,
                tilt_deg: Some(15.0),
                azimuth_deg: Some(180.0),
                min_ambient_temp_c: -7.0,
                max_cell_temp_c: 72.0,
                grid_emission_kg_per_kwh: 0.16,
            },
            target: TargetConfig {
                power_kw: Some(60.0),
                ..TargetConfig::default()
            },
            losses: LossProfile {
                shading: 0.01,
                soiling: 0.04,
                ..LossProfile::default()
            },
            costs: CostModel {
                bos_per_kwp: 250.0,
                installation_per_kwp: 150.0,
            },
            financial: FinancialParams {
                tariff_per_kwh: 0.14,
                tariff_escalation: 0.02,
                discount_rate: 0.06,
                ..FinancialParams::default()
            },
            ..Self::default()
        }
    }

    /// Small home system near Oslo: cold winters stretch the Voc limit and
    /// monthly temperature modelling matters.
    pub fn high_latitude() -> Self {
        Self {
            name: "High-latitude home".to_string(),
            site: SiteConfig {
                latitude: 59.91,
                longitude: 10.75,
                tilt_deg: None,
                azimuth_deg: None,
                min_ambient_temp_c: -25.0,
                max_cell_temp_c: 60.0,
                grid_emission_kg_per_kwh: 0.03,
            },
            target: TargetConfig {
                power_kw: Some(8.0),
                ..TargetConfig::default()
            },
            sizing: SizingSettings {
                thermal_model: ThermalModel::Monthly,
                ..SizingSettings::default()
            },
            costs: CostModel {
                bos_per_kwp: 350.0,
                installation_per_kwp: 300.0,
            },
            financial: FinancialParams {
                tariff_per_kwh: 0.16,
                tariff_escalation: 0.02,
                discount_rate: 0.05,
                ..FinancialParams::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential", "commercial", "high_latitude"];

    /// Loads a project from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "residential" => Ok(Self::residential()),
            "commercial" => Ok(Self::commercial()),
            "high_latitude" => Ok(Self::high_latitude()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a project from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("project", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a project from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// The site with tilt and azimuth resolved.
    pub fn site(&self) -> Site {
        let s = &self.site;
        let equator_facing = if s.latitude < 0.0 { 0.0 } else { 180.0 };
        Site {
            latitude: s.latitude,
            longitude: s.longitude,
            tilt_deg: s.tilt_deg.unwrap_or_else(|| optimal_tilt_deg(s.latitude)),
            azimuth_deg: s.azimuth_deg.unwrap_or(equator_facing),
            min_ambient_temp_c: s.min_ambient_temp_c,
            max_cell_temp_c: s.max_cell_temp_c,
        }
    }

    /// Consumption profile, if the target section describes one.
    ///
    /// # Errors
    ///
    /// Fails on malformed consumption values.
    pub fn consumption(&self) -> SizingResult<Option<ConsumptionProfile>> {
        let t = &self.target;
        let profile = match (&t.monthly_consumption_kwh, t.average_consumption_kwh) {
            (Some(monthly), _) => ConsumptionProfile::from_monthly(monthly)?,
            (None, Some(avg)) => ConsumptionProfile::from_average(avg)?,
            (None, None) => return Ok(None),
        };
        profile.with_minimum_billable(t.minimum_billable_kwh).map(Some)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.site;

        if !(-90.0..=90.0).contains(&s.latitude) {
            errors.push(ConfigError::new("site.latitude", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&s.longitude) {
            errors.push(ConfigError::new("site.longitude", "must be in [-180, 180]"));
        }
        if s.tilt_deg.is_some_and(|t| !(0.0..=90.0).contains(&t)) {
            errors.push(ConfigError::new("site.tilt_deg", "must be in [0, 90]"));
        }
        if s.azimuth_deg.is_some_and(|a| !(0.0..=360.0).contains(&a)) {
            errors.push(ConfigError::new("site.azimuth_deg", "must be in [0, 360]"));
        }
        if !(-80.0..=60.0).contains(&s.min_ambient_temp_c) {
            errors.push(ConfigError::new("site.min_ambient_temp_c", "must be in [-80, 60]"));
        }
        if !(-40.0..=120.0).contains(&s.max_cell_temp_c) {
            errors.push(ConfigError::new("site.max_cell_temp_c", "must be in [-40, 120]"));
        }
        if s.min_ambient_temp_c >= s.max_cell_temp_c {
            errors.push(ConfigError::new(
                "site.min_ambient_temp_c",
                "must be < max_cell_temp_c",
            ));
        }
        if !(s.grid_emission_kg_per_kwh.is_finite() && s.grid_emission_kg_per_kwh >= 0.0) {
            errors.push(ConfigError::new("site.grid_emission_kg_per_kwh", "must be >= 0"));
        }

        let t = &self.target;
        match t.power_kw {
            Some(kw) if !(kw.is_finite() && kw > 0.0) => {
                errors.push(ConfigError::new("target.power_kw", "must be > 0"));
            }
            None if t.monthly_consumption_kwh.is_none() && t.average_consumption_kwh.is_none() => {
                errors.push(ConfigError::new(
                    "target",
                    "set power_kw, monthly_consumption_kwh or average_consumption_kwh",
                ));
            }
            _ => {}
        }
        if let Err(e) = self.consumption() {
            errors.push(e.into());
        }
        if t.budget.is_some_and(|b| !(b.is_finite() && b > 0.0)) {
            errors.push(ConfigError::new("target.budget", "must be > 0"));
        }

        for result in [
            self.losses.validate(),
            self.sizing.validate(),
            self.weights.validate(),
            self.financial.validate(),
        ] {
            if let Err(e) = result {
                errors.push(e.into());
            }
        }
        let cost_ok = |c: f64| c.is_finite() && c >= 0.0;
        if !cost_ok(self.costs.bos_per_kwp) || !cost_ok(self.costs.installation_per_kwp) {
            errors.push(ConfigError::new("costs", "per-kWp costs must be >= 0"));
        }

        let irr = &self.irradiance;
        match irr.source {
            IrradianceSourceKind::Provided => match &irr.monthly_kwh_m2 {
                Some(values) if values.len() == 12 => {}
                Some(values) => errors.push(ConfigError::new(
                    "irradiance.monthly_kwh_m2",
                    format!("expected 12 monthly values, got {}", values.len()),
                )),
                None => errors.push(ConfigError::new(
                    "irradiance.monthly_kwh_m2",
                    "required when source = \"provided\"",
                )),
            },
            IrradianceSourceKind::Remote => {
                if irr.remote_url.as_deref().is_none_or(str::is_empty) {
                    errors.push(ConfigError::new(
                        "irradiance.remote_url",
                        "required when source = \"remote\"",
                    ));
                }
                if !(1..=MAX_TIMEOUT_SECS).contains(&irr.timeout_secs) {
                    errors.push(ConfigError::new(
                        "irradiance.timeout_secs",
                        format!("must be in [1, {MAX_TIMEOUT_SECS}]"),
                    ));
                }
            }
            IrradianceSourceKind::Regional => {}
        }

        errors
    }
}

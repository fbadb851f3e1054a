//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::financial::FinancialSummary;
use crate::irradiance::{ClimateZone, Site};
use crate::project::ProjectReport;
use crate::sizing::{DimensioningResult, PerformanceReport};

/// Project summary, headline figures, and the best configuration.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub project: ProjectSummary,
    pub performance: PerformanceReport,
    pub financial: FinancialSummary,
    /// Top-ranked configuration.
    pub best: Option<DimensioningResult>,
}

/// Resolved inputs of the served project.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub site: Site,
    pub climate_zone: ClimateZone,
    /// Annual irradiation (kWh/m²).
    pub annual_irradiation_kwh_m2: f64,
    pub target_power_kw: f64,
    pub target_from_consumption: bool,
    pub feasible_count: usize,
}

impl From<&ProjectReport> for StateResponse {
    fn from(report: &ProjectReport) -> Self {
        Self {
            project: ProjectSummary {
                name: report.name.clone(),
                site: report.site.clone(),
                climate_zone: report.climate_zone,
                annual_irradiation_kwh_m2: report.irradiation.annual(),
                target_power_kw: report.target_power_kw,
                target_from_consumption: report.target_from_consumption,
                feasible_count: report.feasible_count,
            },
            performance: report.performance.clone(),
            financial: report.financial.clone(),
            best: report.best().cloned(),
        }
    }
}

/// Optional filters for the results endpoint.
#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    /// Maximum number of results returned.
    pub limit: Option<usize>,
    /// Worst compatibility status to include (`excellent`, `good`,
    /// `acceptable`, `problematic`).
    pub min_status: Option<String>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Validation failure for a submitted project.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<ConfigError>,
}

//! HTTP client for an external PV physics service.
//!
//! The service is a black box that answers
//! `GET {base_url}/monthly-irradiation?lat=&lon=&tilt=&azimuth=` with
//! `{"monthly_kwh_m2": [..12 values..]}` already in the array plane.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::source::IrradianceSource;
use super::{IrradianceOrigin, IrradiancePlane, MonthlyIrradiation, Site};
use crate::error::{Result, SizingError};

#[derive(Debug, Deserialize)]
struct MonthlyIrradiationResponse {
    monthly_kwh_m2: Vec<f64>,
}

/// Remote irradiance source. Pair it with [`super::WithFallback`] so that an
/// unreachable service degrades to the regional tables.
#[derive(Debug, Clone)]
pub struct RemoteIrradiance {
    client: Client,
    base_url: String,
}

impl RemoteIrradiance {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| remote_error(&e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/monthly-irradiation", self.base_url)
    }
}

fn remote_error(message: &str) -> SizingError {
    SizingError::Irradiance {
        provider: "remote".into(),
        message: message.to_string(),
    }
}

/// Parses a service response body into monthly irradiation.
///
/// # Errors
///
/// Fails on malformed JSON or on anything other than twelve usable values.
pub fn parse_response(body: &str, base_url: &str) -> Result<MonthlyIrradiation> {
    let parsed: MonthlyIrradiationResponse =
        serde_json::from_str(body).map_err(|e| remote_error(&format!("bad response: {e}")))?;
    MonthlyIrradiation::new(
        &parsed.monthly_kwh_m2,
        IrradiancePlane::PlaneOfArray,
        IrradianceOrigin::Remote(base_url.to_string()),
    )
    .map_err(|e| remote_error(&e.to_string()))
}

impl IrradianceSource for RemoteIrradiance {
    fn name(&self) -> &str {
        "remote"
    }

    fn monthly_irradiation(&self, site: &Site) -> Result<MonthlyIrradiation> {
        let url = self.url();
        debug!(%url, lat = site.latitude, lon = site.longitude, "querying physics service");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", site.latitude),
                ("lon", site.longitude),
                ("tilt", site.tilt_deg),
                ("azimuth", site.azimuth_deg),
            ])
            .send()
            .map_err(|e| remote_error(&e.to_string()))?;

        if !response.status().is_success() {
            return Err(remote_error(&format!("HTTP {}", response.status())));
        }

        let body = response.text().map_err(|e| remote_error(&e.to_string()))?;
        let data = parse_response(&body, &self.base_url)?;
        info!(annual_kwh_m2 = data.annual(), "irradiation received from physics service");
        Ok(data)
    }
}

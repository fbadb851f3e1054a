//! Irradiance sources and the fallback chain between them.

use tracing::warn;

use super::{IrradianceOrigin, IrradiancePlane, MonthlyIrradiation, Site};
use crate::error::Result;

/// Something that can supply monthly irradiation for a site.
pub trait IrradianceSource {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Returns twelve monthly totals for `site`.
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::SizingError::Irradiance`] when their
    /// data is unavailable.
    fn monthly_irradiation(&self, site: &Site) -> Result<MonthlyIrradiation>;
}

impl<S: IrradianceSource + ?Sized> IrradianceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn monthly_irradiation(&self, site: &Site) -> Result<MonthlyIrradiation> {
        (**self).monthly_irradiation(site)
    }
}

/// User-supplied monthly totals, e.g. copied from a measurement campaign.
#[derive(Debug, Clone)]
pub struct ProvidedIrradiation {
    data: MonthlyIrradiation,
}

impl ProvidedIrradiation {
    /// # Errors
    ///
    /// Fails if `values` is not twelve finite, non-negative totals.
    pub fn new(values: &[f64], plane: IrradiancePlane) -> Result<Self> {
        Ok(Self {
            data: MonthlyIrradiation::new(values, plane, IrradianceOrigin::Provided)?,
        })
    }
}

impl IrradianceSource for ProvidedIrradiation {
    fn name(&self) -> &str {
        "provided"
    }

    fn monthly_irradiation(&self, _site: &Site) -> Result<MonthlyIrradiation> {
        Ok(self.data.clone())
    }
}

/// Tries `primary` first and uses `fallback` on any error.
#[derive(Debug, Clone)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: IrradianceSource, F: IrradianceSource> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: IrradianceSource, F: IrradianceSource> IrradianceSource for WithFallback<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn monthly_irradiation(&self, site: &Site) -> Result<MonthlyIrradiation> {
        match self.primary.monthly_irradiation(site) {
            Ok(data) => Ok(data),
            Err(err) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "irradiance source unavailable, falling back"
                );
                self.fallback.monthly_irradiation(site)
            }
        }
    }
}

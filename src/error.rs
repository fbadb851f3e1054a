//! Library-wide error type.

use thiserror::Error;

/// Errors raised by the sizing pipeline.
///
/// Infeasible module/inverter pairings are not errors; they are dropped from
/// the ranking. Only inputs that make the whole run meaningless end up here.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("irradiance source `{provider}` failed: {message}")]
    Irradiance { provider: String, message: String },

    #[error("no feasible module/inverter pairing for a {target_kw:.2} kW target")]
    NoFeasibleConfiguration { target_kw: f64 },
}

impl SizingError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SizingError>;

//! Photovoltaic system dimensioning: string sizing, loss composition,
//! monthly generation estimates and ranking of module/inverter pairings.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod consumption;
pub mod equipment;
pub mod error;
pub mod financial;
pub mod io;
pub mod irradiance;
pub mod project;
/// String sizing, losses, generation, scoring and ranking.
pub mod sizing;

pub use error::{Result, SizingError};

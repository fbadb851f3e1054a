//! PV system dimensioning: string sizing, losses, generation, scoring and
//! ranking of module/inverter pairings.

pub mod engine;
pub mod generation;
pub mod losses;
pub mod metrics;
pub mod scoring;
pub mod strings;
pub mod types;

pub use engine::{Dimensioner, DimensioningInput, SizingSettings};
pub use generation::ThermalModel;
pub use losses::LossProfile;
pub use metrics::PerformanceReport;
pub use scoring::{CompatibilityStatus, ScoreBreakdown, ScoreWeights};
pub use strings::{StringLayout, VoltageWindow};
pub use types::{Configuration, DimensioningResult};

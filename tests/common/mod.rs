//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use pv_sizing::consumption::ConsumptionProfile;
use pv_sizing::equipment::{Catalog, Inverter, PvModule};
use pv_sizing::financial::CostModel;
use pv_sizing::irradiance::{IrradianceSource, MonthlyIrradiation, RegionalTables, Site};
use pv_sizing::sizing::{
    Dimensioner, DimensioningInput, DimensioningResult, LossProfile, ScoreWeights, SizingSettings,
};

/// São Paulo rooftop facing north at the latitude's optimal tilt.
pub fn sao_paulo_site() -> Site {
    Site {
        latitude: -23.55,
        longitude: -46.63,
        tilt_deg: pv_sizing::irradiance::optimal_tilt_deg(-23.55),
        azimuth_deg: 0.0,
        min_ambient_temp_c: 5.0,
        max_cell_temp_c: 70.0,
    }
}

/// Regional-table irradiation for `site`.
pub fn regional(site: &Site) -> MonthlyIrradiation {
    RegionalTables
        .monthly_irradiation(site)
        .expect("regional tables cover every latitude")
}

/// Catalog read from the repository's `catalog/` directory.
pub fn csv_catalog() -> Catalog {
    Catalog::from_dir(std::path::Path::new("catalog")).expect("catalog/ should load")
}

/// An inverter whose MPPT floor sits above what any builtin module string
/// can reach without exceeding its DC maximum.
pub fn narrow_inverter() -> Inverter {
    Inverter {
        model: "NARROW-1K".into(),
        manufacturer: "Test".into(),
        ac_power_w: 1000.0,
        max_dc_voltage_v: 200.0,
        mppt_min_v: 190.0,
        mppt_max_v: 200.0,
        mppt_count: 1,
        strings_per_mppt: 1,
        max_input_current_a: 15.0,
        efficiency: 0.95,
        price: 500.0,
    }
}

/// A 400 W module with round numbers.
pub fn module_400w() -> PvModule {
    PvModule {
        model: "TEST-400".into(),
        manufacturer: "Test".into(),
        nominal_power_w: 400.0,
        vmpp_v: 34.0,
        voc_v: 41.0,
        impp_a: 11.76,
        isc_a: 12.3,
        area_m2: 1.9,
        temp_coeff_voc_pct: -0.30,
        temp_coeff_pmax_pct: -0.40,
        noct_c: 45.0,
        price: 500.0,
    }
}

/// Owned inputs for one dimensioning run.
pub struct Fixture {
    pub site: Site,
    pub irradiation: MonthlyIrradiation,
    pub losses: LossProfile,
    pub costs: CostModel,
    pub consumption: Option<ConsumptionProfile>,
    pub budget: Option<f64>,
}

impl Fixture {
    pub fn sao_paulo() -> Self {
        let site = sao_paulo_site();
        let irradiation = regional(&site);
        Self {
            site,
            irradiation,
            losses: LossProfile::default(),
            costs: CostModel::default(),
            consumption: None,
            budget: None,
        }
    }

    pub fn input(&self, target_power_kw: f64) -> DimensioningInput<'_> {
        DimensioningInput {
            site: &self.site,
            target_power_kw,
            losses: &self.losses,
            irradiation: &self.irradiation,
            consumption: self.consumption.as_ref(),
            budget: self.budget,
            costs: &self.costs,
        }
    }

    /// Ranks every pair of `catalog` with default settings and weights.
    pub fn run(&self, catalog: &Catalog, target_power_kw: f64) -> Vec<DimensioningResult> {
        Dimensioner::new(catalog, SizingSettings::default(), ScoreWeights::default())
            .run(&self.input(target_power_kw))
            .expect("valid input")
    }
}

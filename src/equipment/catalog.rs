//! Equipment catalog: candidate modules and inverters.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Inverter, PvModule};
use crate::error::{Result, SizingError};

/// File name of the module table inside a catalog directory.
pub const MODULES_FILE: &str = "modules.csv";
/// File name of the inverter table inside a catalog directory.
pub const INVERTERS_FILE: &str = "inverters.csv";

/// Candidate equipment for dimensioning.
///
/// Every module is paired with every inverter; see [`Catalog::pairs`].
/// Catalogs come from [`Catalog::new`], the loaders built on it, or
/// [`Catalog::builtin`]; the tables cannot be assembled unchecked:
///
/// ```compile_fail
/// use pv_sizing::equipment::Catalog;
///
/// let unchecked = Catalog { modules: Vec::new(), inverters: Vec::new() };
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    modules: Vec<PvModule>,
    inverters: Vec<Inverter>,
}

impl Catalog {
    /// Builds a catalog after validating every entry.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or [`SizingError::Catalog`] if
    /// either table is empty or a model name is duplicated.
    pub fn new(modules: Vec<PvModule>, inverters: Vec<Inverter>) -> Result<Self> {
        if modules.is_empty() {
            return Err(SizingError::Catalog("no modules".into()));
        }
        if inverters.is_empty() {
            return Err(SizingError::Catalog("no inverters".into()));
        }
        for m in &modules {
            m.validate()?;
        }
        for inv in &inverters {
            inv.validate()?;
        }
        if let Some(dup) = first_duplicate(modules.iter().map(|m| m.model.as_str())) {
            return Err(SizingError::Catalog(format!("duplicate module model `{dup}`")));
        }
        if let Some(dup) = first_duplicate(inverters.iter().map(|i| i.model.as_str())) {
            return Err(SizingError::Catalog(format!("duplicate inverter model `{dup}`")));
        }
        Ok(Self { modules, inverters })
    }

    /// Loads `modules.csv` and `inverters.csv` from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing, malformed, or holds an
    /// invalid entry.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let modules = File::open(dir.join(MODULES_FILE))?;
        let inverters = File::open(dir.join(INVERTERS_FILE))?;
        let catalog = Self::from_readers(modules, inverters)?;
        debug!(
            dir = %dir.display(),
            modules = catalog.modules().len(),
            inverters = catalog.inverters().len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parses module and inverter tables from any CSV readers.
    ///
    /// # Errors
    ///
    /// Returns an error if a row fails to deserialize or validate.
    pub fn from_readers(modules: impl Read, inverters: impl Read) -> Result<Self> {
        Self::new(read_rows(modules)?, read_rows(inverters)?)
    }

    /// Equipment shipped with the crate, used when no catalog is configured.
    pub fn builtin() -> Self {
        Self {
            modules: builtin_modules(),
            inverters: builtin_inverters(),
        }
    }

    pub fn modules(&self) -> &[PvModule] {
        &self.modules
    }

    pub fn inverters(&self) -> &[Inverter] {
        &self.inverters
    }

    /// All module/inverter combinations in catalog order.
    pub fn pairs(&self) -> impl Iterator<Item = (&PvModule, &Inverter)> {
        self.modules
            .iter()
            .flat_map(move |m| self.inverters.iter().map(move |inv| (m, inv)))
    }

    pub fn module(&self, model: &str) -> Option<&PvModule> {
        self.modules.iter().find(|m| m.model == model)
    }

    pub fn inverter(&self, model: &str) -> Option<&Inverter> {
        self.inverters.iter().find(|i| i.model == model)
    }
}

fn read_rows<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    if rows.is_empty() {
        warn!("catalog table has a header but no rows");
    }
    Ok(rows)
}

fn first_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Some(name);
        }
        seen.push(name);
    }
    None
}

#[expect(clippy::too_many_arguments)]
fn module(
    manufacturer: &str,
    model: &str,
    nominal_power_w: f64,
    vmpp_v: f64,
    voc_v: f64,
    impp_a: f64,
    isc_a: f64,
    area_m2: f64,
    temp_coeff_voc_pct: f64,
    temp_coeff_pmax_pct: f64,
    price: f64,
) -> PvModule {
    PvModule {
        model: model.to_string(),
        manufacturer: manufacturer.to_string(),
        nominal_power_w,
        vmpp_v,
        voc_v,
        impp_a,
        isc_a,
        area_m2,
        temp_coeff_voc_pct,
        temp_coeff_pmax_pct,
        noct_c: 45.0,
        price,
    }
}

#[rustfmt::skip]
fn builtin_modules() -> Vec<PvModule> {
    vec![
        module("Canadian Solar", "CS6R-410MS", 410.0, 31.0, 37.2, 13.23, 13.95, 1.95, -0.26, -0.34, 620.0),
        module("JA Solar", "JAM54S30-420MR", 420.0, 31.45, 37.63, 13.36, 14.04, 1.95, -0.275, -0.35, 640.0),
        module("LONGi", "LR5-72HPH-550M", 550.0, 41.95, 49.8, 13.12, 13.98, 2.58, -0.265, -0.34, 820.0),
        module("Generic", "POLY-330", 330.0, 37.2, 45.6, 8.88, 9.45, 1.94, -0.31, -0.40, 420.0),
    ]
}

#[expect(clippy::too_many_arguments)]
fn inverter(
    manufacturer: &str,
    model: &str,
    ac_power_w: f64,
    max_dc_voltage_v: f64,
    mppt_min_v: f64,
    mppt_max_v: f64,
    mppt_count: u32,
    strings_per_mppt: u32,
    max_input_current_a: f64,
    efficiency: f64,
    price: f64,
) -> Inverter {
    Inverter {
        model: model.to_string(),
        manufacturer: manufacturer.to_string(),
        ac_power_w,
        max_dc_voltage_v,
        mppt_min_v,
        mppt_max_v,
        mppt_count,
        strings_per_mppt,
        max_input_current_a,
        efficiency,
        price,
    }
}

#[rustfmt::skip]
fn builtin_inverters() -> Vec<Inverter> {
    vec![
        inverter("Growatt", "MIN 3000TL-X", 3000.0, 550.0, 80.0, 550.0, 2, 1, 13.5, 0.97, 2800.0),
        inverter("Fronius", "Primo 5.0-1", 5000.0, 1000.0, 80.0, 800.0, 2, 1, 18.0, 0.968, 5200.0),
        inverter("SMA", "Sunny Boy 6.0", 6000.0, 600.0, 175.0, 500.0, 3, 1, 15.0, 0.97, 6400.0),
        inverter("Huawei", "SUN2000-10KTL-M1", 10000.0, 1100.0, 140.0, 980.0, 2, 2, 22.0, 0.983, 9800.0),
        inverter("Sungrow", "SG33CX", 33000.0, 1100.0, 200.0, 1000.0, 3, 2, 30.0, 0.986, 24000.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULES_CSV: &str = "\
model,manufacturer,nominal_power_w,vmpp_v,voc_v,impp_a,isc_a,area_m2,temp_coeff_voc_pct,temp_coeff_pmax_pct,noct_c,price
M400,Acme,400,34.0,41.0,11.76,12.3,1.9,-0.30,-0.40,45,500
M300,Acme,300,32.0,39.0,9.4,9.9,1.6,-0.30,-0.40,45,380
";

    const INVERTERS_CSV: &str = "\
model,manufacturer,ac_power_w,max_dc_voltage_v,mppt_min_v,mppt_max_v,mppt_count,strings_per_mppt,max_input_current_a,efficiency,price
I5K,Acme,5000,600,120,550,2,1,13,0.97,4000
";

    #[test]
    fn builtin_catalog_entries_are_valid() {
        let builtin = Catalog::builtin();
        let rebuilt = Catalog::new(builtin.modules().to_vec(), builtin.inverters().to_vec());
        assert!(rebuilt.is_ok(), "builtin catalog should validate: {:?}", rebuilt.err());
    }

    #[test]
    fn parses_csv_tables() {
        let catalog = Catalog::from_readers(MODULES_CSV.as_bytes(), INVERTERS_CSV.as_bytes());
        let catalog = catalog.expect("csv catalog should parse");
        assert_eq!(catalog.modules().len(), 2);
        assert_eq!(catalog.inverters().len(), 1);
        assert_eq!(catalog.module("M300").map(|m| m.nominal_power_w), Some(300.0));
        assert_eq!(catalog.inverter("I5K").map(Inverter::max_strings), Some(2));
    }

    #[test]
    fn optional_columns_fall_back_to_defaults() {
        let modules = "\
model,nominal_power_w,vmpp_v,voc_v,impp_a,isc_a,area_m2
M400,400,34.0,41.0,11.76,12.3,1.9
";
        let catalog = Catalog::from_readers(modules.as_bytes(), INVERTERS_CSV.as_bytes())
            .expect("defaults should fill missing columns");
        let m = &catalog.modules()[0];
        assert_eq!(m.noct_c, 45.0);
        assert_eq!(m.price, 0.0);
        assert!(m.temp_coeff_voc_pct < 0.0);
    }

    #[test]
    fn pairs_is_cartesian_product() {
        let catalog = Catalog::from_readers(MODULES_CSV.as_bytes(), INVERTERS_CSV.as_bytes())
            .expect("csv catalog should parse");
        let pairs: Vec<_> = catalog.pairs().map(|(m, i)| (&*m.model, &*i.model)).collect();
        assert_eq!(pairs, vec![("M400", "I5K"), ("M300", "I5K")]);
    }

    #[test]
    fn invalid_row_is_rejected_with_model_name() {
        let modules = "\
model,nominal_power_w,vmpp_v,voc_v,impp_a,isc_a,area_m2
BAD,400,50.0,41.0,11.76,12.3,1.9
";
        let err = Catalog::from_readers(modules.as_bytes(), INVERTERS_CSV.as_bytes())
            .expect_err("vmpp above voc must fail");
        assert!(err.to_string().contains("BAD"));
    }

    #[test]
    fn duplicate_model_rejected() {
        let duplicate = "M400,Acme,400,34.0,41.0,11.76,12.3,1.9,-0.30,-0.40,45,500\n";
        let modules = format!("{MODULES_CSV}{duplicate}");
        let err = Catalog::from_readers(modules.as_bytes(), INVERTERS_CSV.as_bytes())
            .expect_err("duplicate must fail");
        assert!(err.to_string().contains("duplicate module"));
    }

    #[test]
    fn empty_inverter_table_rejected() {
        let inverters = "model,ac_power_w,max_dc_voltage_v,mppt_min_v,mppt_max_v,\
                         mppt_count,max_input_current_a\n";
        assert!(Catalog::from_readers(MODULES_CSV.as_bytes(), inverters.as_bytes()).is_err());
    }
}

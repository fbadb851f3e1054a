//! PV modules, inverters, and the catalog that pairs them.

pub mod catalog;
pub mod inverter;
pub mod module;

pub use catalog::Catalog;
pub use inverter::Inverter;
pub use module::PvModule;

//! String sizing: voltage window and series/parallel layout search.

use serde::Serialize;

use crate::equipment::{Inverter, PvModule};
use crate::irradiance::Site;

/// Feasible range of modules per string for one module/inverter pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltageWindow {
    pub min_modules_per_string: u32,
    pub max_modules_per_string: u32,
    /// Module Voc at the site's minimum ambient temperature (V).
    pub voc_cold_v: f64,
    /// Module Vmpp at the site's maximum cell temperature (V).
    pub vmpp_hot_v: f64,
}

impl VoltageWindow {
    /// Derives the window from temperature-corrected module voltages.
    ///
    /// The ceiling keeps the cold open-circuit string voltage under the
    /// inverter's DC maximum; the floor keeps the hot MPP string voltage
    /// above the MPPT minimum. Returns `None` when the floor exceeds the
    /// ceiling, i.e. the pair cannot be wired at all, or when the site
    /// temperatures yield no finite voltage.
    pub fn for_pair(module: &PvModule, inverter: &Inverter, site: &Site) -> Option<Self> {
        let voc_cold_v = module.voc_at(site.min_ambient_temp_c);
        let vmpp_hot_v = module.vmpp_at(site.max_cell_temp_c);
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(voc_cold_v) || !usable(vmpp_hot_v) {
            return None;
        }

        let max = (inverter.max_dc_voltage_v / voc_cold_v).floor();
        let min = (inverter.mppt_min_v / vmpp_hot_v).ceil().max(1.0);
        if !(max.is_finite() && min.is_finite()) || max < 1.0 || min > max {
            return None;
        }

        Some(Self {
            min_modules_per_string: min as u32,
            max_modules_per_string: max as u32,
            voc_cold_v,
            vmpp_hot_v,
        })
    }

    pub fn contains(&self, modules_per_string: u32) -> bool {
        (self.min_modules_per_string..=self.max_modules_per_string).contains(&modules_per_string)
    }
}

/// Series/parallel arrangement chosen for a target module count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringLayout {
    pub modules_per_string: u32,
    pub string_count: u32,
    pub total_modules: u32,
}

impl StringLayout {
    /// Absolute difference from the requested module count, which may be
    /// fractional.
    pub fn deviation(&self, target_modules: f64) -> f64 {
        (f64::from(self.total_modules) - target_modules).abs()
    }
}

/// Deviations closer than this count as a tie.
const TIE_TOLERANCE: f64 = 1e-9;

/// Searches the voltage window for the layout whose installed power is
/// closest to `target_kw`.
///
/// For each string length both neighbouring whole string counts are tried,
/// clamped to `[1, max_strings]`. Ties on deviation prefer reaching the
/// target over falling short, then fewer strings.
pub fn search_layout(
    window: &VoltageWindow,
    target_kw: f64,
    module_kw: f64,
    max_strings: u32,
) -> StringLayout {
    let target = target_kw / module_kw;
    let max_strings = max_strings.max(1);

    let mut best: Option<(StringLayout, f64)> = None;
    for s in window.min_modules_per_string..=window.max_modules_per_string {
        let per_string = target / f64::from(s);
        for strings in [per_string.floor(), per_string.ceil()] {
            let strings = (strings as u32).clamp(1, max_strings);
            let layout = StringLayout {
                modules_per_string: s,
                string_count: strings,
                total_modules: s.saturating_mul(strings),
            };
            let deviation = layout.deviation(target);
            let better = match &best {
                None => true,
                Some((current, current_dev)) => {
                    if (deviation - current_dev).abs() > TIE_TOLERANCE {
                        deviation < *current_dev
                    } else {
                        let key = (f64::from(layout.total_modules) < target, layout.string_count);
                        let current_key =
                            (f64::from(current.total_modules) < target, current.string_count);
                        key < current_key
                    }
                }
            };
            if better {
                best = Some((layout, deviation));
            }
        }
    }

    // The window is non-empty by construction, so the loop ran at least once.
    best.map_or(
        StringLayout {
            modules_per_string: window.min_modules_per_string,
            string_count: 1,
            total_modules: window.min_modules_per_string,
        },
        |(layout, _)| layout,
    )
}

/// Strings per tracker on the busiest MPPT when `strings` are spread
/// evenly over `inverters` units.
pub fn strings_per_mppt(strings: u32, inverters: u32, inverter: &Inverter) -> u32 {
    let per_inverter = strings.div_ceil(inverters.max(1));
    per_inverter.div_ceil(inverter.mppt_count.max(1))
}

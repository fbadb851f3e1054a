//! End-to-end dimensioning properties over full catalogs.

mod common;

use common::{Fixture, module_400w, narrow_inverter};
use pv_sizing::consumption::ConsumptionProfile;
use pv_sizing::equipment::Catalog;
use pv_sizing::irradiance::regional::regional_irradiation;
use pv_sizing::sizing::{LossProfile, VoltageWindow};

#[test]
fn builtin_ranking_is_sorted_best_first() {
    let fx = Fixture::sao_paulo();
    let results = fx.run(&Catalog::builtin(), 6.0);
    assert!(!results.is_empty());
    for pair in results.windows(2) {
        assert!(
            pair[0].score.total >= pair[1].score.total,
            "{} ({:.2}) ranked above {} ({:.2})",
            pair[0].label(),
            pair[0].score.total,
            pair[1].label(),
            pair[1].score.total
        );
    }
}

#[test]
fn every_layout_respects_its_voltage_window() {
    let fx = Fixture::sao_paulo();
    let catalog = Catalog::builtin();
    for target in [3.0, 6.0, 15.0, 40.0] {
        for r in fx.run(&catalog, target) {
            let module = catalog.module(&r.module).expect("module in catalog");
            let inverter = catalog.inverter(&r.inverter).expect("inverter in catalog");
            let window =
                VoltageWindow::for_pair(module, inverter, &fx.site).expect("feasible pair");
            assert_eq!(window, r.window);
            let s = r.configuration.modules_per_string;
            assert!(window.contains(s), "{}: {s} outside window", r.label());
            assert!(window.voc_cold_v * f64::from(s) <= inverter.max_dc_voltage_v + 1e-9);
            assert!(window.vmpp_hot_v * f64::from(s) >= inverter.mppt_min_v - 1e-9);
        }
    }
}

#[test]
fn installed_power_within_one_module_when_reachable() {
    let fx = Fixture::sao_paulo();
    let catalog = Catalog::builtin();
    for target in [2.0, 5.81, 6.0, 7.3, 12.5, 30.0] {
        for r in fx.run(&catalog, target) {
            let module_kw = catalog.module(&r.module).expect("module").nominal_power_kw();
            let inverter = catalog.inverter(&r.inverter).expect("inverter");
            let c = &r.configuration;
            assert_eq!(c.total_modules, c.modules_per_string * c.string_count);
            assert!((c.dc_power_kw - f64::from(c.total_modules) * module_kw).abs() < 1e-9);

            let max_strings = inverter.max_strings() * c.inverter_count;
            let reachable = (r.window.min_modules_per_string..=r.window.max_modules_per_string)
                .flat_map(|s| (1..=max_strings).map(move |n| s * n))
                .any(|total| (f64::from(total) * module_kw - target).abs() <= module_kw + 1e-9);
            let within = (c.dc_power_kw - target).abs() <= module_kw + 1e-9;
            let flagged = r.warnings.iter().any(|w| w.contains("more than one module"));

            if reachable {
                assert!(
                    within && !flagged,
                    "{} at {target} kWp: {:.2} kWp although a layout within one module exists",
                    r.label(),
                    c.dc_power_kw
                );
            } else {
                assert!(
                    flagged,
                    "{} at {target} kWp: {:.2} kWp without a warning",
                    r.label(),
                    c.dc_power_kw
                );
            }
        }
    }
}

#[test]
fn infeasible_inverter_never_appears() {
    let builtin = Catalog::builtin();
    let fronius = builtin.inverter("Primo 5.0-1").expect("builtin").clone();
    let catalog = Catalog::new(builtin.modules().to_vec(), vec![narrow_inverter(), fronius])
        .expect("valid catalog");

    let fx = Fixture::sao_paulo();
    let results = fx.run(&catalog, 5.0);
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.inverter != "NARROW-1K"));
    assert_eq!(results.len(), catalog.modules().len());
}

#[test]
fn only_infeasible_pairs_yield_empty_ranking() {
    let catalog =
        Catalog::new(vec![module_400w()], vec![narrow_inverter()]).expect("valid catalog");
    let fx = Fixture::sao_paulo();
    assert!(fx.run(&catalog, 5.0).is_empty());
}

#[test]
fn generation_and_capacity_factor_are_plausible() {
    let fx = Fixture::sao_paulo();
    for r in fx.run(&Catalog::builtin(), 6.0) {
        assert!(r.monthly_generation_kwh.iter().all(|m| *m > 0.0));
        let sum: f64 = r.monthly_generation_kwh.iter().sum();
        assert!((sum - r.annual_generation_kwh).abs() < 1e-6);
        assert!(
            (0.08..0.30).contains(&r.capacity_factor),
            "{}: capacity factor {:.3}",
            r.label(),
            r.capacity_factor
        );
        let specific = r.annual_generation_kwh / r.configuration.dc_power_kw;
        assert!((800.0..2200.0).contains(&specific), "{}: {specific:.0} kWh/kWp", r.label());
    }
}

#[test]
fn losses_stay_within_bounds() {
    let default = LossProfile::default();
    let efficiency = default.system_efficiency();
    assert!(efficiency > 0.0 && efficiency <= 1.0);
    assert!((default.total_loss_pct() - (1.0 - efficiency) * 100.0).abs() < 1e-9);
    assert_eq!(LossProfile::none().system_efficiency(), 1.0);

    let heavy = LossProfile {
        shading: 0.5,
        soiling: 0.5,
        ..LossProfile::default()
    };
    assert!(heavy.system_efficiency() < efficiency);
    assert!(heavy.total_loss_pct() <= 100.0);
}

#[test]
fn heavier_losses_cut_generation() {
    let catalog = Catalog::builtin();
    let clean = Fixture::sao_paulo();
    let mut dirty = Fixture::sao_paulo();
    dirty.losses.soiling = 0.15;

    let best_clean = &clean.run(&catalog, 6.0)[0];
    let matching = dirty
        .run(&catalog, 6.0)
        .into_iter()
        .find(|r| r.label() == best_clean.label())
        .expect("same pair stays feasible");
    assert!(matching.annual_generation_kwh < best_clean.annual_generation_kwh);
}

#[test]
fn consumption_changes_the_ranking_inputs() {
    let catalog = Catalog::builtin();
    let plain = Fixture::sao_paulo();
    let mut with_load = Fixture::sao_paulo();
    with_load.consumption = Some(ConsumptionProfile::from_average(300.0).expect("valid"));

    let a = plain.run(&catalog, 6.0);
    let b = with_load.run(&catalog, 6.0);
    assert_eq!(a.len(), b.len());
    assert!(a.iter().all(|r| r.score.coverage == 1.0));
    assert!(b.iter().any(|r| r.score.coverage < 1.0));
}

#[test]
fn regional_tables_cover_all_latitudes() {
    for lat in [-60.0, -33.9, -23.55, -1.3, 0.0, 14.6, 28.6, 40.4, 52.5, 59.9, 70.0] {
        let irr = regional_irradiation(lat);
        assert_eq!(irr.kwh_m2.len(), 12);
        assert!(irr.kwh_m2.iter().all(|v| *v > 0.0), "lat {lat}: {:?}", irr.kwh_m2);
        let annual = irr.annual();
        assert!((700.0..=2600.0).contains(&annual), "lat {lat}: {annual:.0} kWh/m2");
    }
}

#[test]
fn csv_catalog_matches_builtin() {
    let fx = Fixture::sao_paulo();
    let from_csv = fx.run(&common::csv_catalog(), 6.0);
    let builtin = fx.run(&Catalog::builtin(), 6.0);
    assert_eq!(from_csv.len(), builtin.len());
    for (a, b) in from_csv.iter().zip(&builtin) {
        assert_eq!(a.label(), b.label());
        assert_eq!(a.configuration, b.configuration);
    }
}

//! Single-chiller scenario with hand-computable results.

mod common;

use ctes_prep::chiller::DischargeCurveBuilder;
use ctes_prep::plant::{OrchestratorSettings, TimestepOrchestrator};

#[test]
fn linear_chiller_two_segments() {
    let curves = common::linear_chiller();
    let settings = common::discharge_settings(2);
    let result = DischargeCurveBuilder::new(&curves, &settings).build(&common::design_state());

    assert_eq!(result.segments(), 2);
    for slope in &result.slopes {
        assert!((slope - 1.0 / 3.0).abs() < 1e-9, "slope {slope}");
    }
    assert!(result.ranges.iter().all(|&r| r > 0.0));

    // Turn-down from the current PLR (0.9196) to plr_min (0.15) is resolved
    // on the 50-sample coarse grid, then split into 29 refined steps of
    // which each segment reports 14.
    let band = 40.0 * common::CP * 41.0 * 5.5 / 49.0;
    let continuous = (0.9196 - 0.15) * 1_000_000.0;
    assert!(band < continuous && continuous - band < 0.01 * continuous);
    let total = result.total_range();
    let expected = band * 28.0 / 29.0;
    assert!((total - expected).abs() < 1e-6 * expected, "total {total}");
    assert!((result.ranges[0] - result.ranges[1]).abs() < 1e-6 * expected);
}

#[test]
fn linear_chiller_through_orchestrator() {
    let mut settings = OrchestratorSettings::default();
    settings.discharge = common::discharge_settings(2);
    settings.charge.cp_loop = common::CP;
    let orchestrator = TimestepOrchestrator::new(settings);

    let input = common::chiller_input("CH-1", common::linear_chiller(), &[(920_000.0, 0.92, 12.0)]);
    let weather = common::flat_weather(1, 30.0, 22.0);
    let outcome = orchestrator.run_chiller(&input, &weather).expect("run");

    assert_eq!(outcome.full_storage_timesteps, vec![1]);
    assert_eq!(outcome.partial_storage_timesteps, vec![1]);
    // Serving 920 kW of loop load leaves nothing for charging
    assert!(outcome.charge_timesteps.is_empty());
    assert_eq!(outcome.charge[0].power_coefficient, 10.0);
    assert_eq!(outcome.negative_charge_coefficients, 0);
}

#[test]
fn idle_chiller_offers_full_charge_capacity() {
    let mut settings = OrchestratorSettings::default();
    settings.charge.cp_loop = common::CP;
    let orchestrator = TimestepOrchestrator::new(settings);

    let input = common::chiller_input("CH-1", common::linear_chiller(), &[(0.0, 0.0, 6.5)]);
    let weather = common::flat_weather(1, 30.0, 22.0);
    let outcome = orchestrator.run_chiller(&input, &weather).expect("run");

    assert_eq!(outcome.charge_timesteps, vec![1]);
    let charge = outcome.charge[0];
    assert!((charge.available_capacity_w - 1_000_000.0).abs() < 1e-6);
    // Full-load power 1 MW / 3 with the 5% condenser penalty, from idle
    let expected = 1_000_000.0 / 3.0 * 1.05 / 1_000_000.0;
    assert!((charge.power_coefficient - expected).abs() < 1e-9);
}

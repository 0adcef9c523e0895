//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ctes_prep::chiller::{ChillerCurveSet, ChillerType, DischargeSettings, TimestepState};
use ctes_prep::plant::{ChillerInput, ChillerSeries, Weather};

/// Specific heat used by the hand-computed fixtures (J/kg·K).
pub const CP: f64 = 4180.0;

/// Temperature-insensitive chiller whose power is exactly load / COP.
///
/// 1 MW rated, COP 3, `plr_min` 0.15, ambient floors -10 °C / -5 °C.
pub fn linear_chiller() -> ChillerCurveSet {
    ChillerCurveSet {
        cap_ft: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        eir_ft: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        eir_plr: [0.0, 1.0, 0.0],
        rated_capacity_w: 1_000_000.0,
        rated_cop: 3.0,
        plr_min: 0.15,
        condenser_fan_fraction: 0.0,
        cap_ft_min_temp: -10.0,
        eir_ft_min_temp: -5.0,
        chiller_type: ChillerType::AirCooled,
    }
}

/// Discharge settings with `segments` and the fixture specific heat.
pub fn discharge_settings(segments: usize) -> DischargeSettings {
    DischargeSettings {
        segments,
        cp_loop: CP,
        ..DischargeSettings::default()
    }
}

/// 40 kg/s from 12 °C down to 6.5 °C at 30 °C ambient.
///
/// Modelled load at the setpoint is 919.6 kW, just under the recorded load.
pub fn design_state() -> TimestepState {
    TimestepState {
        mass_flow_kg_s: 40.0,
        load_w: 920_000.0,
        power_w: 920_000.0 / 3.0,
        plr: 0.92,
        evap_inlet_temp_c: 12.0,
        evap_outlet_temp_c: 6.5,
        ambient_temp_c: 30.0,
    }
}

/// A one-chiller input built from `(load_w, plr, evap_inlet_c)` rows.
///
/// Flow is 40 kg/s, the setpoint 6.5 °C, and power load / 3.
pub fn chiller_input(name: &str, curves: ChillerCurveSet, rows: &[(f64, f64, f64)]) -> ChillerInput {
    let mut series = ChillerSeries::default();
    for &(load_w, plr, inlet_c) in rows {
        series.mass_flow_kg_s.push(40.0);
        series.load_w.push(load_w);
        series.power_w.push(load_w / 3.0);
        series.plr.push(plr);
        series.evap_inlet_c.push(inlet_c);
        series.evap_outlet_c.push(6.5);
    }
    ChillerInput {
        name: name.to_string(),
        curves,
        series,
    }
}

/// Constant weather of `n` timesteps.
pub fn flat_weather(n: usize, dry_bulb_c: f64, wet_bulb_c: f64) -> Weather {
    Weather {
        dry_bulb_c: vec![dry_bulb_c; n],
        wet_bulb_c: vec![wet_bulb_c; n],
    }
}

/// Descriptor text for [`linear_chiller`].
pub const LINEAR_DESCRIPTOR: &str = "\
CH-1
3.0,0.15
AirCooled,0.0
1.0,0.0,0.0,0.0,0.0,0.0
-10.0,15.0,-10.0,45.0
1.0,0.0,0.0,0.0,0.0,0.0
-10.0,15.0,-5.0,45.0
0.0,1.0,0.0
";

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

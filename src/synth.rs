//! Deterministic synthetic chiller plant for the `demo` preset.
//!
//! Generates hourly weather and a self-consistent timeseries per chiller:
//! load follows a daily temperature cycle, power comes from the chiller's
//! own curves, and the return temperature matches the load at design flow.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::chiller::{ChillerCurveSet, ChillerType};
use crate::config::DemoConfig;
use crate::curves::{biquad, quad};
use crate::plant::district::{REFERENCE_CAP_FT, REFERENCE_EIR_FT, REFERENCE_EIR_PLR};
use crate::plant::{ChillerInput, ChillerSeries, Weather};

const STEPS_PER_DAY: usize = 24;
/// Design loop temperature difference (K).
const DESIGN_DELTA_T: f64 = 5.6667;

const AIR_COOLED_CAP_FT: [f64; 6] = [1.0, 0.03, 0.0, -0.008, 0.0, 0.0];
const AIR_COOLED_EIR_FT: [f64; 6] = [0.6, -0.01, 0.0, 0.012, 0.0, 0.0];
const AIR_COOLED_EIR_PLR: [f64; 3] = [0.06, 0.3, 0.64];

/// Weather and chillers ready for the orchestrator.
#[derive(Debug, Clone)]
pub struct DemoPlant {
    pub weather: Weather,
    pub chillers: Vec<ChillerInput>,
}

/// Generates a demo plant from `cfg`.
///
/// Identical inputs give identical output.
///
/// # Examples
///
/// ```
/// use ctes_prep::config::DemoConfig;
/// use ctes_prep::synth;
///
/// let plant = synth::generate(&DemoConfig::default(), 4179.6, 6.6667);
/// assert_eq!(plant.weather.len(), 14 * 24);
/// assert_eq!(plant.chillers.len(), 2);
/// ```
pub fn generate(cfg: &DemoConfig, cp_loop: f64, setpoint_c: f64) -> DemoPlant {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let weather = weather(cfg.days * STEPS_PER_DAY, &mut rng);
    let chillers = (0..cfg.chillers)
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(1 + i as u64));
            chiller(i, &weather, cp_loop, setpoint_c, &mut rng)
        })
        .collect();
    DemoPlant { weather, chillers }
}

fn weather(steps: usize, rng: &mut StdRng) -> Weather {
    let mut w = Weather::default();
    for t in 0..steps {
        let hour = (t % STEPS_PER_DAY) as f64;
        // Daily cycle peaking mid-afternoon
        let angle = 2.0 * std::f64::consts::PI * (hour - 9.0) / STEPS_PER_DAY as f64;
        let dry = 26.0 + 7.0 * angle.sin() + gaussian_noise(rng, 0.8);
        let depression = (6.0 + 2.0 * angle.sin() + gaussian_noise(rng, 0.5)).max(0.5);
        w.dry_bulb_c.push(dry);
        w.wet_bulb_c.push(dry - depression);
    }
    w
}

fn curves(i: usize) -> ChillerCurveSet {
    let rated_capacity_w = 1_000_000.0 * (1.0 + 0.5 * i as f64);
    if i % 2 == 0 {
        ChillerCurveSet {
            cap_ft: AIR_COOLED_CAP_FT,
            eir_ft: AIR_COOLED_EIR_FT,
            eir_plr: AIR_COOLED_EIR_PLR,
            rated_capacity_w,
            rated_cop: 3.2,
            plr_min: 0.15,
            condenser_fan_fraction: 0.08,
            cap_ft_min_temp: -10.0,
            eir_ft_min_temp: -10.0,
            chiller_type: ChillerType::AirCooled,
        }
    } else {
        ChillerCurveSet {
            cap_ft: REFERENCE_CAP_FT,
            eir_ft: REFERENCE_EIR_FT,
            eir_plr: REFERENCE_EIR_PLR,
            rated_capacity_w,
            rated_cop: 6.3,
            plr_min: 0.15,
            condenser_fan_fraction: 0.0,
            cap_ft_min_temp: 12.0,
            eir_ft_min_temp: 12.0,
            chiller_type: ChillerType::WaterCooled,
        }
    }
}

fn chiller(
    i: usize,
    weather: &Weather,
    cp_loop: f64,
    setpoint_c: f64,
    rng: &mut StdRng,
) -> ChillerInput {
    let curves = curves(i);
    let mass_flow = curves.rated_capacity_w / (cp_loop * DESIGN_DELTA_T);
    let mut series = ChillerSeries::default();

    for t in 0..weather.len() {
        let ambient = curves.clamp_ambient(weather.ambient_for(curves.chiller_type, t));
        let dry = weather.dry_bulb_c[t];
        let capacity = curves.rated_capacity_w * biquad(&curves.cap_ft, setpoint_c, ambient);

        let target = 0.2 + 0.04 * (dry - 20.0) + gaussian_noise(rng, 0.05);
        let plr = if target < 0.1 { 0.0 } else { target.min(0.95) };
        let load = plr * capacity;

        let power = if load > 0.0 {
            let evaporator = capacity / curves.rated_cop
                * biquad(&curves.eir_ft, setpoint_c, ambient)
                * quad(&curves.eir_plr, plr);
            evaporator * (1.0 + curves.condenser_fan_fraction)
        } else {
            0.0
        };
        // Slightly under the exact return temperature so the modelled load
        // at the setpoint never exceeds the recorded load.
        let inlet = setpoint_c + 0.999 * load / (mass_flow * cp_loop);

        series.mass_flow_kg_s.push(mass_flow);
        series.load_w.push(load);
        series.power_w.push(power);
        series.plr.push(plr);
        series.evap_inlet_c.push(inlet);
        series.evap_outlet_c.push(setpoint_c);
    }

    ChillerInput {
        name: format!("DEMO-{}", i + 1),
        curves,
        series,
    }
}

/// Returns a sample from N(0, std_dev²) using the Box-Muller transform.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

//! Runs discharge and charge linearization over every chiller and timestep.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::chiller::{
    ChargeCurveEvaluator, ChargeResult, ChargeSettings, ChillerType, DischargeCurveBuilder,
    DischargeCurveResult, DischargeSettings,
};
use crate::error::PrepResult;
use crate::plant::series::{ChillerInput, Weather};

/// Settings shared by every chiller in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub discharge: DischargeSettings,
    pub charge: ChargeSettings,
    /// Current PLR below which no turn-down curve is built.
    pub partial_storage_cutoff: f64,
    /// Charge capacity above which a timestep is charge-eligible (W_th).
    pub charge_eligible_w: f64,
    /// Worker threads across chillers; 0 uses the rayon default.
    pub threads: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            discharge: DischargeSettings::default(),
            charge: ChargeSettings::default(),
            partial_storage_cutoff: 0.2,
            charge_eligible_w: 10.0,
            threads: 0,
        }
    }
}

/// Per-timestep results and index sets for one chiller.
///
/// Index sets hold 1-based timestep numbers, as consumed by the solver.
#[derive(Debug, Clone, Serialize)]
pub struct ChillerOutcome {
    pub name: String,
    /// Recorded load per timestep (W_th), the baseline for load shed.
    pub load_w: Vec<f64>,
    /// Recorded power per timestep (W_e), the baseline for charge power.
    pub power_w: Vec<f64>,
    pub discharge: Vec<DischargeCurveResult>,
    pub charge: Vec<ChargeResult>,
    /// Timesteps with any current load.
    pub full_storage_timesteps: Vec<usize>,
    /// Timesteps whose discharge curve has a positive total range.
    pub partial_storage_timesteps: Vec<usize>,
    /// Timesteps with charge capacity above the eligibility floor.
    pub charge_timesteps: Vec<usize>,
    /// Count of timesteps with a negative charge power coefficient.
    pub negative_charge_coefficients: usize,
}

impl ChillerOutcome {
    pub fn timesteps(&self) -> usize {
        self.discharge.len()
    }

    /// Fraction of timesteps with a negative charge coefficient.
    pub fn negative_charge_rate(&self) -> f64 {
        if self.charge.is_empty() {
            0.0
        } else {
            self.negative_charge_coefficients as f64 / self.charge.len() as f64
        }
    }
}

/// Drives the per-timestep state machine for each chiller.
#[derive(Debug, Clone)]
pub struct TimestepOrchestrator {
    settings: OrchestratorSettings,
}

impl TimestepOrchestrator {
    pub fn new(settings: OrchestratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Processes one chiller over all of its timesteps.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PrepError::LengthMismatch`] when the chiller's
    /// arrays disagree with each other or with the weather.
    pub fn run_chiller(
        &self,
        input: &ChillerInput,
        weather: &Weather,
    ) -> PrepResult<ChillerOutcome> {
        input.validate(weather)?;
        let curves = &input.curves;
        let segments = self.settings.discharge.segments;
        let steps = input.series.len();

        info!(
            chiller = %input.name,
            timesteps = steps,
            chiller_type = %curves.chiller_type,
            "building chiller load reduction and charging curves"
        );
        if curves.chiller_type == ChillerType::Unspecified {
            warn!(chiller = %input.name, "chiller type not recognized; assuming air-cooled");
        }

        let discharge = DischargeCurveBuilder::new(curves, &self.settings.discharge);
        let charge = ChargeCurveEvaluator::new(curves, &self.settings.charge);

        let mut outcome = ChillerOutcome {
            name: input.name.clone(),
            load_w: input.series.load_w.clone(),
            power_w: input.series.power_w.clone(),
            discharge: Vec::with_capacity(steps),
            charge: Vec::with_capacity(steps),
            full_storage_timesteps: Vec::new(),
            partial_storage_timesteps: Vec::new(),
            charge_timesteps: Vec::new(),
            negative_charge_coefficients: 0,
        };

        for t in 0..steps {
            let ambient = curves.clamp_ambient(weather.ambient_for(curves.chiller_type, t));
            let state = input.series.state_at(t, ambient);

            let curve = if state.load_w > 0.0 {
                outcome.full_storage_timesteps.push(t + 1);
                if state.plr >= self.settings.partial_storage_cutoff {
                    discharge.build(&state)
                } else {
                    DischargeCurveResult::zeroed(segments)
                }
            } else {
                DischargeCurveResult::zeroed(segments)
            };
            if curve.allows_partial_storage() {
                outcome.partial_storage_timesteps.push(t + 1);
            }
            outcome.discharge.push(curve);

            let charged = charge.evaluate(&state);
            if charged.available_capacity_w > self.settings.charge_eligible_w {
                outcome.charge_timesteps.push(t + 1);
            }
            if charged.is_negative() {
                outcome.negative_charge_coefficients += 1;
            }
            outcome.charge.push(charged);
        }

        if outcome.negative_charge_coefficients > 0 {
            warn!(
                chiller = %input.name,
                count = outcome.negative_charge_coefficients,
                "negative chiller power coefficients for ice charging; verify curves"
            );
            info!(
                "this is often resolved by shorter optimization timesteps, which \
                 avoid the part-load effects carried over from simulation"
            );
        }
        info!(
            chiller = %input.name,
            partial = outcome.partial_storage_timesteps.len(),
            charge = outcome.charge_timesteps.len(),
            "chiller processed"
        );

        Ok(outcome)
    }

    /// Processes all chillers in parallel, keeping input order.
    ///
    /// Each chiller succeeds or fails on its own; the caller decides whether
    /// one failure aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PrepError::ThreadPool`] if the worker pool
    /// cannot be built.
    pub fn run_all(
        &self,
        inputs: &[ChillerInput],
        weather: &Weather,
    ) -> PrepResult<Vec<PrepResult<ChillerOutcome>>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .build()?;
        Ok(pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.run_chiller(input, weather))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chiller::ChillerCurveSet;
    use crate::error::PrepError;
    use crate::plant::series::ChillerSeries;

    fn curves(chiller_type: ChillerType) -> ChillerCurveSet {
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
            chiller_type,
        }
    }

    /// Three timesteps: off, low PLR, and a turn-down-capable operating point.
    fn input() -> ChillerInput {
        ChillerInput {
            name: "CH-1".into(),
            curves: curves(ChillerType::AirCooled),
            series: ChillerSeries {
                mass_flow_kg_s: vec![40.0, 40.0, 40.0],
                load_w: vec![0.0, 100_000.0, 920_000.0],
                power_w: vec![0.0, 40_000.0, 306_700.0],
                plr: vec![0.0, 0.1, 0.92],
                evap_inlet_c: vec![6.5, 7.1, 12.0],
                evap_outlet_c: vec![6.5, 6.5, 6.5],
            },
        }
    }

    fn weather(n: usize) -> Weather {
        Weather {
            dry_bulb_c: vec![30.0; n],
            wet_bulb_c: vec![24.0; n],
        }
    }

    fn orchestrator() -> TimestepOrchestrator {
        let mut settings = OrchestratorSettings::default();
        settings.discharge.cp_loop = 4180.0;
        TimestepOrchestrator::new(settings)
    }

    #[test]
    fn state_machine_paths() {
        let out = orchestrator().run_chiller(&input(), &weather(3)).expect("run");
        assert_eq!(out.timesteps(), 3);
        assert_eq!(out.discharge[0], DischargeCurveResult::zeroed(2));
        assert_eq!(out.discharge[1], DischargeCurveResult::zeroed(2));
        assert!(out.discharge[2].allows_partial_storage());
        assert_eq!(out.full_storage_timesteps, vec![2, 3]);
        assert_eq!(out.partial_storage_timesteps, vec![3]);
        assert_eq!(out.load_w, vec![0.0, 100_000.0, 920_000.0]);
        assert_eq!(out.power_w, vec![0.0, 40_000.0, 306_700.0]);
    }

    #[test]
    fn charge_evaluated_for_every_timestep() {
        let out = orchestrator().run_chiller(&input(), &weather(3)).expect("run");
        assert_eq!(out.charge.len(), 3);
        // Idle chiller at t=0 has its whole charging capacity available
        assert!(out.charge[0].available_capacity_w > 900_000.0);
        assert!(out.charge_timesteps.contains(&1));
    }

    #[test]
    fn weather_length_mismatch_is_fatal() {
        let result = orchestrator().run_chiller(&input(), &weather(2));
        assert!(matches!(result, Err(PrepError::LengthMismatch { .. })));
    }

    #[test]
    fn run_all_keeps_input_order() {
        let mut second = input();
        second.name = "CH-2".into();
        second.curves.chiller_type = ChillerType::WaterCooled;
        let inputs = vec![input(), second];
        let results = orchestrator().run_all(&inputs, &weather(3)).expect("pool");
        let names: Vec<String> = results
            .into_iter()
            .map(|r| r.expect("chiller").name)
            .collect();
        assert_eq!(names, vec!["CH-1".to_string(), "CH-2".to_string()]);
    }

    #[test]
    fn negative_rate_counts() {
        let mut inp = input();
        // Current power far above charging power at light load
        inp.series.power_w[1] = 5_000_000.0;
        let out = orchestrator().run_chiller(&inp, &weather(3)).expect("run");
        assert_eq!(out.negative_charge_coefficients, 1);
        assert!((out.negative_charge_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ambient_below_curve_floor_is_clamped() {
        let mut inp = input();
        inp.curves.cap_ft = [1.0, 0.0, 0.0, 0.01, 0.0, 0.0];
        let cold = Weather {
            dry_bulb_c: vec![-50.0; 3],
            wet_bulb_c: vec![-50.0; 3],
        };
        let floor = Weather {
            dry_bulb_c: vec![-5.0; 3],
            wet_bulb_c: vec![-5.0; 3],
        };
        let a = orchestrator().run_chiller(&inp, &cold).expect("cold");
        let b = orchestrator().run_chiller(&inp, &floor).expect("floor");
        assert_eq!(a.discharge, b.discharge);
        assert_eq!(a.charge, b.charge);
    }
}

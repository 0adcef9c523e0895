//! District cooling plant synthesis from an aggregate load profile.
//!
//! A district loop has no simulated chiller of its own. It is modelled as a
//! single water-cooled centrifugal plant sized to the peak seasonal load,
//! with power derived from fixed reference curves.

use std::ops::Range;

use crate::chiller::{ChillerCurveSet, ChillerType};
use crate::curves::{biquad, quad};
use crate::error::{PrepError, PrepResult};
use crate::plant::series::{ChillerInput, ChillerSeries, Weather};

/// York YK centrifugal capacity curve.
pub const REFERENCE_CAP_FT: [f64; 6] = [
    1.034673E+00,
    -1.091064E-02,
    9.019479E-04,
    9.686229E-03,
    -9.160783E-04,
    2.045641E-03,
];
/// York YK centrifugal EIR curve.
pub const REFERENCE_EIR_FT: [f64; 6] = [
    8.326094E-01,
    -6.056615E-03,
    -3.016626E-04,
    -2.498578E-03,
    4.933363E-04,
    -3.125632E-04,
];
pub const REFERENCE_EIR_PLR: [f64; 3] = [2.735485E-01, 2.163041E-01, 5.099054E-01];

/// Thermal kW per refrigeration ton.
const KW_PER_TON_REFRIGERATION: f64 = 3.5168525;
/// Wet-bulb floor of the reference curves (°C).
const WET_BULB_FLOOR_C: f64 = 15.56;
const CONDENSER_FRACTION: f64 = 0.9;
const PLR_MIN: f64 = 0.13;
/// Design loop temperature difference (K).
const DESIGN_DELTA_T: f64 = 5.6667;
/// Supply setpoint of the district loop (°C).
const LOOP_SETPOINT_C: f64 = 6.6667;

/// Operating parameters for one district loop.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictPlant {
    pub name: String,
    /// Scale applied to the aggregate load inside the season.
    pub load_multiplier: f64,
    /// Plant efficiency in electrical kW per ton of cooling.
    pub kw_per_ton: f64,
    /// Timesteps in which the plant runs; load is zero outside.
    pub season: Range<usize>,
    /// Specific heat of the loop water (J/kg·K).
    pub cp_loop: f64,
}

impl DistrictPlant {
    pub fn rated_cop(&self) -> f64 {
        KW_PER_TON_REFRIGERATION / self.kw_per_ton
    }

    /// Builds a chiller input for this loop from its aggregate load (W_th).
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::LengthMismatch`] when the profile and weather
    /// disagree, and [`PrepError::InvalidInput`] when there is no in-season
    /// load to size the plant from.
    pub fn synthesize(
        &self,
        load_profile_w: &[f64],
        weather: &Weather,
    ) -> PrepResult<ChillerInput> {
        if load_profile_w.len() != weather.len() {
            return Err(PrepError::LengthMismatch {
                entity: self.name.clone(),
                field: "load_profile".into(),
                expected: weather.len(),
                found: load_profile_w.len(),
            });
        }

        let load: Vec<f64> = load_profile_w
            .iter()
            .enumerate()
            .map(|(t, &q)| {
                if self.season.contains(&t) {
                    (q * self.load_multiplier).max(0.0)
                } else {
                    0.0
                }
            })
            .collect();
        let peak_w = load.iter().copied().fold(0.0, f64::max);
        if peak_w <= 0.0 {
            return Err(PrepError::InvalidInput {
                entity: self.name.clone(),
                message: "no positive load inside the operating season".into(),
            });
        }

        let curves = ChillerCurveSet {
            cap_ft: REFERENCE_CAP_FT,
            eir_ft: REFERENCE_EIR_FT,
            eir_plr: REFERENCE_EIR_PLR,
            rated_capacity_w: peak_w,
            rated_cop: self.rated_cop(),
            plr_min: PLR_MIN,
            condenser_fan_fraction: CONDENSER_FRACTION,
            cap_ft_min_temp: WET_BULB_FLOOR_C,
            eir_ft_min_temp: WET_BULB_FLOOR_C,
            chiller_type: ChillerType::WaterCooled,
        };
        let mass_flow = peak_w / self.cp_loop / DESIGN_DELTA_T;

        let mut series = ChillerSeries::default();
        for (t, &q) in load.iter().enumerate() {
            let ambient = curves.clamp_ambient(weather.wet_bulb_c[t]);
            let capacity = peak_w * biquad(&curves.cap_ft, LOOP_SETPOINT_C, ambient);
            let plr = if capacity > 0.0 {
                (q / capacity).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let q = if plr > 0.0 { q } else { 0.0 };
            let evaporator = if q <= 0.0 {
                0.0
            } else if plr >= curves.plr_min {
                capacity / curves.rated_cop
                    * biquad(&curves.eir_ft, LOOP_SETPOINT_C, ambient)
                    * quad(&curves.eir_plr, plr)
            } else {
                // Cycling below minimum part load doubles the energy input.
                2.0 * q / curves.rated_cop
            };

            series.mass_flow_kg_s.push(mass_flow);
            series.load_w.push(q);
            series.power_w.push(evaporator * (1.0 + curves.condenser_fan_fraction));
            series.plr.push(plr);
            series.evap_inlet_c.push(q / self.cp_loop / mass_flow + DESIGN_DELTA_T);
            series.evap_outlet_c.push(LOOP_SETPOINT_C);
        }

        Ok(ChillerInput {
            name: self.name.clone(),
            curves,
            series,
        })
    }
}

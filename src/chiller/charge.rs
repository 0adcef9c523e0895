//! Ice-charging capacity and power penalty at a fixed charging temperature.

use crate::chiller::types::{ChargeResult, ChillerCurveSet, TimestepState};
use crate::curves::{biquad, quad};

/// Charging conditions and materiality thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeSettings {
    /// Evaporator leaving temperature while charging (°C).
    pub temp_charge_c: f64,
    /// Specific heat of the loop fluid (J/kg·K).
    pub cp_loop: f64,
    /// Specific heat of the charging fluid (J/kg·K).
    pub cp_charge: f64,
    /// Add `condenser_penalty_fraction` to the fan fraction while charging.
    pub condenser_penalty: bool,
    /// Extra condenser fraction standing in for pump power.
    pub condenser_penalty_fraction: f64,
    /// Capacity at or below this is treated as unavailable (W_th).
    pub min_capacity_w: f64,
    /// Coefficient reported when capacity is unavailable.
    pub sentinel_coefficient: f64,
}

impl Default for ChargeSettings {
    fn default() -> Self {
        Self {
            temp_charge_c: -3.7,
            cp_loop: 4179.6,
            cp_charge: 3742.0,
            condenser_penalty: true,
            condenser_penalty_fraction: 0.05,
            min_capacity_w: 1000.0,
            sentinel_coefficient: 10.0,
        }
    }
}

/// Evaluates charging performance for one chiller.
#[derive(Debug, Clone, Copy)]
pub struct ChargeCurveEvaluator<'a> {
    curves: &'a ChillerCurveSet,
    settings: &'a ChargeSettings,
}

impl<'a> ChargeCurveEvaluator<'a> {
    pub fn new(curves: &'a ChillerCurveSet, settings: &'a ChargeSettings) -> Self {
        Self { curves, settings }
    }

    /// Capacity left for charging and its marginal power cost.
    ///
    /// Charging runs at full part-load ratio. The capacity needed to keep
    /// serving `state.load_w` is converted to charging-fluid terms through
    /// the specific-heat ratio before it is subtracted.
    pub fn evaluate(&self, state: &TimestepState) -> ChargeResult {
        let s = self.settings;
        let t_chg = s.temp_charge_c;
        let ambient = state.ambient_temp_c;
        let cp_ratio = s.cp_charge / s.cp_loop;

        let capacity_w = self.curves.rated_capacity_w * biquad(&self.curves.cap_ft, t_chg, ambient);
        let available_w = (capacity_w - state.load_w / cp_ratio).max(0.0);

        let eir_ft = biquad(&self.curves.eir_ft, t_chg, ambient);
        let eir_fp = quad(&self.curves.eir_plr, 1.0);
        let mut fan_fraction = self.curves.condenser_fan_fraction;
        if s.condenser_penalty {
            fan_fraction += s.condenser_penalty_fraction;
        }
        let mut charge_power_w = capacity_w / self.curves.rated_cop * eir_ft * eir_fp;
        charge_power_w += fan_fraction * charge_power_w;

        if available_w > s.min_capacity_w {
            ChargeResult {
                available_capacity_w: available_w,
                power_coefficient: (charge_power_w - state.power_w) / available_w,
            }
        } else {
            ChargeResult {
                available_capacity_w: 0.0,
                power_coefficient: s.sentinel_coefficient,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chiller::types::ChillerType;

    fn curves() -> ChillerCurveSet {
        ChillerCurveSet {
            cap_ft: [0.8, 0.0, 0.0, 0.0, 0.0, 0.0],
            eir_ft: [1.2, 0.0, 0.0, 0.0, 0.0, 0.0],
            eir_plr: [0.0, 1.0, 0.0],
            rated_capacity_w: 1_000_000.0,
            rated_cop: 3.0,
            plr_min: 0.15,
            condenser_fan_fraction: 0.1,
            cap_ft_min_temp: -10.0,
            eir_ft_min_temp: -10.0,
            chiller_type: ChillerType::AirCooled,
        }
    }

    fn state(load_w: f64, power_w: f64) -> TimestepState {
        TimestepState {
            mass_flow_kg_s: 40.0,
            load_w,
            power_w,
            plr: load_w / 1_000_000.0,
            evap_inlet_temp_c: 12.0,
            evap_outlet_temp_c: 6.7,
            ambient_temp_c: 25.0,
        }
    }

    fn plain_settings() -> ChargeSettings {
        ChargeSettings {
            cp_loop: 4000.0,
            cp_charge: 3600.0,
            condenser_penalty: false,
            ..ChargeSettings::default()
        }
    }

    #[test]
    fn default_loop_cp_matches_discharge() {
        let discharge = crate::chiller::DischargeSettings::default();
        assert_eq!(ChargeSettings::default().cp_loop, discharge.cp_loop);
        assert_eq!(ChargeSettings::default().cp_loop, 4179.6);
    }

    #[test]
    fn idle_chiller_full_charge_capacity() {
        let c = curves();
        let s = plain_settings();
        let r = ChargeCurveEvaluator::new(&c, &s).evaluate(&state(0.0, 0.0));
        assert!((r.available_capacity_w - 800_000.0).abs() < 1e-6);
        // P = 800_000 / 3 * 1.2 * 1.0 * 1.1 = 352_000
        assert!((r.power_coefficient - 352_000.0 / 800_000.0).abs() < 1e-9);
    }

    #[test]
    fn load_converted_through_cp_ratio() {
        let c = curves();
        let s = plain_settings();
        // ratio 0.9: 360_000 W of loop load consumes 400_000 W of charge capacity
        let r = ChargeCurveEvaluator::new(&c, &s).evaluate(&state(360_000.0, 100_000.0));
        assert!((r.available_capacity_w - 400_000.0).abs() < 1e-6);
        assert!((r.power_coefficient - (352_000.0 - 100_000.0) / 400_000.0).abs() < 1e-9);
    }

    #[test]
    fn condenser_penalty_raises_power() {
        let c = curves();
        let plain = plain_settings();
        let penalized = ChargeSettings {
            condenser_penalty: true,
            ..plain_settings()
        };
        let a = ChargeCurveEvaluator::new(&c, &plain).evaluate(&state(0.0, 0.0));
        let b = ChargeCurveEvaluator::new(&c, &penalized).evaluate(&state(0.0, 0.0));
        // (1.15 / 1.10) of the unpenalized coefficient
        assert!((b.power_coefficient / a.power_coefficient - 1.15 / 1.10).abs() < 1e-9);
    }

    #[test]
    fn immaterial_capacity_uses_sentinel() {
        let c = curves();
        let s = plain_settings();
        // 719_500 / 0.9 = 799_444 W consumed, leaving ~556 W
        let r = ChargeCurveEvaluator::new(&c, &s).evaluate(&state(719_500.0, 250_000.0));
        assert_eq!(r.available_capacity_w, 0.0);
        assert_eq!(r.power_coefficient, 10.0);
    }

    #[test]
    fn overloaded_chiller_has_no_capacity() {
        let c = curves();
        let s = plain_settings();
        let r = ChargeCurveEvaluator::new(&c, &s).evaluate(&state(950_000.0, 330_000.0));
        assert_eq!(r.available_capacity_w, 0.0);
        assert_eq!(r.power_coefficient, 10.0);
    }

    #[test]
    fn high_current_power_gives_negative_coefficient() {
        let c = curves();
        let s = plain_settings();
        let r = ChargeCurveEvaluator::new(&c, &s).evaluate(&state(90_000.0, 400_000.0));
        assert!(r.available_capacity_w > 0.0);
        assert!(r.is_negative());
    }
}

//! Core chiller types: curve sets, per-timestep state, and linearization results.

use std::fmt;

use serde::Serialize;

/// Condenser heat-rejection style, which decides the ambient temperature source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChillerType {
    /// Curves are indexed by outdoor dry-bulb temperature.
    AirCooled,
    /// Curves are indexed by outdoor wet-bulb temperature.
    WaterCooled,
    /// Type missing or not recognized; treated as air-cooled with a warning.
    Unspecified,
}

impl ChillerType {
    /// Parses the chiller type label used by descriptor files.
    ///
    /// Unknown labels map to [`ChillerType::Unspecified`] rather than failing.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctes_prep::chiller::ChillerType;
    ///
    /// assert_eq!(ChillerType::from_label("WaterCooled"), ChillerType::WaterCooled);
    /// assert_eq!(ChillerType::from_label("evap"), ChillerType::Unspecified);
    /// ```
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "AirCooled" => Self::AirCooled,
            "WaterCooled" => Self::WaterCooled,
            _ => Self::Unspecified,
        }
    }
}

impl fmt::Display for ChillerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AirCooled => "AirCooled",
            Self::WaterCooled => "WaterCooled",
            Self::Unspecified => "Unspecified",
        };
        f.write_str(label)
    }
}

/// Static performance description of one chiller or district plant.
///
/// Loaded once and shared read-only across all timesteps.
#[derive(Debug, Clone)]
pub struct ChillerCurveSet {
    /// Capacity multiplier, biquadratic in (evap outlet temp, ambient temp).
    pub cap_ft: [f64; 6],
    /// EIR multiplier, biquadratic in (evap outlet temp, ambient temp).
    pub eir_ft: [f64; 6],
    /// EIR multiplier, quadratic in part-load ratio.
    pub eir_plr: [f64; 3],
    /// Rated thermal capacity (W_th).
    pub rated_capacity_w: f64,
    /// Rated coefficient of performance (W_th / W_e).
    pub rated_cop: f64,
    /// Minimum part-load ratio before the chiller cycles.
    pub plr_min: f64,
    /// Condenser fan power as a fraction of compressor power.
    pub condenser_fan_fraction: f64,
    /// Lowest ambient temperature covered by `cap_ft` (°C).
    pub cap_ft_min_temp: f64,
    /// Lowest ambient temperature covered by `eir_ft` (°C).
    pub eir_ft_min_temp: f64,
    pub chiller_type: ChillerType,
}

impl ChillerCurveSet {
    /// Clamps an ambient temperature to the validity floor of both curves.
    pub fn clamp_ambient(&self, ambient_c: f64) -> f64 {
        ambient_c.max(self.cap_ft_min_temp).max(self.eir_ft_min_temp)
    }
}

/// Operating point of one chiller at one timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepState {
    /// Evaporator mass flow (kg/s).
    pub mass_flow_kg_s: f64,
    /// Current thermal load (W_th).
    pub load_w: f64,
    /// Current electrical power (W_e).
    pub power_w: f64,
    /// Current part-load ratio.
    pub plr: f64,
    /// Evaporator inlet (return) temperature (°C).
    pub evap_inlet_temp_c: f64,
    /// Evaporator outlet temperature, i.e. the loop setpoint (°C).
    pub evap_outlet_temp_c: f64,
    /// Ambient temperature, already clamped to the curve floors (°C).
    pub ambient_temp_c: f64,
}

/// Piecewise-linear power-vs-load-shed approximation for one timestep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DischargeCurveResult {
    /// Marginal power saved per unit load shed (W_e / W_th), one per segment.
    pub slopes: Vec<f64>,
    /// Load-shed width covered by each segment (W_th).
    pub ranges: Vec<f64>,
}

impl DischargeCurveResult {
    /// All-zero result signalling "full storage only" for this timestep.
    pub fn zeroed(segments: usize) -> Self {
        Self {
            slopes: vec![0.0; segments],
            ranges: vec![0.0; segments],
        }
    }

    /// Total load shed available across all segments (W_th).
    pub fn total_range(&self) -> f64 {
        self.ranges.iter().sum()
    }

    /// Whether the chiller can be turned down (partial storage) this timestep.
    pub fn allows_partial_storage(&self) -> bool {
        self.total_range() > 0.0
    }

    pub fn segments(&self) -> usize {
        self.slopes.len()
    }
}

/// Ice-charging capacity and marginal power penalty for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeResult {
    /// Excess capacity available for charging (W_th).
    pub available_capacity_w: f64,
    /// Marginal power per unit charge capacity (W_e / W_th), or the sentinel.
    pub power_coefficient: f64,
}

impl ChargeResult {
    /// Whether the coefficient indicates charging would lower power.
    pub fn is_negative(&self) -> bool {
        self.power_coefficient < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_curves() -> ChillerCurveSet {
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

    #[test]
    fn clamp_uses_highest_floor() {
        let c = flat_curves();
        assert_eq!(c.clamp_ambient(-50.0), -5.0);
        assert_eq!(c.clamp_ambient(-7.0), -5.0);
        assert_eq!(c.clamp_ambient(22.5), 22.5);
    }

    #[test]
    fn zeroed_result_shape() {
        let r = DischargeCurveResult::zeroed(3);
        assert_eq!(r.segments(), 3);
        assert_eq!(r.ranges.len(), 3);
        assert!(!r.allows_partial_storage());
    }

    #[test]
    fn chiller_type_labels() {
        assert_eq!(ChillerType::from_label(" AirCooled\n"), ChillerType::AirCooled);
        assert_eq!(ChillerType::from_label(""), ChillerType::Unspecified);
        assert_eq!(ChillerType::WaterCooled.to_string(), "WaterCooled");
    }
}

//! Piecewise-linear power-vs-load-shed curves for discharge (partial storage).
//!
//! For one timestep the builder raises the evaporator outlet temperature from
//! the loop setpoint toward the evaporator inlet temperature, tracking how far
//! it can go before the part-load ratio falls under the chiller minimum. Over
//! that feasible band it evaluates chiller power, expresses it as power saved
//! versus thermal load shed, and fits `segments` least-squares lines.

use crate::chiller::sampling::{least_squares_slope, linspace};
use crate::chiller::types::{ChillerCurveSet, DischargeCurveResult, TimestepState};
use crate::curves::{biquad, quad};

/// Resolution and segmentation settings for [`DischargeCurveBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeSettings {
    /// Number of linear segments per timestep.
    pub segments: usize,
    /// Samples in the coarse threshold search (setpoint to inlet temperature).
    pub coarse_samples: usize,
    /// Samples in the refined band (setpoint to turn-down limit).
    pub refined_samples: usize,
    /// Fraction of `coarse_samples` that must stay above `plr_min` for a fit.
    pub turn_down_buffer_fraction: f64,
    /// Specific heat of the loop fluid (J/kg·K).
    pub cp_loop: f64,
}

impl Default for DischargeSettings {
    fn default() -> Self {
        Self {
            segments: 2,
            coarse_samples: 50,
            refined_samples: 30,
            turn_down_buffer_fraction: 0.1,
            cp_loop: 4179.6,
        }
    }
}

impl DischargeSettings {
    /// Absolute sample count behind the turn-down buffer (5 of 50 by default).
    pub fn buffer_samples(&self) -> usize {
        (self.turn_down_buffer_fraction * self.coarse_samples as f64).round() as usize
    }
}

/// Chiller state at one candidate evaporator outlet temperature.
#[derive(Debug, Clone, Copy)]
struct OperatingPoint {
    load_w: f64,
    capacity_w: f64,
    plr: f64,
}

/// Builds a [`DischargeCurveResult`] for one chiller.
///
/// The builder borrows the chiller's curve set and is reused across all of
/// its timesteps.
#[derive(Debug, Clone, Copy)]
pub struct DischargeCurveBuilder<'a> {
    curves: &'a ChillerCurveSet,
    settings: &'a DischargeSettings,
}

impl<'a> DischargeCurveBuilder<'a> {
    pub fn new(curves: &'a ChillerCurveSet, settings: &'a DischargeSettings) -> Self {
        Self { curves, settings }
    }

    /// Linearizes power saved against load shed for one timestep.
    ///
    /// Returns the all-zero result when the chiller reaches `plr_min` within
    /// the turn-down buffer, or when the modelled load anywhere in the band
    /// exceeds the observed load (`state.load_w`).
    pub fn build(&self, state: &TimestepState) -> DischargeCurveResult {
        let segments = self.settings.segments;
        let setpoint = state.evap_outlet_temp_c;
        let inlet = state.evap_inlet_temp_c;

        if segments == 0 || self.settings.refined_samples < 2 || inlet <= setpoint {
            return DischargeCurveResult::zeroed(segments);
        }

        let coarse = linspace(setpoint, inlet, self.settings.coarse_samples);
        let Some(outlet_max) = self.turn_down_limit(&coarse, state) else {
            return DischargeCurveResult::zeroed(segments);
        };

        let outlet = linspace(setpoint, outlet_max, self.settings.refined_samples);
        let mut points = Vec::with_capacity(outlet.len());
        for &t_o in &outlet {
            let point = self.operating_point(t_o, state);
            if point.load_w > state.load_w {
                return DischargeCurveResult::zeroed(segments);
            }
            points.push(point);
        }

        let power: Vec<f64> = outlet
            .iter()
            .zip(&points)
            .map(|(&t_o, p)| self.total_power_w(t_o, p, state.ambient_temp_c))
            .collect();
        let baseline = power[0];
        let power_saved: Vec<f64> = power.iter().map(|p| baseline - p).collect();

        segment_fit(&load_shed(&points), &power_saved, segments)
    }

    /// Warmest coarse outlet temperature that still respects `plr_min`.
    ///
    /// `None` when the threshold is never crossed or is crossed inside the
    /// turn-down buffer.
    fn turn_down_limit(&self, coarse: &[f64], state: &TimestepState) -> Option<f64> {
        let crossing = coarse
            .iter()
            .position(|&t_o| self.operating_point(t_o, state).plr < self.curves.plr_min)?;
        let last_feasible = crossing.checked_sub(1)?;
        if last_feasible < self.settings.buffer_samples() {
            return None;
        }
        Some(coarse[last_feasible])
    }

    fn operating_point(&self, outlet_c: f64, state: &TimestepState) -> OperatingPoint {
        let cap_ft = biquad(&self.curves.cap_ft, outlet_c, state.ambient_temp_c);
        let capacity_w = self.curves.rated_capacity_w * cap_ft;
        let load_w =
            state.mass_flow_kg_s * self.settings.cp_loop * (state.evap_inlet_temp_c - outlet_c);
        // No capacity means the chiller cannot run at this point at all.
        let plr = if capacity_w > 0.0 { load_w / capacity_w } else { 0.0 };
        OperatingPoint {
            load_w,
            capacity_w,
            plr,
        }
    }

    fn total_power_w(&self, outlet_c: f64, point: &OperatingPoint, ambient_c: f64) -> f64 {
        let eir_ft = biquad(&self.curves.eir_ft, outlet_c, ambient_c);
        let eir_fp = quad(&self.curves.eir_plr, point.plr);
        let evaporator = point.capacity_w / self.curves.rated_cop * eir_ft * eir_fp;
        let condenser = evaporator * self.curves.condenser_fan_fraction;
        evaporator + condenser
    }
}

/// Reversed load series offset to its minimum.
///
/// On a uniform outlet grid this equals the shed reached at each sample
/// index, and it is non-decreasing whenever load falls as the outlet warms.
fn load_shed(points: &[OperatingPoint]) -> Vec<f64> {
    let floor = points.last().map_or(0.0, |p| p.load_w);
    points.iter().rev().map(|p| p.load_w - floor).collect()
}

/// Splits the aligned series into `segments` equal-count chunks and fits each.
///
/// Chunk `k` is regressed over samples `k*size ..= (k+1)*size`, so
/// consecutive fits share one sample. Its range stops one sample short, at
/// `(k+1)*size - 1`, so the shared sample is never counted twice. Samples
/// beyond `segments * size` are not covered.
fn segment_fit(shed: &[f64], power_saved: &[f64], segments: usize) -> DischargeCurveResult {
    let n = shed.len().min(power_saved.len());
    let size = n / segments.max(1);
    if size == 0 {
        return DischargeCurveResult::zeroed(segments);
    }

    let mut slopes = Vec::with_capacity(segments);
    let mut ranges = Vec::with_capacity(segments);
    for k in 0..segments {
        let start = k * size;
        let end = ((k + 1) * size).min(n - 1);
        slopes.push(least_squares_slope(
            &shed[start..=end],
            &power_saved[start..=end],
        ));
        ranges.push(shed[(k + 1) * size - 1] - shed[start]);
    }

    DischargeCurveResult { slopes, ranges }
}

//! Post-hoc summary statistics for processed chillers.

use std::fmt;

use serde::Serialize;

use crate::plant::ChillerOutcome;

/// Aggregate statistics derived from one chiller's outcome.
///
/// Computed post-hoc from the per-timestep arrays so the summary always
/// agrees with the written solver files.
#[derive(Debug, Clone, Serialize)]
pub struct ChillerSummary {
    /// Solver file index (1-based).
    pub index: usize,
    pub name: String,
    pub timesteps: usize,
    /// Timesteps with any load.
    pub full_storage_count: usize,
    /// Timesteps with a usable turn-down curve.
    pub partial_storage_count: usize,
    /// Timesteps with usable charge capacity.
    pub charge_count: usize,
    pub negative_charge_count: usize,
    /// Share of timesteps with a negative charge coefficient (0.0-1.0).
    pub negative_charge_rate: f64,
    /// Largest total load shed at any timestep (kW_th).
    pub max_load_shed_kw: f64,
    /// Mean first-segment slope over partial-storage timesteps (kW_e/kW_th).
    pub mean_first_slope: f64,
    /// Mean charge capacity over charge timesteps (kW_th).
    pub mean_charge_capacity_kw: f64,
    /// Mean charge power coefficient over charge timesteps (kW_e/kW_th).
    pub mean_charge_coefficient: f64,
}

impl ChillerSummary {
    /// Computes the summary of `outcome`, written under solver index `index`.
    pub fn from_outcome(index: usize, outcome: &ChillerOutcome) -> Self {
        let max_load_shed_w = outcome
            .discharge
            .iter()
            .map(|d| d.total_range())
            .fold(0.0, f64::max);

        let partial: Vec<f64> = outcome
            .partial_storage_timesteps
            .iter()
            .filter_map(|&t| outcome.discharge.get(t - 1))
            .filter_map(|d| d.slopes.first().copied())
            .collect();

        let charged: Vec<_> = outcome
            .charge_timesteps
            .iter()
            .filter_map(|&t| outcome.charge.get(t - 1))
            .collect();
        let capacities: Vec<f64> = charged.iter().map(|c| c.available_capacity_w).collect();
        let coefficients: Vec<f64> = charged.iter().map(|c| c.power_coefficient).collect();

        Self {
            index,
            name: outcome.name.clone(),
            timesteps: outcome.timesteps(),
            full_storage_count: outcome.full_storage_timesteps.len(),
            partial_storage_count: outcome.partial_storage_timesteps.len(),
            charge_count: outcome.charge_timesteps.len(),
            negative_charge_count: outcome.negative_charge_coefficients,
            negative_charge_rate: outcome.negative_charge_rate(),
            max_load_shed_kw: max_load_shed_w / 1000.0,
            mean_first_slope: mean(&partial),
            mean_charge_capacity_kw: mean(&capacities) / 1000.0,
            mean_charge_coefficient: mean(&coefficients),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl fmt::Display for ChillerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Chiller {} ({}) ---", self.index, self.name)?;
        writeln!(f, "Timesteps:             {}", self.timesteps)?;
        writeln!(
            f,
            "Storage timesteps:     {} full, {} partial, {} charge",
            self.full_storage_count, self.partial_storage_count, self.charge_count
        )?;
        writeln!(f, "Max load shed:         {:.2} kW", self.max_load_shed_kw)?;
        writeln!(f, "Mean first slope:      {:.4} kW/kW", self.mean_first_slope)?;
        writeln!(
            f,
            "Mean charge capacity:  {:.2} kW ({:.4} kW/kW)",
            self.mean_charge_capacity_kw, self.mean_charge_coefficient
        )?;
        write!(
            f,
            "Negative charge coeff: {} ({:.1}%)",
            self.negative_charge_count,
            100.0 * self.negative_charge_rate
        )
    }
}

/// Contents of `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub segments: usize,
    pub chillers: Vec<ChillerSummary>,
}

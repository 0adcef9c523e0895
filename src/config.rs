//! TOML-based run configuration and preset definitions.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chiller::{ChargeSettings, DischargeSettings};
use crate::error::PrepError;
use crate::plant::{DistrictPlant, OrchestratorSettings};

/// Top-level run configuration parsed from TOML.
///
/// All sections have defaults matching the baseline run. Load from TOML with
/// [`PrepConfig::from_toml_file`] or use [`PrepConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepConfig {
    /// Segmentation and worker settings.
    #[serde(default)]
    pub run: RunConfig,
    /// Turn-down (partial storage) sampling.
    #[serde(default)]
    pub discharge: DischargeConfig,
    /// Ice-charging conditions.
    #[serde(default)]
    pub charge: ChargeConfig,
    /// Input files for chillers, district loops, and weather.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Synthetic inputs used instead of files.
    #[serde(default)]
    pub demo: Option<DemoConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Linear segments per timestep (must be >= 1).
    pub segments: usize,
    /// Current PLR below which no turn-down curve is built (0.0-1.0).
    pub partial_storage_cutoff: f64,
    /// Worker threads across chillers; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            segments: 2,
            partial_storage_cutoff: 0.2,
            threads: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DischargeConfig {
    /// Samples between setpoint and inlet when locating the PLR floor.
    pub coarse_samples: usize,
    /// Samples in the fitted band.
    pub refined_samples: usize,
    /// Share of coarse samples that must stay above the PLR floor.
    pub turn_down_buffer_fraction: f64,
    /// Loop setpoint for timeseries without an evaporator outlet column (°C).
    pub default_loop_setpoint_c: f64,
}

impl Default for DischargeConfig {
    fn default() -> Self {
        Self {
            coarse_samples: 50,
            refined_samples: 30,
            turn_down_buffer_fraction: 0.1,
            default_loop_setpoint_c: 6.6667,
        }
    }
}

/// Loop fluid, which fixes the loop and charging specific heats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fluid {
    /// Plain water loop.
    #[default]
    Water,
    GlycolEth30,
    GlycolEth40,
}

impl Fluid {
    /// `(cp_loop, cp_charge)` in J/kg·K.
    pub fn specific_heats(self) -> (f64, f64) {
        match self {
            Self::Water => (4179.6, 3742.0),
            Self::GlycolEth30 => (3778.0, 3753.0),
            Self::GlycolEth40 => (3612.0, 3582.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChargeConfig {
    /// Evaporator leaving temperature while charging (°C).
    pub temp_charge_c: f64,
    pub fluid: Fluid,
    /// Overrides the fluid's loop specific heat.
    pub cp_loop: Option<f64>,
    /// Overrides the fluid's charging specific heat.
    pub cp_charge: Option<f64>,
    /// Charge pump power as extra condenser fraction.
    pub condenser_penalty: bool,
    pub condenser_penalty_fraction: f64,
    /// Capacity at or below this is unavailable (W_th).
    pub min_capacity_w: f64,
    /// Power coefficient reported when capacity is unavailable.
    pub sentinel_coefficient: f64,
    /// Capacity above which a timestep enters the charge set (W_th).
    pub eligible_capacity_w: f64,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            temp_charge_c: -3.7,
            fluid: Fluid::Water,
            cp_loop: None,
            cp_charge: None,
            condenser_penalty: true,
            condenser_penalty_fraction: 0.05,
            min_capacity_w: 1000.0,
            sentinel_coefficient: 10.0,
            eligible_capacity_w: 10.0,
        }
    }
}

impl ChargeConfig {
    /// `(cp_loop, cp_charge)` after overrides.
    pub fn specific_heats(&self) -> (f64, f64) {
        let (loop_cp, charge_cp) = self.fluid.specific_heats();
        (
            self.cp_loop.unwrap_or(loop_cp),
            self.cp_charge.unwrap_or(charge_cp),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// CSV with `dry_bulb_c` and `wet_bulb_c` columns, one row per timestep.
    pub weather: Option<PathBuf>,
    pub chillers: Vec<ChillerEntry>,
    pub districts: Vec<DistrictEntry>,
}

/// One simulated chiller: curve descriptor plus exported timeseries.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChillerEntry {
    pub name: String,
    pub descriptor: PathBuf,
    pub timeseries: PathBuf,
    /// Rated capacity (W_th); inferred from the timeseries when absent.
    #[serde(default)]
    pub rated_capacity_w: Option<f64>,
}

/// One district loop driven by an aggregate load profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistrictEntry {
    pub name: String,
    /// Single-column CSV of loop load (W_th), no header.
    pub load_profile: PathBuf,
    #[serde(default = "default_load_multiplier")]
    pub load_multiplier: f64,
    #[serde(default = "default_kw_per_ton")]
    pub kw_per_ton: f64,
    /// First timestep of the cooling season (inclusive).
    #[serde(default)]
    pub season_start: usize,
    /// Last timestep of the cooling season (exclusive).
    #[serde(default = "default_season_end")]
    pub season_end: usize,
}

fn default_load_multiplier() -> f64 {
    1.3
}

fn default_kw_per_ton() -> f64 {
    0.51
}

fn default_season_end() -> usize {
    8760
}

impl DistrictEntry {
    pub fn plant(&self, cp_loop: f64) -> DistrictPlant {
        DistrictPlant {
            name: self.name.clone(),
            load_multiplier: self.load_multiplier,
            kw_per_ton: self.kw_per_ton,
            season: self.season_start..self.season_end,
            cp_loop,
        }
    }
}

/// Parameters of the synthetic chiller plant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Days of hourly data to generate (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
    /// Number of synthetic chillers (must be > 0).
    pub chillers: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            days: 14,
            seed: 42,
            chillers: 2,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"run.segments"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl From<ConfigError> for PrepError {
    fn from(e: ConfigError) -> Self {
        PrepError::Config(e.to_string())
    }
}

impl PrepConfig {
    /// Returns the baseline configuration: default settings and no inputs.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the demo preset: default settings over a synthetic plant.
    pub fn demo() -> Self {
        Self {
            demo: Some(DemoConfig::default()),
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "demo"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "demo" => Ok(Self::demo()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// Relative input paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let Some(dir) = path.parent() {
            cfg.resolve_paths(dir);
        }
        Ok(cfg)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Joins every relative input path onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(weather) = self.inputs.weather.as_mut() {
            join(weather);
        }
        for c in &mut self.inputs.chillers {
            join(&mut c.descriptor);
            join(&mut c.timeseries);
        }
        for d in &mut self.inputs.districts {
            join(&mut d.load_profile);
        }
    }

    /// Settings consumed by [`crate::plant::TimestepOrchestrator`].
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        let (cp_loop, cp_charge) = self.charge.specific_heats();
        let d = &self.discharge;
        let c = &self.charge;
        OrchestratorSettings {
            discharge: DischargeSettings {
                segments: self.run.segments,
                coarse_samples: d.coarse_samples,
                refined_samples: d.refined_samples,
                turn_down_buffer_fraction: d.turn_down_buffer_fraction,
                cp_loop,
            },
            charge: ChargeSettings {
                temp_charge_c: c.temp_charge_c,
                cp_loop,
                cp_charge,
                condenser_penalty: c.condenser_penalty,
                condenser_penalty_fraction: c.condenser_penalty_fraction,
                min_capacity_w: c.min_capacity_w,
                sentinel_coefficient: c.sentinel_coefficient,
            },
            partial_storage_cutoff: self.run.partial_storage_cutoff,
            charge_eligible_w: c.eligible_capacity_w,
            threads: self.run.threads,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigError {
                field: field.into(),
                message,
            });
        };

        let r = &self.run;
        if r.segments == 0 {
            push("run.segments", "must be >= 1".into());
        }
        if !(0.0..=1.0).contains(&r.partial_storage_cutoff) {
            push("run.partial_storage_cutoff", "must be in [0.0, 1.0]".into());
        }

        let d = &self.discharge;
        if d.coarse_samples < 2 {
            push("discharge.coarse_samples", "must be >= 2".into());
        }
        if d.refined_samples < 2 * r.segments {
            push(
                "discharge.refined_samples",
                format!("must be >= 2 * run.segments ({})", 2 * r.segments),
            );
        }
        if !(d.turn_down_buffer_fraction > 0.0 && d.turn_down_buffer_fraction < 1.0) {
            push(
                "discharge.turn_down_buffer_fraction",
                "must be in (0.0, 1.0)".into(),
            );
        }

        let c = &self.charge;
        let (cp_loop, cp_charge) = c.specific_heats();
        if cp_loop <= 0.0 {
            push("charge.cp_loop", "must be > 0".into());
        }
        if cp_charge <= 0.0 {
            push("charge.cp_charge", "must be > 0".into());
        }
        if !(0.0..=1.0).contains(&c.condenser_penalty_fraction) {
            push(
                "charge.condenser_penalty_fraction",
                "must be in [0.0, 1.0]".into(),
            );
        }
        if c.min_capacity_w < 0.0 {
            push("charge.min_capacity_w", "must be >= 0".into());
        }
        if c.eligible_capacity_w < 0.0 {
            push("charge.eligible_capacity_w", "must be >= 0".into());
        }

        let inputs = &self.inputs;
        let has_entries = !inputs.chillers.is_empty() || !inputs.districts.is_empty();
        if has_entries && inputs.weather.is_none() {
            push(
                "inputs.weather",
                "required when chillers or districts are listed".into(),
            );
        }
        let mut names = HashSet::new();
        let all_names = inputs
            .chillers
            .iter()
            .map(|c| &c.name)
            .chain(inputs.districts.iter().map(|d| &d.name));
        for name in all_names {
            if name.trim().is_empty() {
                push("inputs.name", "must not be empty".into());
            } else if !names.insert(name) {
                push("inputs.name", format!("duplicate name \"{name}\""));
            }
        }
        for (i, ch) in inputs.chillers.iter().enumerate() {
            if ch.rated_capacity_w.is_some_and(|q| q <= 0.0) {
                push(
                    &format!("inputs.chillers[{i}].rated_capacity_w"),
                    "must be > 0".into(),
                );
            }
        }
        for (i, dl) in inputs.districts.iter().enumerate() {
            if dl.season_start >= dl.season_end {
                push(
                    &format!("inputs.districts[{i}].season_start"),
                    "must be < season_end".into(),
                );
            }
            if dl.load_multiplier <= 0.0 {
                push(
                    &format!("inputs.districts[{i}].load_multiplier"),
                    "must be > 0".into(),
                );
            }
            if dl.kw_per_ton <= 0.0 {
                push(
                    &format!("inputs.districts[{i}].kw_per_ton"),
                    "must be > 0".into(),
                );
            }
        }

        if let Some(demo) = &self.demo {
            if demo.days == 0 {
                push("demo.days", "must be > 0".into());
            }
            if demo.chillers == 0 {
                push("demo.chillers", "must be > 0".into());
            }
        }

        errors
    }
}

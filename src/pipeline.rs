//! End-to-end run: load inputs described by a config, process, write outputs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{ChillerEntry, PrepConfig};
use crate::error::{PrepError, PrepResult};
use crate::io::descriptor::read_descriptor;
use crate::io::export::{write_solver_files, write_summary};
use crate::io::timeseries::{read_load_profile, read_series, read_weather};
use crate::plant::series::infer_rated_capacity;
use crate::plant::{ChillerInput, ChillerOutcome, ChillerSeries, TimestepOrchestrator, Weather};
use crate::report::{ChillerSummary, RunSummary};
use crate::synth;

/// Inputs for one run, in solver index order.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub weather: Weather,
    pub chillers: Vec<ChillerInput>,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub outcomes: Vec<ChillerOutcome>,
    pub summary: RunSummary,
    /// Every file written, summary last.
    pub files: Vec<PathBuf>,
}

/// Validates `cfg` and converts the error list into one error.
///
/// # Errors
///
/// Returns [`PrepError::Config`] listing every failed constraint.
pub fn check_config(cfg: &PrepConfig) -> PrepResult<()> {
    let errors = cfg.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(PrepError::Config(joined))
}

/// Loads weather and all chillers named by `cfg`.
///
/// Simulated chillers come first, then district loops. The demo section,
/// when present, replaces file inputs entirely.
///
/// # Errors
///
/// Returns the first read, parse, or consistency error.
pub fn load_inputs(cfg: &PrepConfig) -> PrepResult<LoadedInputs> {
    let (cp_loop, _) = cfg.charge.specific_heats();
    let setpoint = cfg.discharge.default_loop_setpoint_c;

    if let Some(demo) = &cfg.demo {
        info!(
            days = demo.days,
            chillers = demo.chillers,
            seed = demo.seed,
            "generating synthetic inputs"
        );
        let plant = synth::generate(demo, cp_loop, setpoint);
        return Ok(LoadedInputs {
            weather: plant.weather,
            chillers: plant.chillers,
        });
    }

    let inputs = &cfg.inputs;
    let Some(weather_path) = inputs.weather.as_deref() else {
        return Err(PrepError::Config(
            "no chillers, districts, or demo inputs configured".into(),
        ));
    };
    let weather = read_weather(weather_path)?;
    weather.validate()?;
    info!(path = %weather_path.display(), timesteps = weather.len(), "loaded weather");

    let mut chillers = Vec::with_capacity(inputs.chillers.len() + inputs.districts.len());
    for entry in &inputs.chillers {
        chillers.push(load_chiller(entry, setpoint, cfg.charge.temp_charge_c)?);
    }
    for entry in &inputs.districts {
        let profile = read_load_profile(&entry.load_profile)?;
        let district = entry.plant(cp_loop).synthesize(&profile, &weather)?;
        info!(
            district = %entry.name,
            capacity_kw = district.curves.rated_capacity_w / 1000.0,
            "synthesized district plant"
        );
        chillers.push(district);
    }
    if chillers.is_empty() {
        return Err(PrepError::Config(
            "no chillers, districts, or demo inputs configured".into(),
        ));
    }

    Ok(LoadedInputs { weather, chillers })
}

fn load_chiller(
    entry: &ChillerEntry,
    setpoint_c: f64,
    temp_charge_c: f64,
) -> PrepResult<ChillerInput> {
    let descriptor = read_descriptor(&entry.descriptor)?;
    for w in descriptor.domain_warnings(temp_charge_c) {
        warn!(chiller = %entry.name, "{w}");
    }

    let records = read_series(&entry.timeseries)?;
    let rated_capacity_w = match entry.rated_capacity_w {
        Some(q) => q,
        None => infer_rated_capacity(&records).ok_or_else(|| PrepError::InvalidInput {
            entity: entry.name.clone(),
            message: "rated capacity not configured and the timeseries has no load".into(),
        })?,
    };
    info!(
        chiller = %entry.name,
        capacity_kw = rated_capacity_w / 1000.0,
        timesteps = records.len(),
        "loaded chiller"
    );

    Ok(ChillerInput {
        name: entry.name.clone(),
        curves: descriptor.curve_set(rated_capacity_w),
        series: ChillerSeries::from_records(&records, rated_capacity_w, setpoint_c),
    })
}

/// Processes loaded inputs and writes solver files plus `summary.json` to `out_dir`.
///
/// Any chiller failure aborts the run before files are written.
///
/// # Errors
///
/// Returns the first chiller error, or any error creating output files.
pub fn process(
    cfg: &PrepConfig,
    inputs: &LoadedInputs,
    out_dir: &Path,
) -> PrepResult<RunOutput> {
    let orchestrator = TimestepOrchestrator::new(cfg.orchestrator_settings());
    let outcomes = orchestrator
        .run_all(&inputs.chillers, &inputs.weather)?
        .into_iter()
        .collect::<PrepResult<Vec<_>>>()?;

    fs::create_dir_all(out_dir)?;
    let mut files = Vec::new();
    let mut summaries = Vec::with_capacity(outcomes.len());
    for (i, outcome) in outcomes.iter().enumerate() {
        let index = i + 1;
        files.extend(write_solver_files(out_dir, index, outcome)?);
        summaries.push(ChillerSummary::from_outcome(index, outcome));
    }
    let summary = RunSummary {
        segments: cfg.run.segments,
        chillers: summaries,
    };
    files.push(write_summary(out_dir, &summary)?);

    Ok(RunOutput {
        outcomes,
        summary,
        files,
    })
}

/// Validates, loads, processes, and writes one run.
///
/// # Errors
///
/// Returns configuration, input, processing, or output errors.
pub fn run(cfg: &PrepConfig, out_dir: &Path) -> PrepResult<RunOutput> {
    check_config(cfg)?;
    let inputs = load_inputs(cfg)?;
    info!(
        chillers = inputs.chillers.len(),
        timesteps = inputs.weather.len(),
        segments = cfg.run.segments,
        "processing plant"
    );
    process(cfg, &inputs, out_dir)
}

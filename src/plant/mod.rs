//! Plant-level processing: timeseries, district loops, and the orchestrator.

pub mod district;
pub mod orchestrator;
pub mod series;

pub use district::DistrictPlant;
pub use orchestrator::{ChillerOutcome, OrchestratorSettings, TimestepOrchestrator};
pub use series::{ChillerInput, ChillerSeries, SeriesRecord, Weather};

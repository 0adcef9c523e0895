//! File formats: curve descriptors, timeseries CSVs, and solver output.

pub mod descriptor;
pub mod export;
pub mod timeseries;

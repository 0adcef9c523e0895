//! Chiller load-shed and ice-charging curve preprocessing for thermal
//! storage dispatch.

pub mod chiller;
pub mod cli;
pub mod config;
pub mod curves;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod plant;
pub mod report;
pub mod synth;

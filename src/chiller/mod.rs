//! Per-chiller curve linearization for discharge and charging.

pub mod charge;
pub mod discharge;
pub mod sampling;
pub mod types;

pub use charge::{ChargeCurveEvaluator, ChargeSettings};
pub use discharge::{DischargeCurveBuilder, DischargeSettings};
pub use types::{ChargeResult, ChillerCurveSet, ChillerType, DischargeCurveResult, TimestepState};

//! Per-chiller timeseries and weather arrays.
//!
//! Optional columns are resolved here, once, when the series is built, so the
//! orchestrator only ever sees complete arrays of equal length.

use serde::Deserialize;

use crate::chiller::types::{ChillerCurveSet, ChillerType, TimestepState};
use crate::error::{PrepError, PrepResult};

/// One timestep row as exported by the building simulation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SeriesRecord {
    pub mass_flow_kg_s: f64,
    pub load_w: f64,
    pub power_w: f64,
    /// Part-load ratio; derived from load and rated capacity when absent.
    #[serde(default)]
    pub plr: Option<f64>,
    pub evap_inlet_c: f64,
    /// Evaporator outlet (loop setpoint); the default setpoint when absent.
    #[serde(default)]
    pub evap_outlet_c: Option<f64>,
}

/// Complete per-timestep arrays for one chiller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChillerSeries {
    pub mass_flow_kg_s: Vec<f64>,
    pub load_w: Vec<f64>,
    pub power_w: Vec<f64>,
    pub plr: Vec<f64>,
    pub evap_inlet_c: Vec<f64>,
    pub evap_outlet_c: Vec<f64>,
}

impl ChillerSeries {
    /// Builds complete arrays from records, filling optional columns.
    pub fn from_records(
        records: &[SeriesRecord],
        rated_capacity_w: f64,
        default_setpoint_c: f64,
    ) -> Self {
        let mut series = Self::default();
        for r in records {
            series.mass_flow_kg_s.push(r.mass_flow_kg_s);
            series.load_w.push(r.load_w);
            series.power_w.push(r.power_w);
            series.plr.push(r.plr.unwrap_or_else(|| {
                if rated_capacity_w > 0.0 {
                    r.load_w / rated_capacity_w
                } else {
                    0.0
                }
            }));
            series.evap_inlet_c.push(r.evap_inlet_c);
            series
                .evap_outlet_c
                .push(r.evap_outlet_c.unwrap_or(default_setpoint_c));
        }
        series
    }

    pub fn len(&self) -> usize {
        self.load_w.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_w.is_empty()
    }

    /// Checks that every array has the length of `load_w`.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::LengthMismatch`] naming the first short or long field.
    pub fn validate(&self, entity: &str) -> PrepResult<()> {
        let expected = self.len();
        let fields: [(&str, usize); 5] = [
            ("mass_flow_kg_s", self.mass_flow_kg_s.len()),
            ("power_w", self.power_w.len()),
            ("plr", self.plr.len()),
            ("evap_inlet_c", self.evap_inlet_c.len()),
            ("evap_outlet_c", self.evap_outlet_c.len()),
        ];
        check_lengths(entity, expected, &fields)
    }

    /// Operating point at timestep `t` with an already clamped ambient.
    pub fn state_at(&self, t: usize, ambient_temp_c: f64) -> TimestepState {
        TimestepState {
            mass_flow_kg_s: self.mass_flow_kg_s[t],
            load_w: self.load_w[t],
            power_w: self.power_w[t],
            plr: self.plr[t],
            evap_inlet_temp_c: self.evap_inlet_c[t],
            evap_outlet_temp_c: self.evap_outlet_c[t],
            ambient_temp_c,
        }
    }
}

/// Rated capacity inferred from a timeseries.
///
/// Peak load divided by the part-load ratio at that timestep, or the peak
/// load alone when the PLR column is missing or zero there. `None` for an
/// empty or load-free series.
pub fn infer_rated_capacity(records: &[SeriesRecord]) -> Option<f64> {
    let peak = records
        .iter()
        .filter(|r| r.load_w > 0.0)
        .max_by(|a, b| a.load_w.total_cmp(&b.load_w))?;
    match peak.plr {
        Some(plr) if plr > 0.0 => Some(peak.load_w / plr),
        _ => Some(peak.load_w),
    }
}

/// Outdoor conditions shared by all chillers in a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Weather {
    pub dry_bulb_c: Vec<f64>,
    pub wet_bulb_c: Vec<f64>,
}

impl Weather {
    pub fn len(&self) -> usize {
        self.dry_bulb_c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dry_bulb_c.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`PrepError::LengthMismatch`] if the two columns disagree.
    pub fn validate(&self) -> PrepResult<()> {
        check_lengths(
            "weather",
            self.len(),
            &[("wet_bulb_c", self.wet_bulb_c.len())],
        )
    }

    /// Ambient temperature relevant to a chiller of the given type.
    ///
    /// Unspecified types fall back to dry-bulb; callers warn once per chiller.
    pub fn ambient_for(&self, chiller_type: ChillerType, t: usize) -> f64 {
        match chiller_type {
            ChillerType::WaterCooled => self.wet_bulb_c[t],
            ChillerType::AirCooled | ChillerType::Unspecified => self.dry_bulb_c[t],
        }
    }
}

/// A chiller or district plant ready for processing.
#[derive(Debug, Clone)]
pub struct ChillerInput {
    pub name: String,
    pub curves: ChillerCurveSet,
    pub series: ChillerSeries,
}

impl ChillerInput {
    /// Validates array lengths against each other and against the weather.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::LengthMismatch`] for any disagreement.
    pub fn validate(&self, weather: &Weather) -> PrepResult<()> {
        self.series.validate(&self.name)?;
        if weather.len() != self.series.len() {
            return Err(PrepError::LengthMismatch {
                entity: self.name.clone(),
                field: "weather".into(),
                expected: self.series.len(),
                found: weather.len(),
            });
        }
        Ok(())
    }
}

fn check_lengths(entity: &str, expected: usize, fields: &[(&str, usize)]) -> PrepResult<()> {
    match fields.iter().find(|(_, found)| *found != expected) {
        Some((field, found)) => Err(PrepError::LengthMismatch {
            entity: entity.to_string(),
            field: (*field).to_string(),
            expected,
            found: *found,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(load_w: f64, plr: Option<f64>, outlet: Option<f64>) -> SeriesRecord {
        SeriesRecord {
            mass_flow_kg_s: 30.0,
            load_w,
            power_w: load_w / 3.0,
            plr,
            evap_inlet_c: 12.0,
            evap_outlet_c: outlet,
        }
    }

    #[test]
    fn optional_columns_resolved_once() {
        let records = vec![record(500_000.0, None, None), record(0.0, Some(0.0), Some(7.0))];
        let s = ChillerSeries::from_records(&records, 1_000_000.0, 6.6667);
        assert_eq!(s.plr, vec![0.5, 0.0]);
        assert_eq!(s.evap_outlet_c, vec![6.6667, 7.0]);
        assert!(s.validate("CH-1").is_ok());
    }

    #[test]
    fn rated_capacity_from_peak_and_plr() {
        let records = vec![
            record(300_000.0, Some(0.3), None),
            record(500_000.0, Some(0.5), None),
            record(0.0, Some(0.0), None),
        ];
        assert_eq!(infer_rated_capacity(&records), Some(1_000_000.0));
    }

    #[test]
    fn rated_capacity_without_plr_is_peak_load() {
        let records = vec![record(450_000.0, None, None), record(200_000.0, None, None)];
        assert_eq!(infer_rated_capacity(&records), Some(450_000.0));
        assert_eq!(infer_rated_capacity(&[record(0.0, None, None)]), None);
    }

    #[test]
    fn short_field_reported() {
        let mut s = ChillerSeries::from_records(&[record(1.0, None, None)], 10.0, 6.7);
        s.power_w.clear();
        match s.validate("CH-2") {
            Err(PrepError::LengthMismatch { field, found, .. }) => {
                assert_eq!(field, "power_w");
                assert_eq!(found, 0);
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn ambient_source_by_type() {
        let w = Weather {
            dry_bulb_c: vec![30.0],
            wet_bulb_c: vec![22.0],
        };
        assert_eq!(w.ambient_for(ChillerType::AirCooled, 0), 30.0);
        assert_eq!(w.ambient_for(ChillerType::WaterCooled, 0), 22.0);
        assert_eq!(w.ambient_for(ChillerType::Unspecified, 0), 30.0);
    }
}

//! Chiller curve descriptor files.
//!
//! A descriptor is line oriented, one item per line, values comma separated:
//!
//! ```text
//! CH-1                                  name
//! 5.5,0.15                              rated COP, minimum PLR
//! WaterCooled,0.0                       chiller type, condenser fan fraction
//! c0,c1,c2,c3,c4,c5                     cap_ft coefficients
//! min_x,max_x,min_y,max_y               cap_ft limits
//! c0,c1,c2,c3,c4,c5                     eir_ft coefficients
//! min_x,max_x,min_y,max_y               eir_ft limits
//! c0,c1,c2                              eir_plr coefficients
//! ```
//!
//! `x` is the evaporator leaving temperature and `y` the ambient temperature.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::chiller::{ChillerCurveSet, ChillerType};
use crate::error::{PrepError, PrepResult};

/// Validity box of a biquadratic curve (°C).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveLimits {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// Parsed contents of one descriptor file.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDescriptor {
    pub name: String,
    pub rated_cop: f64,
    pub plr_min: f64,
    pub chiller_type: ChillerType,
    pub condenser_fan_fraction: f64,
    pub cap_ft: [f64; 6],
    pub cap_ft_limits: CurveLimits,
    pub eir_ft: [f64; 6],
    pub eir_ft_limits: CurveLimits,
    pub eir_plr: [f64; 3],
}

/// Which temperature curve a [`CurveDomainWarning`] concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    CapacityFt,
    EirFt,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityFt => f.write_str("capacity-vs-temperature"),
            Self::EirFt => f.write_str("EIR-vs-temperature"),
        }
    }
}

/// A curve evaluated outside its fitted evaporator temperature range.
///
/// Informational only: the curve is extrapolated and processing continues.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDomainWarning {
    pub chiller: String,
    pub curve: CurveKind,
    /// Lowest evaporator leaving temperature covered by the curve (°C).
    pub min_evap_temp_c: f64,
    /// Temperature the curve will be evaluated at (°C).
    pub evaluated_at_c: f64,
}

impl fmt::Display for CurveDomainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} curve for chiller '{}' starts at {:.2} °C but is evaluated at {:.2} °C; \
             the curve is extrapolated and must be verified",
            self.curve, self.chiller, self.min_evap_temp_c, self.evaluated_at_c
        )
    }
}

impl CurveDescriptor {
    /// Parses descriptor text; `path` is used for error reporting only.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::MalformedCurveData`] for a missing line or a value
    /// that is absent or not a number.
    pub fn parse(text: &str, path: &Path) -> PrepResult<Self> {
        let mut lines = DescriptorLines {
            lines: text.lines(),
            line: 0,
            path,
        };

        let name = lines.next_line()?.trim().to_string();
        if name.is_empty() {
            return Err(lines.malformed("chiller name is empty"));
        }
        let [rated_cop, plr_min] = lines.floats::<2>()?;
        let (chiller_type, condenser_fan_fraction) = lines.type_and_fan()?;
        let cap_ft = lines.floats::<6>()?;
        let cap_ft_limits = lines.limits()?;
        let eir_ft = lines.floats::<6>()?;
        let eir_ft_limits = lines.limits()?;
        let eir_plr = lines.floats::<3>()?;

        Ok(Self {
            name,
            rated_cop,
            plr_min,
            chiller_type,
            condenser_fan_fraction,
            cap_ft,
            cap_ft_limits,
            eir_ft,
            eir_ft_limits,
            eir_plr,
        })
    }

    /// Combines the descriptor with a rated capacity (W_th).
    pub fn curve_set(&self, rated_capacity_w: f64) -> ChillerCurveSet {
        ChillerCurveSet {
            cap_ft: self.cap_ft,
            eir_ft: self.eir_ft,
            eir_plr: self.eir_plr,
            rated_capacity_w,
            rated_cop: self.rated_cop,
            plr_min: self.plr_min,
            condenser_fan_fraction: self.condenser_fan_fraction,
            cap_ft_min_temp: self.cap_ft_limits.min_y,
            eir_ft_min_temp: self.eir_ft_limits.min_y,
            chiller_type: self.chiller_type,
        }
    }

    /// Curves that do not reach below freezing or down to the charging
    /// temperature.
    pub fn domain_warnings(&self, temp_charge_c: f64) -> Vec<CurveDomainWarning> {
        let threshold = temp_charge_c.min(0.0);
        [
            (CurveKind::CapacityFt, self.cap_ft_limits),
            (CurveKind::EirFt, self.eir_ft_limits),
        ]
        .into_iter()
        .filter(|(_, limits)| limits.min_x > threshold)
        .map(|(curve, limits)| CurveDomainWarning {
            chiller: self.name.clone(),
            curve,
            min_evap_temp_c: limits.min_x,
            evaluated_at_c: temp_charge_c,
        })
        .collect()
    }
}

/// Reads and parses a descriptor file.
///
/// # Errors
///
/// Returns [`PrepError::MissingCurveData`] if the file does not exist, and
/// the errors of [`CurveDescriptor::parse`] otherwise.
pub fn read_descriptor(path: &Path) -> PrepResult<CurveDescriptor> {
    if !path.is_file() {
        return Err(PrepError::MissingCurveData {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    CurveDescriptor::parse(&text, path)
}

struct DescriptorLines<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
    path: &'a Path,
}

impl<'a> DescriptorLines<'a> {
    fn malformed(&self, message: impl Into<String>) -> PrepError {
        PrepError::MalformedCurveData {
            path: PathBuf::from(self.path),
            line: self.line,
            message: message.into(),
        }
    }

    fn next_line(&mut self) -> PrepResult<&'a str> {
        self.line += 1;
        match self.lines.next() {
            Some(l) => Ok(l),
            None => Err(self.malformed("unexpected end of file")),
        }
    }

    fn floats<const N: usize>(&mut self) -> PrepResult<[f64; N]> {
        let line = self.next_line()?;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < N {
            return Err(self.malformed(format!(
                "expected {N} values, found {}",
                fields.len()
            )));
        }
        let mut out = [0.0; N];
        for (slot, field) in out.iter_mut().zip(&fields) {
            *slot = field
                .parse()
                .map_err(|_| self.malformed(format!("invalid number \"{field}\"")))?;
        }
        Ok(out)
    }

    fn limits(&mut self) -> PrepResult<CurveLimits> {
        let [min_x, max_x, min_y, max_y] = self.floats::<4>()?;
        Ok(CurveLimits {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    fn type_and_fan(&mut self) -> PrepResult<(ChillerType, f64)> {
        let line = self.next_line()?;
        let mut fields = line.split(',').map(str::trim);
        let label = fields.next().unwrap_or_default();
        let fan = fields
            .next()
            .ok_or_else(|| self.malformed("missing condenser fan fraction"))?;
        let fan = fan
            .parse()
            .map_err(|_| self.malformed(format!("invalid number \"{fan}\"")))?;
        Ok((ChillerType::from_label(label), fan))
    }
}

//! Solver data files and the JSON run summary.
//!
//! Each chiller `k` (1-based) gets seven plain-text files consumed by the
//! dispatch model:
//!
//! | File | Rows | Contents |
//! |---|---|---|
//! | `pN{k}.dat` | one per timestep | recorded chiller power (kW_e) |
//! | `lN{k}.dat` | one per timestep | recorded cooling load (kW_th) |
//! | `slopes{k}.dat` | one per timestep | segment slopes (kW_e/kW_th) |
//! | `ranges{k}.dat` | one per timestep | segment ranges (kW_th) |
//! | `q_dotX{k}.dat` | one per timestep | charge capacity (kW_th) |
//! | `lambdaX{k}.dat` | one per timestep | charge power coefficient |
//! | `Tsets{k}.dat` | three | full, partial, and charge timestep sets |

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::chiller::{ChargeResult, DischargeCurveResult};
use crate::error::PrepResult;
use crate::plant::ChillerOutcome;
use crate::report::RunSummary;

/// File name of the JSON run summary.
pub const SUMMARY_FILE: &str = "summary.json";

/// Writes segment slopes, one comma-separated row per timestep.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_slopes(results: &[DischargeCurveResult], writer: impl Write) -> PrepResult<()> {
    write_rows(results.iter().map(|r| &r.slopes), 1.0, 5, writer)
}

/// Writes segment ranges in kW, one comma-separated row per timestep.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ranges(results: &[DischargeCurveResult], writer: impl Write) -> PrepResult<()> {
    write_rows(results.iter().map(|r| &r.ranges), 1000.0, 2, writer)
}

/// Writes watt values in kW with two decimals, one value per line.
///
/// Used for recorded power and load, the baselines the shed and charge
/// coefficients are relative to.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_kilowatts(
    values: impl IntoIterator<Item = f64>,
    writer: impl Write,
) -> PrepResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for w in values {
        wtr.write_record([format!("{:.2}", w / 1000.0)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes available charge capacity in kW, one value per line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_charge_capacity(results: &[ChargeResult], writer: impl Write) -> PrepResult<()> {
    write_kilowatts(results.iter().map(|r| r.available_capacity_w), writer)
}

/// Writes charge power coefficients, one value per line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_charge_coefficients(results: &[ChargeResult], writer: impl Write) -> PrepResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for r in results {
        wtr.write_record([format!("{:.5}", r.power_coefficient)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the full, partial, and charge timestep sets as three rows.
///
/// Rows differ in length; an empty set is written as an empty line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_timestep_sets(outcome: &ChillerOutcome, mut writer: impl Write) -> PrepResult<()> {
    for set in [
        &outcome.full_storage_timesteps,
        &outcome.partial_storage_timesteps,
        &outcome.charge_timesteps,
    ] {
        if set.is_empty() {
            writeln!(writer)?;
            continue;
        }
        let mut wtr = csv::WriterBuilder::new().from_writer(&mut writer);
        wtr.write_record(set.iter().map(usize::to_string))?;
        wtr.flush()?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes all solver files for chiller `index` into `dir`.
///
/// Returns the written paths in a fixed order.
///
/// # Errors
///
/// Returns an error if any file cannot be created or written.
pub fn write_solver_files(
    dir: &Path,
    index: usize,
    outcome: &ChillerOutcome,
) -> PrepResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(7);

    let path = dir.join(format!("pN{index}.dat"));
    write_kilowatts(outcome.power_w.iter().copied(), create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("lN{index}.dat"));
    write_kilowatts(outcome.load_w.iter().copied(), create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("slopes{index}.dat"));
    write_slopes(&outcome.discharge, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("ranges{index}.dat"));
    write_ranges(&outcome.discharge, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("q_dotX{index}.dat"));
    write_charge_capacity(&outcome.charge, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("lambdaX{index}.dat"));
    write_charge_coefficients(&outcome.charge, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("Tsets{index}.dat"));
    write_timestep_sets(outcome, create(&path)?)?;
    written.push(path);

    for p in &written {
        info!(chiller = %outcome.name, path = %p.display(), "wrote solver file");
    }
    Ok(written)
}

/// Writes `summary.json` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialized.
pub fn write_summary(dir: &Path, summary: &RunSummary) -> PrepResult<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    let mut out = create(&path)?;
    serde_json::to_writer_pretty(&mut out, summary)?;
    writeln!(out)?;
    out.flush()?;
    info!(path = %path.display(), "wrote run summary");
    Ok(path)
}

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    File::create(path).map(io::BufWriter::new)
}

fn write_rows<'a>(
    rows: impl Iterator<Item = &'a Vec<f64>>,
    scale: f64,
    precision: usize,
    writer: impl Write,
) -> PrepResult<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in rows {
        wtr.write_record(row.iter().map(|v| format!("{:.*}", precision, v / scale)))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> ChillerOutcome {
        ChillerOutcome {
            name: "CH-1".into(),
            load_w: vec![0.0, 920_000.0],
            power_w: vec![0.0, 306_667.0],
            discharge: vec![
                DischargeCurveResult::zeroed(2),
                DischargeCurveResult {
                    slopes: vec![0.333_333_3, 0.25],
                    ranges: vec![123_456.0, 7_890.0],
                },
            ],
            charge: vec![
                ChargeResult {
                    available_capacity_w: 812_346.0,
                    power_coefficient: 0.412_345_67,
                },
                ChargeResult {
                    available_capacity_w: 0.0,
                    power_coefficient: 10.0,
                },
            ],
            full_storage_timesteps: vec![2],
            partial_storage_timesteps: vec![2],
            charge_timesteps: vec![],
            negative_charge_coefficients: 0,
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> PrepResult<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("write");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn slopes_one_row_per_timestep() {
        let o = outcome();
        let text = render(|b| write_slopes(&o.discharge, b));
        assert_eq!(text, "0.00000,0.00000\n0.33333,0.25000\n");
    }

    #[test]
    fn ranges_in_kilowatts() {
        let o = outcome();
        let text = render(|b| write_ranges(&o.discharge, b));
        assert_eq!(text, "0.00,0.00\n123.46,7.89\n");
    }

    #[test]
    fn charge_files_one_value_per_line() {
        let o = outcome();
        let q = render(|b| write_charge_capacity(&o.charge, b));
        assert_eq!(q, "812.35\n0.00\n");
        let l = render(|b| write_charge_coefficients(&o.charge, b));
        assert_eq!(l, "0.41235\n10.00000\n");
    }

    #[test]
    fn recorded_power_and_load_in_kilowatts() {
        let o = outcome();
        let p = render(|b| write_kilowatts(o.power_w.iter().copied(), b));
        assert_eq!(p, "0.00\n306.67\n");
        let l = render(|b| write_kilowatts(o.load_w.iter().copied(), b));
        assert_eq!(l, "0.00\n920.00\n");
    }

    #[test]
    fn timestep_sets_three_rows() {
        let mut o = outcome();
        o.full_storage_timesteps = vec![1, 2, 3];
        let text = render(|b| write_timestep_sets(&o, b));
        assert_eq!(text, "1,2,3\n2\n\n");
    }

    #[test]
    fn solver_files_written_to_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_solver_files(dir.path(), 3, &outcome()).expect("files");
        let names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "pN3.dat",
                "lN3.dat",
                "slopes3.dat",
                "ranges3.dat",
                "q_dotX3.dat",
                "lambdaX3.dat",
                "Tsets3.dat"
            ]
        );
        assert!(paths.iter().all(|p| p.is_file()));
    }

    #[test]
    fn summary_json_parseable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary = RunSummary {
            segments: 2,
            chillers: vec![crate::report::ChillerSummary::from_outcome(1, &outcome())],
        };
        let path = write_summary(dir.path(), &summary).expect("summary");
        let text = std::fs::read_to_string(path).expect("read");
        let json: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(json["segments"], 2);
        assert_eq!(json["chillers"][0]["name"], "CH-1");
    }
}

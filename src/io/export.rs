//! CSV export for rankings and monthly generation.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::irradiance::MONTH_NAMES;
use crate::sizing::DimensioningResult;

/// Column header for the ranking export.
const RESULTS_HEADER: &str = "rank,module,inverter,modules_per_string,string_count,\
                              inverter_count,total_modules,dc_power_kw,dc_ac_ratio,\
                              status,annual_kwh,capacity_factor,score,estimated_cost,warnings";

/// Column header for the monthly export.
const MONTHLY_HEADER: &str = "month,generation_kwh,consumption_kwh,coverage_pct";

/// Exports ranked results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_results_csv(results: &[DimensioningResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_results_csv(results, io::BufWriter::new(file))
}

/// Writes ranked results as CSV to any writer, one row per result in rank
/// order. Warnings are joined with `"; "`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_results_csv(results: &[DimensioningResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(RESULTS_HEADER.split(',').map(str::trim))?;

    for (rank, r) in results.iter().enumerate() {
        let c = &r.configuration;
        wtr.write_record(&[
            (rank + 1).to_string(),
            r.module.clone(),
            r.inverter.clone(),
            c.modules_per_string.to_string(),
            c.string_count.to_string(),
            c.inverter_count.to_string(),
            c.total_modules.to_string(),
            format!("{:.3}", c.dc_power_kw),
            format!("{:.3}", r.dc_ac_ratio),
            r.compatibility_status.to_string(),
            format!("{:.1}", r.annual_generation_kwh),
            format!("{:.4}", r.capacity_factor),
            format!("{:.2}", r.score.total),
            format!("{:.2}", r.estimated_cost),
            r.warnings.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the monthly table of one result to a CSV file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_monthly_csv(
    result: &DimensioningResult,
    consumption_kwh: Option<&[f64; 12]>,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_monthly_csv(result, consumption_kwh, io::BufWriter::new(file))
}

/// Writes twelve month rows. Consumption columns stay empty when no
/// consumption is known.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_monthly_csv(
    result: &DimensioningResult,
    consumption_kwh: Option<&[f64; 12]>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(MONTHLY_HEADER.split(','))?;

    for (m, generation) in result.monthly_generation_kwh.iter().enumerate() {
        let (consumption, coverage) = match consumption_kwh {
            Some(c) if c[m] > 0.0 => (
                format!("{:.1}", c[m]),
                format!("{:.1}", 100.0 * generation / c[m]),
            ),
            Some(c) => (format!("{:.1}", c[m]), String::new()),
            None => (String::new(), String::new()),
        };
        wtr.write_record(&[
            MONTH_NAMES[m].to_string(),
            format!("{generation:.1}"),
            consumption,
            coverage,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::strings::VoltageWindow;
    use crate::sizing::{CompatibilityStatus, Configuration, ScoreBreakdown};

    fn make_result(module: &str, score: f64) -> DimensioningResult {
        DimensioningResult {
            module: module.into(),
            inverter: "I5K".into(),
            configuration: Configuration {
                modules_per_string: 8,
                string_count: 2,
                inverter_count: 1,
                total_modules: 16,
                dc_power_kw: 6.4,
            },
            window: VoltageWindow {
                min_modules_per_string: 5,
                max_modules_per_string: 13,
                voc_cold_v: 44.69,
                vmpp_hot_v: 27.88,
            },
            monthly_generation_kwh: [700.0; 12],
            annual_generation_kwh: 8400.0,
            dc_ac_ratio: 1.28,
            capacity_factor: 0.15,
            compatibility_status: CompatibilityStatus::Good,
            score: ScoreBreakdown {
                compatibility: 0.74,
                capacity_factor: 0.68,
                coverage: 1.0,
                budget: 1.0,
                total: score,
            },
            estimated_cost: 21_000.0,
            warnings: vec!["first, with comma".into(), "second".into()],
        }
    }

    #[test]
    fn results_header_and_rows() {
        let results = vec![make_result("M400", 82.0), make_result("M300", 75.0)];
        let mut buf = Vec::new();
        write_results_csv(&results, &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,module,inverter,modules_per_string"));
        assert!(lines[1].starts_with("1,M400,I5K,8,2,1,16,6.400,1.280,good,"));
    }

    #[test]
    fn warnings_survive_csv_quoting() {
        let results = vec![make_result("M400", 82.0)];
        let mut buf = Vec::new();
        write_results_csv(&results, &mut buf).ok();

        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(15));
        let row = rdr.records().next().and_then(Result::ok);
        assert_eq!(row.as_ref().and_then(|r| r.get(14)), Some("first, with comma; second"));
    }

    #[test]
    fn monthly_without_consumption_leaves_columns_empty() {
        let mut buf = Vec::new();
        write_monthly_csv(&make_result("M400", 82.0), None, &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "month,generation_kwh,consumption_kwh,coverage_pct");
        assert_eq!(lines[1], "Jan,700.0,,");
    }

    #[test]
    fn monthly_coverage_column() {
        let consumption = [350.0; 12];
        let mut buf = Vec::new();
        write_monthly_csv(&make_result("M400", 82.0), Some(&consumption), &mut buf).ok();
        let output = String::from_utf8(buf).unwrap_or_default();
        assert_eq!(output.lines().nth(12), Some("Dec,700.0,350.0,200.0"));
    }
}

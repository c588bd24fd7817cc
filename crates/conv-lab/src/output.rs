//! Result output formatting and writing.

use crate::orchestrator::{CheckResult, LabResults};
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_dsp::validation::WidthReport;
use lib_types::sequence::Sequence;
use lib_types::waveform::Waveform;
use std::io::Write;
use std::path::Path;

/// Write lab results to the output directory.
pub fn write_results(results: &LabResults, output_dir: &Path, format: OutputFormat) -> Result<()> {
    write_signal_dir(output_dir, "signals", &results.ct_signals, &results.dt_signals)?;
    write_signal_dir(output_dir, "operations", &results.ct_operations, &results.dt_operations)?;
    write_signal_dir(output_dir, "convolution", &results.ct_convolutions, &results.dt_convolutions)?;

    let validation_path = output_dir.join(format!("validation.{}", format.extension()));
    let mut f = std::fs::File::create(&validation_path)
        .with_context(|| format!("Failed to create {:?}", validation_path))?;
    write_validation(&mut f, results, format)?;
    tracing::info!("Wrote validation results to {:?}", validation_path);

    let summary_path = output_dir.join("summary.txt");
    let mut f = std::fs::File::create(&summary_path)?;
    write_summary(&mut f, results)?;
    tracing::info!("Wrote summary to {:?}", summary_path);

    Ok(())
}

fn write_signal_dir(
    output_dir: &Path,
    subdir: &str,
    ct: &[(String, Waveform)],
    dt: &[(String, Sequence)],
) -> Result<()> {
    let dir = output_dir.join(subdir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {:?}", dir))?;

    for (name, waveform) in ct {
        let mut f = std::fs::File::create(dir.join(format!("ct_{}.csv", name)))?;
        write_waveform_csv(&mut f, waveform)?;
    }
    for (name, sequence) in dt {
        let mut f = std::fs::File::create(dir.join(format!("dt_{}.csv", name)))?;
        write_sequence_csv(&mut f, sequence)?;
    }

    tracing::debug!("Wrote {} signals to {:?}", ct.len() + dt.len(), dir);
    Ok(())
}

pub fn write_waveform_csv<W: Write>(w: &mut W, waveform: &Waveform) -> Result<()> {
    writeln!(w, "time_s,value")?;
    for (i, &v) in waveform.samples.iter().enumerate() {
        writeln!(w, "{},{}", waveform.time_at(i).0, v)?;
    }
    Ok(())
}

pub fn write_sequence_csv<W: Write>(w: &mut W, sequence: &Sequence) -> Result<()> {
    writeln!(w, "n,value")?;
    for (n, &v) in sequence.indices().iter().zip(&sequence.samples) {
        writeln!(w, "{},{}", n, v)?;
    }
    Ok(())
}

fn status_line(check: &CheckResult) -> String {
    match &check.report {
        Some(report) => format!(
            "{:<24} {:<9} max|e|={:.3e}  RMSE={:.3e}  n={}",
            check.name,
            check.status.label(),
            report.max_abs_error,
            report.rmse,
            report.samples
        ),
        None => format!("{:<24} {:<9}", check.name, check.status.label()),
    }
}

fn write_validation<W: Write>(w: &mut W, results: &LabResults, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(w, "Validation Results")?;
            writeln!(w, "==================")?;
            for check in &results.checks {
                writeln!(w, "{}", status_line(check))?;
                if let Some(report) = &check.report {
                    writeln!(w, "    {}", report.property)?;
                }
                if let Some(note) = &check.note {
                    writeln!(w, "    note: {}", note)?;
                }
            }
            writeln!(w)?;
            write_sweep_table(w, &results.sweep)?;
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "seed": results.seed,
                "ct_params": results.ct_params,
                "dt_params": results.dt_params,
                "checks": results.checks,
                "sweep": results.sweep,
                "sweep_converges": results.sweep_converges,
                "passed": results.passed(),
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => {
            writeln!(w, "check,status,max_abs_error,rmse,samples,tolerance")?;
            for check in &results.checks {
                let (max_abs, rmse, samples) = check.report.as_ref().map_or(
                    (String::new(), String::new(), String::new()),
                    |r| (r.max_abs_error.to_string(), r.rmse.to_string(), r.samples.to_string()),
                );
                let tolerance = check.tolerance.map(|t| t.to_string()).unwrap_or_default();
                writeln!(
                    w,
                    "{},{},{},{},{},{}",
                    check.name,
                    check.status.label(),
                    max_abs,
                    rmse,
                    samples,
                    tolerance
                )?;
            }
            for entry in &results.sweep {
                writeln!(
                    w,
                    "sweep w={},{},{},{},{},",
                    entry.width,
                    if results.sweep_converges { "PASS" } else { "WARN" },
                    entry.report.max_abs_error,
                    entry.report.rmse,
                    entry.report.samples
                )?;
            }
        }
    }
    Ok(())
}

/// Width / area / error table for an impulse-width sweep.
pub fn write_sweep_table<W: Write>(w: &mut W, sweep: &[WidthReport]) -> Result<()> {
    writeln!(w, "Impulse Width Sweep")?;
    writeln!(w, "{:>10} {:>10} {:>12} {:>12}", "width", "area", "max |e|", "RMSE")?;
    for entry in sweep {
        writeln!(
            w,
            "{:>10.4} {:>10.6} {:>12.3e} {:>12.3e}",
            entry.width, entry.pulse_area, entry.report.max_abs_error, entry.report.rmse
        )?;
    }
    Ok(())
}

fn write_summary<W: Write>(w: &mut W, results: &LabResults) -> Result<()> {
    writeln!(w, "Convolution Lab Summary")?;
    writeln!(w, "=======================")?;
    writeln!(w)?;
    writeln!(w, "Seed: {}", results.seed)?;
    writeln!(w)?;

    let p = &results.ct_params;
    writeln!(w, "CT parameters:")?;
    writeln!(w, "  Amplitude:  {:.4}", p.amplitude)?;
    writeln!(w, "  Frequency:  {:.4} Hz", p.frequency)?;
    writeln!(w, "  Phase:      {:.4} rad", p.phase)?;
    writeln!(w, "  Decay:      {:.4}", p.decay)?;
    writeln!(w, "  Pulse width: {:.4}", p.width)?;
    writeln!(w, "  Noise std:  {:.4}", p.noise_std)?;
    writeln!(w, "  Check width: {:.4}", p.check_width)?;

    let p = &results.dt_params;
    writeln!(w, "DT parameters:")?;
    writeln!(w, "  Amplitude:  {:.4}", p.amplitude)?;
    writeln!(w, "  Frequency:  {:.4} cycles/sample", p.frequency)?;
    writeln!(w, "  Phase:      {:.4} rad", p.phase)?;
    writeln!(w, "  Decay:      {:.4}", p.decay)?;
    writeln!(w)?;

    writeln!(w, "Checks:")?;
    for check in &results.checks {
        writeln!(w, "  {}", status_line(check))?;
    }
    writeln!(
        w,
        "  Width sweep converges: {}",
        if results.sweep_converges { "yes" } else { "no" }
    )?;
    writeln!(w)?;

    let failed = results.failed_checks().count();
    if failed == 0 {
        writeln!(w, "Status: PASS")?;
    } else {
        writeln!(w, "Status: FAIL - {} check(s) exceeded tolerance", failed)?;
    }
    Ok(())
}

/// Print results to stdout.
pub fn print_results(results: &LabResults) {
    println!("\n=== Convolution Lab (seed {}) ===\n", results.seed);

    for check in &results.checks {
        println!("  {}", status_line(check));
    }

    println!();
    for entry in &results.sweep {
        println!(
            "  w={:.4}  area={:.6}  RMSE={:.3e}",
            entry.width, entry.pulse_area, entry.report.rmse
        );
    }

    if results.passed() {
        println!("\n  Status: PASS");
    } else {
        println!("\n  Status: FAIL");
    }
    println!();
}

//! PNG figures for lab results.
//!
//! Every CSV written by [`crate::output`] gets a figure of the same name next
//! to it: CT signals as line charts, DT signals as stem plots. The identity
//! checks get overlay figures of input against output.
//!
//! Captions, tick labels and legends need a font backend. They are drawn only
//! when the crate is built with the `ttf` feature.

use crate::orchestrator::{CtOverlay, DtOverlay, LabResults};
use anyhow::{Context, Result};
use lib_types::sequence::Sequence;
use lib_types::waveform::Waveform;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const DRAW_TEXT: bool = cfg!(feature = "ttf");
const SIZE: (u32, u32) = (800, 480);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Render every figure of a lab run under `output_dir`. Returns the number
/// of files written.
pub fn write_plots(results: &LabResults, output_dir: &Path) -> Result<usize> {
    let mut count = 0;

    for (subdir, ct, dt) in [
        ("signals", &results.ct_signals, &results.dt_signals),
        ("operations", &results.ct_operations, &results.dt_operations),
        ("convolution", &results.ct_convolutions, &results.dt_convolutions),
    ] {
        let dir = output_dir.join(subdir);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        for (name, waveform) in ct {
            let title = format!("CT {}", name);
            plot_waveforms(&dir.join(format!("ct_{}.png", name)), &title, &[(name.as_str(), waveform, BLUE)])?;
            count += 1;
        }
        for (name, sequence) in dt {
            let title = format!("DT {}", name);
            plot_stems(&dir.join(format!("dt_{}.png", name)), &title, &[(name.as_str(), sequence, BLUE)])?;
            count += 1;
        }
    }

    let dir = output_dir.join("signals");
    for name in ["step", "ramp"] {
        if let (Some(ct), Some(dt)) = (find(&results.ct_signals, name), find(&results.dt_signals, name)) {
            plot_comparison(&dir.join(format!("compare_{}.png", name)), name, ct, dt)?;
            count += 1;
        }
    }

    let dir = output_dir.join("convolution");
    for overlay in &results.ct_overlays {
        plot_ct_overlay(&dir, overlay)?;
        count += 1;
    }
    for overlay in &results.dt_overlays {
        plot_dt_overlay(&dir, overlay)?;
        count += 1;
    }

    tracing::info!("Wrote {} figures under {:?}", count, output_dir);
    Ok(count)
}

fn find<'a, T>(signals: &'a [(String, T)], name: &str) -> Option<&'a T> {
    signals.iter().find(|(n, _)| n.as_str() == name).map(|(_, s)| s)
}

fn plot_waveforms(path: &Path, title: &str, curves: &[(&str, &Waveform, RGBColor)]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_waveforms(&root, title, curves)?;
    root.present().with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

fn plot_stems(path: &Path, title: &str, stems: &[(&str, &Sequence, RGBColor)]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    draw_stems(&root, title, stems)?;
    root.present().with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

/// CT signal on the left, its DT counterpart on the right.
fn plot_comparison(path: &Path, name: &str, ct: &Waveform, dt: &Sequence) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (left, right) = root.split_horizontally((SIZE.0 / 2) as i32);
    draw_waveforms(&left, &format!("CT {}", name), &[(name, ct, BLUE)])?;
    draw_stems(&right, &format!("DT {}", name), &[(name, dt, BLUE)])?;

    root.present().with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

fn plot_ct_overlay(dir: &Path, overlay: &CtOverlay) -> Result<()> {
    let input = &overlay.input;
    let aligned = Waveform::new(overlay.aligned.clone(), input.dt, input.t_start);

    plot_waveforms(
        &dir.join(format!("{}.png", overlay.name)),
        &overlay.title,
        &[("x(t)", input, BLUE), ("(x * h)(t), aligned", &aligned, RED)],
    )
}

fn plot_dt_overlay(dir: &Path, overlay: &DtOverlay) -> Result<()> {
    plot_stems(
        &dir.join(format!("{}.png", overlay.name)),
        &overlay.title,
        &[("x[n]", &overlay.input, BLUE), ("(x * δ)[n]", &overlay.cropped, RED)],
    )
}

fn draw_waveforms(area: &Area<'_>, title: &str, curves: &[(&str, &Waveform, RGBColor)]) -> Result<()> {
    let x_range = value_range(curves.iter().flat_map(|(_, w, _)| [w.t_start.0, w.t_end().0]));
    let y_range = value_range(curves.iter().flat_map(|(_, w, _)| w.samples.iter().copied()));

    let mut builder = ChartBuilder::on(area);
    layout(&mut builder, title);
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;
    draw_mesh(&mut chart, "t (s)")?;

    for &(label, waveform, color) in curves {
        let points = waveform
            .samples
            .iter()
            .enumerate()
            .map(|(i, &v)| (waveform.time_at(i).0, v));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    draw_legend(&mut chart, curves.len())
}

/// Stems from zero to each sample. Later series are drawn as hollow markers
/// so coincident samples stay visible.
fn draw_stems(area: &Area<'_>, title: &str, stems: &[(&str, &Sequence, RGBColor)]) -> Result<()> {
    let x_range = value_range(
        stems
            .iter()
            .flat_map(|(_, s, _)| [s.origin as f64, s.last_index() as f64]),
    );
    let y_range = value_range(
        stems
            .iter()
            .flat_map(|(_, s, _)| s.samples.iter().copied())
            .chain([0.0]),
    );

    let mut builder = ChartBuilder::on(area);
    layout(&mut builder, title);
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;
    draw_mesh(&mut chart, "n")?;

    for (i, &(label, sequence, color)) in stems.iter().enumerate() {
        let (radius, marker) = if i == 0 {
            (3, color.filled())
        } else {
            (5, color.stroke_width(2))
        };
        let points: Vec<(f64, f64)> = sequence
            .index_vec()
            .into_iter()
            .map(|n| n as f64)
            .zip(sequence.samples.iter().copied())
            .collect();

        chart.draw_series(
            points
                .iter()
                .map(|&(n, v)| PathElement::new(vec![(n, 0.0), (n, v)], color)),
        )?;
        chart
            .draw_series(points.iter().map(|&(n, v)| Circle::new((n, v), radius, marker)))?
            .label(label)
            .legend(move |(x, y)| Circle::new((x + 10, y), radius, marker));
    }

    draw_legend(&mut chart, stems.len())
}

fn layout(builder: &mut ChartBuilder<'_, '_, BitMapBackend<'_>>, title: &str) {
    builder.margin(10);
    if DRAW_TEXT {
        builder
            .caption(title, ("sans-serif", 18))
            .x_label_area_size(30)
            .y_label_area_size(50);
    }
}

fn draw_mesh(chart: &mut Chart<'_, '_>, x_desc: &str) -> Result<()> {
    let mut mesh = chart.configure_mesh();
    if DRAW_TEXT {
        mesh.x_desc(x_desc).y_desc("amplitude");
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()?;
    Ok(())
}

fn draw_legend<'a>(chart: &mut Chart<'a, 'a>, series: usize) -> Result<()> {
    if DRAW_TEXT && series > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

/// Axis range covering `values` with 5% padding. Flat or empty input gets a
/// unit margin so the chart never degenerates.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return -1.0..1.0;
    }
    let pad = if max - min > 1e-12 { 0.05 * (max - min) } else { 1.0 };
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabConfig;
    use crate::orchestrator::Orchestrator;

    fn is_png(path: &Path) -> bool {
        std::fs::read(path).map_or(false, |bytes| bytes.starts_with(b"\x89PNG"))
    }

    #[test]
    fn test_value_range() {
        let r = value_range([0.0, 1.0, 0.5].into_iter());
        assert!((r.start + 0.05).abs() < 1e-12);
        assert!((r.end - 1.05).abs() < 1e-12);

        assert_eq!(value_range([2.0, 2.0].into_iter()), 1.0..3.0);
        assert_eq!(value_range(std::iter::empty()), -1.0..1.0);
        assert_eq!(value_range([f64::NAN, 0.0, 10.0].into_iter()), -0.5..10.5);
    }

    #[test]
    fn test_write_plots_layout() {
        let mut config = LabConfig::default();
        config.seed = Some(17);
        config.ct.points = 401;
        config.dt.start = -5;
        config.dt.end = 5;
        let results = Orchestrator::new(config).unwrap().run().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let count = write_plots(&results, dir.path()).unwrap();

        // 11 signals, 10 operations, 6 convolutions, 2 comparisons, 3 overlays
        assert_eq!(count, 32);
        for file in [
            "signals/ct_sine_noisy.png",
            "signals/dt_impulse.png",
            "signals/compare_step.png",
            "operations/ct_sine_times_step.png",
            "operations/dt_sine_reversed.png",
            "convolution/ct_sine_conv_exp.png",
            "convolution/ct_validation_overlay.png",
            "convolution/ct_width_random_overlay.png",
            "convolution/dt_impulse_property_overlay.png",
        ] {
            assert!(is_png(&dir.path().join(file)), "{}", file);
        }
    }
}

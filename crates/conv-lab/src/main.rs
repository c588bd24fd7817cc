//! convlab: signal convolution laboratory.
//!
//! Generates CT and DT test signals, convolves them with a direct and an FFT
//! algorithm, and validates the results against each other and against the
//! impulse identity.

mod config;
mod orchestrator;
mod output;
mod plot;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lib_dsp::convolution::{convolve_sequences, ConvolutionMethod};
use lib_types::sequence::Sequence;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "convlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum MethodArg {
    #[default]
    Direct,
    Fft,
}

impl From<MethodArg> for ConvolutionMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Direct => ConvolutionMethod::Direct,
            MethodArg::Fft => ConvolutionMethod::Fft,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full lab: signals, operations, convolutions and validation
    Run {
        /// Path to the lab configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for results
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Seed for the random parameters (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Skip PNG figures and write only CSV and text output
        #[arg(long)]
        no_plots: bool,
    },

    /// Convolve two explicit sequences
    Convolve {
        /// Samples of x, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        x: Vec<f64>,

        /// Index of the first sample of x
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        x_origin: i64,

        /// Samples of h, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        h: Vec<f64>,

        /// Index of the first sample of h
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        h_origin: i64,

        /// Convolution algorithm
        #[arg(short, long, default_value = "direct")]
        method: MethodArg,
    },

    /// Print the CT impulse-width convergence table
    Sweep {
        /// Path to the lab configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pulse widths (overrides the config)
        #[arg(long, value_delimiter = ',')]
        widths: Option<Vec<f64>>,

        /// Seed for the random parameters (overrides the config)
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Run { config, output, seed, no_plots } => {
            run_lab(config.as_deref(), &output, seed, !no_plots, cli.format)?;
        }
        Commands::Convolve { x, x_origin, h, h_origin, method } => {
            convolve(x, x_origin, h, h_origin, method.into(), cli.format)?;
        }
        Commands::Sweep { config, widths, seed } => {
            sweep(config.as_deref(), widths, seed, cli.format)?;
        }
    }

    Ok(())
}

fn load_lab_config(path: Option<&Path>, seed: Option<u64>) -> Result<config::LabConfig> {
    if let Some(path) = path {
        tracing::info!("Loading configuration from {:?}", path);
    }
    let mut config = config::load_or_default(path)?;
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

fn run_lab(
    config_path: Option<&Path>,
    output_dir: &Path,
    seed: Option<u64>,
    plots: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = load_lab_config(config_path, seed)?;
    let orchestrator = orchestrator::Orchestrator::new(config)?;

    tracing::info!("Starting lab run...");
    let results = orchestrator.run()?;

    std::fs::create_dir_all(output_dir)?;
    output::write_results(&results, output_dir, format)?;
    if plots {
        plot::write_plots(&results, output_dir)?;
    }
    output::print_results(&results);

    tracing::info!("Lab run complete. Results written to {:?}", output_dir);

    let failed: Vec<&str> = results.failed_checks().map(|c| c.name.as_str()).collect();
    if !failed.is_empty() {
        anyhow::bail!(
            "{} validation check(s) failed: {} (seed {})",
            failed.len(),
            failed.join(", "),
            results.seed
        );
    }
    Ok(())
}

fn convolve(
    x: Vec<f64>,
    x_origin: i64,
    h: Vec<f64>,
    h_origin: i64,
    method: ConvolutionMethod,
    format: OutputFormat,
) -> Result<()> {
    let x = Sequence::new(x, x_origin);
    let h = Sequence::new(h, h_origin);
    write_convolution(&mut std::io::stdout().lock(), &x, &h, method, format)
}

/// Convolve `x` with `h` and write the output sequence in `format`.
fn write_convolution<W: Write>(
    w: &mut W,
    x: &Sequence,
    h: &Sequence,
    method: ConvolutionMethod,
    format: OutputFormat,
) -> Result<()> {
    let y = convolve_sequences(x, h, method)?;
    let range = y.indices();

    match format {
        OutputFormat::Text => {
            writeln!(w, "Method: {}", method.name())?;
            writeln!(w, "Index range: [{}, {}] ({} samples)", range.start, range.end, y.len())?;
            for (n, v) in range.iter().zip(&y.samples) {
                writeln!(w, "  y[{}] = {}", n, v)?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "method": method,
                "start": range.start,
                "end": range.end,
                "samples": y.samples,
            });
            writeln!(w, "{}", serde_json::to_string_pretty(&json)?)?;
        }
        OutputFormat::Csv => output::write_sequence_csv(w, &y)?,
    }

    Ok(())
}

fn sweep(
    config_path: Option<&Path>,
    widths: Option<Vec<f64>>,
    seed: Option<u64>,
    format: OutputFormat,
) -> Result<()> {
    let mut config = load_lab_config(config_path, seed)?;
    if let Some(widths) = widths {
        config.validation.sweep_widths = widths;
        config::validate_config(&config)?;
    }

    let widths = config.validation.sweep_widths.clone();
    let orchestrator = orchestrator::Orchestrator::new(config)?;
    let sweep = orchestrator.sweep(&widths)?;
    let converges = orchestrator::rmse_decreases_with_width(&sweep);

    match format {
        OutputFormat::Text => {
            println!("Seed: {}", orchestrator.seed());
            output::write_sweep_table(&mut std::io::stdout(), &sweep)?;
            println!("Converges: {}", if converges { "yes" } else { "no" });
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "seed": orchestrator.seed(),
                "sweep": sweep,
                "converges": converges,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("width,pulse_area,max_abs_error,rmse");
            for entry in &sweep {
                println!(
                    "{},{},{},{}",
                    entry.width, entry.pulse_area, entry.report.max_abs_error, entry.report.rmse
                );
            }
        }
    }

    Ok(())
}

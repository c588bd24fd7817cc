//! Lab configuration loading and validation.

use anyhow::{Context, Result};
use lib_dsp::signals::PulseNormalization;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::path::Path;

/// Top-level lab configuration.
///
/// Every section has defaults, so an empty file (or no file) describes the
/// default lab.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LabConfig {
    /// Seed for the random parameter draws. Drawn at startup when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Continuous-time sampling grid.
    #[serde(default)]
    pub ct: CtGrid,

    /// Discrete-time index range.
    #[serde(default)]
    pub dt: DtGrid,

    /// Ranges for the randomly drawn signal parameters.
    #[serde(default)]
    pub ranges: ParameterRanges,

    /// Validation tolerances and impulse settings.
    #[serde(default)]
    pub validation: ValidationParams,

    /// Fixed parameters of the elementary signal operations.
    #[serde(default)]
    pub operations: OperationParams,
}

/// Uniform CT grid `linspace(start, end, points)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CtGrid {
    #[serde(default = "default_ct_start")]
    pub start: f64,

    #[serde(default = "default_ct_end")]
    pub end: f64,

    #[serde(default = "default_ct_points")]
    pub points: usize,
}

fn default_ct_start() -> f64 { -1.0 }
fn default_ct_end() -> f64 { 1.0 }
fn default_ct_points() -> usize { 2000 }

impl Default for CtGrid {
    fn default() -> Self {
        Self {
            start: default_ct_start(),
            end: default_ct_end(),
            points: default_ct_points(),
        }
    }
}

/// Inclusive DT index range `[start, end]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DtGrid {
    #[serde(default = "default_dt_start")]
    pub start: i64,

    #[serde(default = "default_dt_end")]
    pub end: i64,
}

fn default_dt_start() -> i64 { -20 }
fn default_dt_end() -> i64 { 20 }

impl Default for DtGrid {
    fn default() -> Self {
        Self {
            start: default_dt_start(),
            end: default_dt_end(),
        }
    }
}

/// Closed interval a parameter is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from the range. A degenerate range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Random parameter ranges, split by signal domain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParameterRanges {
    #[serde(default)]
    pub ct: CtRanges,

    #[serde(default)]
    pub dt: DtRanges,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CtRanges {
    pub amplitude: ParamRange,
    /// Sinusoid frequency in Hz.
    pub frequency: ParamRange,
    /// Phase in radians.
    pub phase: ParamRange,
    /// Exponential decay rate `a` in `e^{-at}`.
    pub decay: ParamRange,
    /// Width of the impulse-like pulse.
    pub width: ParamRange,
    /// Standard deviation of the additive noise.
    pub noise_std: ParamRange,
}

impl Default for CtRanges {
    fn default() -> Self {
        Self {
            amplitude: ParamRange::new(0.5, 2.0),
            frequency: ParamRange::new(2.0, 10.0),
            phase: ParamRange::new(0.0, TAU),
            decay: ParamRange::new(0.5, 5.0),
            width: ParamRange::new(0.005, 0.05),
            noise_std: ParamRange::new(0.0, 0.05),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DtRanges {
    pub amplitude: ParamRange,
    /// Sinusoid frequency in cycles per sample.
    pub frequency: ParamRange,
    pub phase: ParamRange,
    /// Base `a` of `aⁿ u[n]`.
    pub decay: ParamRange,
}

impl Default for DtRanges {
    fn default() -> Self {
        Self {
            amplitude: ParamRange::new(0.5, 2.0),
            frequency: ParamRange::new(0.05, 0.45),
            phase: ParamRange::new(0.0, TAU),
            decay: ParamRange::new(0.7, 0.99),
        }
    }
}

/// Validation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationParams {
    /// Max absolute error allowed for the exact checks (cross-validation and
    /// the DT impulse identity).
    #[serde(default = "default_dt_tolerance")]
    pub dt_tolerance: f64,

    /// Optional RMSE bound for the CT impulse identity. Reported only when
    /// absent.
    #[serde(default)]
    pub ct_rmse_tolerance: Option<f64>,

    /// Height rule for the impulse-like pulse.
    #[serde(default)]
    pub pulse_normalization: PulseNormalization,

    /// Pulse widths for the convergence sweep.
    #[serde(default = "default_sweep_widths")]
    pub sweep_widths: Vec<f64>,
}

fn default_dt_tolerance() -> f64 { 1e-9 }
fn default_sweep_widths() -> Vec<f64> { vec![0.05, 0.02, 0.005] }

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            dt_tolerance: default_dt_tolerance(),
            ct_rmse_tolerance: None,
            pulse_normalization: PulseNormalization::default(),
            sweep_widths: default_sweep_widths(),
        }
    }
}

/// Signal operation parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationParams {
    /// Amplitude scale factor.
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// CT time shift in seconds.
    #[serde(default = "default_ct_shift")]
    pub ct_shift: f64,

    /// DT index shift.
    #[serde(default = "default_dt_shift")]
    pub dt_shift: i64,
}

fn default_scale() -> f64 { 2.0 }
fn default_ct_shift() -> f64 { 0.2 }
fn default_dt_shift() -> i64 { 3 }

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            ct_shift: default_ct_shift(),
            dt_shift: default_dt_shift(),
        }
    }
}

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<LabConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: LabConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content)
            .with_context(|| "Failed to parse config as JSON")?
    } else {
        // Assume TOML
        toml::from_str(&content)
            .with_context(|| "Failed to parse config as TOML")?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Load the configuration at `path`, or the defaults when no path is given.
pub fn load_or_default(path: Option<&Path>) -> Result<LabConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = LabConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

/// Validate configuration.
pub fn validate_config(config: &LabConfig) -> Result<()> {
    let ct = &config.ct;
    if ct.points < 2 {
        anyhow::bail!("CT grid needs at least 2 points, got {}", ct.points);
    }
    if !(ct.end > ct.start) {
        anyhow::bail!("CT grid end ({}) must be after start ({})", ct.end, ct.start);
    }
    if config.dt.end < config.dt.start {
        anyhow::bail!(
            "DT index range is inverted: [{}, {}]",
            config.dt.start,
            config.dt.end
        );
    }

    let ct_ranges = &config.ranges.ct;
    let dt_ranges = &config.ranges.dt;
    let named = [
        ("ranges.ct.amplitude", ct_ranges.amplitude),
        ("ranges.ct.frequency", ct_ranges.frequency),
        ("ranges.ct.phase", ct_ranges.phase),
        ("ranges.ct.decay", ct_ranges.decay),
        ("ranges.ct.width", ct_ranges.width),
        ("ranges.ct.noise_std", ct_ranges.noise_std),
        ("ranges.dt.amplitude", dt_ranges.amplitude),
        ("ranges.dt.frequency", dt_ranges.frequency),
        ("ranges.dt.phase", dt_ranges.phase),
        ("ranges.dt.decay", dt_ranges.decay),
    ];
    for (name, range) in named {
        if !range.is_valid() {
            anyhow::bail!("Invalid range {}: [{}, {}]", name, range.min, range.max);
        }
    }
    if !(ct_ranges.width.min > 0.0) {
        anyhow::bail!("Pulse widths must be positive (ranges.ct.width.min = {})", ct_ranges.width.min);
    }
    if ct_ranges.noise_std.min < 0.0 {
        anyhow::bail!("Noise standard deviation must be non-negative");
    }

    let validation = &config.validation;
    if !(validation.dt_tolerance >= 0.0) {
        anyhow::bail!("dt_tolerance must be non-negative, got {}", validation.dt_tolerance);
    }
    if let Some(tol) = validation.ct_rmse_tolerance {
        if !(tol >= 0.0) {
            anyhow::bail!("ct_rmse_tolerance must be non-negative, got {}", tol);
        }
    }
    if let Some(width) = validation.sweep_widths.iter().find(|w| !(**w > 0.0)) {
        anyhow::bail!("Sweep widths must be positive, got {}", width);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LabConfig::default();

        assert_eq!(config.seed, None);
        assert_eq!(config.ct.points, 2000);
        assert_eq!((config.dt.start, config.dt.end), (-20, 20));
        assert_eq!(config.validation.dt_tolerance, 1e-9);
        assert_eq!(config.validation.sweep_widths, vec![0.05, 0.02, 0.005]);
        assert_eq!(config.validation.pulse_normalization, PulseNormalization::UnitArea);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: LabConfig = toml::from_str(
            r#"
            seed = 42

            [ct]
            points = 500

            [ranges.ct.frequency]
            min = 1.0
            max = 3.0

            [validation]
            pulse_normalization = "nominal"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.ct.points, 500);
        assert_eq!(config.ct.start, -1.0);
        assert_eq!(config.ranges.ct.frequency, ParamRange::new(1.0, 3.0));
        assert_eq!(config.ranges.ct.amplitude, ParamRange::new(0.5, 2.0));
        assert_eq!(config.validation.pulse_normalization, PulseNormalization::Nominal);
        assert_eq!(config.operations.dt_shift, 3);
    }

    #[test]
    fn test_load_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"seed": 7, "dt": {{"start": -5, "end": 5}}}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.dt.start, -5);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[ct]\npoints = 1").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("at least 2 points"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LabConfig::default();
        config.ranges.ct.decay = ParamRange::new(5.0, 0.5);
        assert!(validate_config(&config).is_err());

        let mut config = LabConfig::default();
        config.validation.sweep_widths = vec![0.05, 0.0];
        assert!(validate_config(&config).is_err());

        let mut config = LabConfig::default();
        config.dt.end = -30;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_param_range_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = ParamRange::new(0.5, 2.0);

        for _ in 0..100 {
            let v = range.sample(&mut rng);
            assert!((0.5..=2.0).contains(&v));
        }
        assert_eq!(ParamRange::new(3.0, 3.0).sample(&mut rng), 3.0);
    }
}

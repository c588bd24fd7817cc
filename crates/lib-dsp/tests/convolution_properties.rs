//! End-to-end properties of the convolution core on randomized inputs.

use lib_dsp::alignment::linspace;
use lib_dsp::continuous::{convolve_continuous, waveform_from_grid};
use lib_dsp::convolution::{convolve_sequences, direct_convolve, fft_convolve, ConvolutionMethod};
use lib_dsp::signals::{impulse_dt, impulse_like_ct, sine_ct, PulseNormalization};
use lib_dsp::validation::{
    cross_validate, impulse_width_sweep, validate_impulse_identity_ct,
    validate_impulse_identity_dt, IdentityOutcome,
};
use lib_types::sequence::{IndexRange, Sequence};
use lib_types::units::Hertz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_signal(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

#[test]
fn test_worked_example() {
    let y = direct_convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]).unwrap();
    assert_eq!(y, vec![0.0, 1.0, 2.5, 4.0, 1.5]);

    let x = Sequence::new(vec![1.0, 2.0, 3.0], -2);
    let h = Sequence::new(vec![0.0, 1.0, 0.5], -1);
    let y = convolve_sequences(&x, &h, ConvolutionMethod::Fft).unwrap();
    assert_eq!(y.indices(), IndexRange::new(-3, 1));
}

#[test]
fn test_direct_and_fft_agree_on_random_inputs() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let len_x = rng.gen_range(1..=50);
        let len_h = rng.gen_range(1..=50);
        let x = random_signal(&mut rng, len_x);
        let h = random_signal(&mut rng, len_h);

        let report = cross_validate(&x, &h).unwrap();
        assert_eq!(report.samples, len_x + len_h - 1);
        assert!(report.max_abs_error < 1e-9, "{} (N={}, M={})", report, len_x, len_h);
    }
}

#[test]
fn test_convolution_is_commutative() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..50 {
        let (len_x, len_h) = (rng.gen_range(1..=40), rng.gen_range(1..=40));
        let x = random_signal(&mut rng, len_x);
        let h = random_signal(&mut rng, len_h);

        let xh = direct_convolve(&x, &h).unwrap();
        let hx = direct_convolve(&h, &x).unwrap();
        for (a, b) in xh.iter().zip(&hx) {
            assert!((a - b).abs() < 1e-12);
        }

        let xh_fft = fft_convolve(&x, &h).unwrap();
        let hx_fft = fft_convolve(&h, &x).unwrap();
        for (a, b) in xh_fft.iter().zip(&hx_fft) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}

#[test]
fn test_index_range_follows_origins() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..50 {
        let (len_x, len_h) = (rng.gen_range(1..=20), rng.gen_range(1..=20));
        let (origin_x, origin_h) = (rng.gen_range(-10..10), rng.gen_range(-10..10));
        let x = Sequence::new(random_signal(&mut rng, len_x), origin_x);
        let h = Sequence::new(random_signal(&mut rng, len_h), origin_h);

        let y = convolve_sequences(&x, &h, ConvolutionMethod::Direct).unwrap();

        assert_eq!(y.len(), x.len() + h.len() - 1);
        assert_eq!(y.origin, x.origin + h.origin);
        assert_eq!(y.last_index(), x.last_index() + h.last_index());
    }
}

#[test]
fn test_dt_impulse_identity_on_random_signals() {
    let mut rng = StdRng::seed_from_u64(11);
    let range = IndexRange::new(-20, 20);
    let delta = impulse_dt(range);

    for method in [ConvolutionMethod::Direct, ConvolutionMethod::Fft] {
        let x = Sequence::new(random_signal(&mut rng, range.len()), range.start);
        let y = convolve_sequences(&x, &delta, method).unwrap();

        match validate_impulse_identity_dt(&x, &y).unwrap() {
            IdentityOutcome::Compared(report) => {
                assert_eq!(report.samples, 41);
                assert!(report.max_abs_error < 1e-9, "{}: {}", method.name(), report);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

#[test]
fn test_ct_identity_converges_as_pulse_narrows() {
    let t = linspace(-1.0, 1.0, 2000);
    let x = sine_ct(&t, Hertz(2.0), 1.0, 0.4);
    let x_wf = waveform_from_grid(&t, &x).unwrap();

    let sweep = impulse_width_sweep(&x_wf, &[0.05, 0.02, 0.005], PulseNormalization::UnitArea).unwrap();

    for pair in sweep.windows(2) {
        assert!(
            pair[1].report.rmse < pair[0].report.rmse,
            "w={} rmse={} not below w={} rmse={}",
            pair[1].width,
            pair[1].report.rmse,
            pair[0].width,
            pair[0].report.rmse
        );
    }
    for entry in &sweep {
        assert!((entry.pulse_area - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_ct_identity_through_explicit_grid() {
    let t = linspace(-1.0, 1.0, 2000);
    let x = sine_ct(&t, Hertz(2.0), 1.0, 0.4);
    let h = impulse_like_ct(&t, 0.005, PulseNormalization::UnitArea).unwrap();

    let (t_y, y) = convolve_continuous(&t, &x, &h).unwrap();
    assert_eq!(y.len(), 3999);
    assert!((t_y[0] + 2.0).abs() < 1e-12);
    assert!((t_y[3998] - 2.0).abs() < 1e-12);

    let x_wf = waveform_from_grid(&t, &x).unwrap();
    let y_wf = waveform_from_grid(&t_y, &y).unwrap();
    let report = validate_impulse_identity_ct(&x_wf, &y_wf).unwrap();

    assert!(report.rmse < 0.01, "{}", report);
}

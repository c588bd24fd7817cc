//! Direct versus FFT convolution benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::alignment::linspace;
use lib_dsp::continuous::convolve_continuous;
use lib_dsp::convolution::{direct_convolve, fft_convolve};

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");

    for signal_len in [41, 256, 2000, 8192].iter() {
        let signal: Vec<f64> = (0..*signal_len).map(|i| (i as f64 * 0.01).sin()).collect();
        let kernel: Vec<f64> = (0..*signal_len).map(|i| (-(i as f64) * 0.1).exp()).collect();

        // Direct summation is quadratic; skip it for the largest size
        if *signal_len <= 2000 {
            group.bench_with_input(
                BenchmarkId::new("direct", signal_len),
                &(&signal, &kernel),
                |b, (s, k)| {
                    b.iter(|| direct_convolve(black_box(s), black_box(k)));
                },
            );
        }

        group.bench_with_input(
            BenchmarkId::new("fft", signal_len),
            &(&signal, &kernel),
            |b, (s, k)| {
                b.iter(|| fft_convolve(black_box(s), black_box(k)));
            },
        );
    }

    group.finish();
}

fn bench_continuous(c: &mut Criterion) {
    let t = linspace(-1.0, 1.0, 2000);
    let x: Vec<f64> = t.iter().map(|v| (4.0 * v).sin()).collect();
    let h: Vec<f64> = t.iter().map(|v| if v.abs() <= 0.01 { 50.0 } else { 0.0 }).collect();

    c.bench_function("continuous_2000", |b| {
        b.iter(|| convolve_continuous(black_box(&t), black_box(&x), black_box(&h)));
    });
}

criterion_group!(benches, bench_convolution, bench_continuous);
criterion_main!(benches);

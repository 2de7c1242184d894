//! Benchmarks for the pure pipeline stages.
//!
//! Run with: cargo bench

use criterion::Criterion;
use image::{DynamicImage, Rgb, RgbImage};
use snapreel::{FramePayload, compress_payload, sample_timestamps};

fn fixture_payload(width: u32, height: u32) -> FramePayload {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    FramePayload::from_image(&DynamicImage::ImageRgb8(image)).unwrap()
}

fn benchmark_sampling_clock(criterion: &mut Criterion) {
    criterion.bench_function("sample timestamps (2h film, 1s step)", |bencher| {
        bencher.iter(|| {
            let timestamps = sample_timestamps(0.0, 1.0, 7200.0);
            assert_eq!(timestamps.len(), 7200);
        });
    });

    criterion.bench_function("sample timestamps (fractional step)", |bencher| {
        bencher.iter(|| sample_timestamps(3.5, 0.25, 600.0));
    });
}

fn benchmark_transform_stage(criterion: &mut Criterion) {
    let payload = fixture_payload(640, 480);

    criterion.bench_function("transform passthrough (ratio 100)", |bencher| {
        bencher.iter(|| compress_payload(&payload, 100).unwrap());
    });

    criterion.bench_function("transform proportional (ratio 75)", |bencher| {
        bencher.iter(|| compress_payload(&payload, 75).unwrap());
    });

    criterion.bench_function("transform aggressive (ratio 20)", |bencher| {
        bencher.iter(|| compress_payload(&payload, 20).unwrap());
    });
}

criterion::criterion_group!(benches, benchmark_sampling_clock, benchmark_transform_stage);
criterion::criterion_main!(benches);

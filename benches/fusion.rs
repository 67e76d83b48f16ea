//! Benchmarks for the hot paths of a prediction.
//!
//! ```bash
//! cargo bench --bench fusion
//! ```

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use mood_fusion::{
    audio::{AudioEmbedder, PrototypeLibrary, SpectralEmbedder},
    classify::softmax_with_temperature,
    config::Config,
    fusion::fuse,
    pipeline::MoodPipeline,
    vision::PrecomputedScores,
};

fn bench_fuse(c: &mut Criterion) {
    let p_image: [f32; 5] = [0.7, 0.1, 0.1, 0.05, 0.05];
    let p_audio: [f32; 5] = [0.1, 0.6, 0.1, 0.1, 0.1];

    c.bench_function("fuse_5_labels", |b| {
        b.iter(|| fuse(black_box(&p_image), black_box(&p_audio), black_box(0.6)))
    });

    c.bench_function("softmax_5_labels", |b| {
        b.iter(|| softmax_with_temperature(black_box(&[0.9f32, 0.1, -0.3, 0.5, 0.0][..]), black_box(0.1)))
    });
}

fn bench_embed(c: &mut Criterion) {
    let embedder = SpectralEmbedder::new();
    let wave = PrototypeLibrary::new().synthesize("energetic").expect("energetic prototype");

    c.bench_function("spectral_embed_2s", |b| {
        b.iter(|| embedder.embed(black_box(&wave.samples), wave.sample_rate))
    });
}

fn bench_prediction(c: &mut Criterion) {
    let pipeline = MoodPipeline::<Vec<f32>>::new(
        &Config::default(),
        Arc::new(PrecomputedScores),
        Arc::new(SpectralEmbedder::new()),
    )
    .expect("default pipeline");
    pipeline.classifier().warm_up().expect("prototype warm-up");

    let image: Vec<f32> = vec![0.7, 0.1, 0.1, 0.05, 0.05];
    let wave = PrototypeLibrary::new().synthesize("calm").expect("calm prototype");

    c.bench_function("predict_image_audio_warm", |b| {
        b.iter(|| pipeline.predict_image_audio(black_box(&image), black_box(&wave), 0.6))
    });
}

criterion_group!(benches, bench_fuse, bench_embed, bench_prediction);
criterion_main!(benches);

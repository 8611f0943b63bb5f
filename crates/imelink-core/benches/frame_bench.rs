//! Criterion benchmarks for the IMELink line codec.
//!
//! Measures encode and decode latency per frame kind. The codec sits on the
//! per-keystroke path, so regressions here translate directly into typing
//! latency.
//!
//! Run with:
//! ```bash
//! cargo bench --package imelink-core --bench frame_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imelink_core::{decode_frame, encode_frame, Frame, ImeState};

// ── Frame fixtures ────────────────────────────────────────────────────────────

fn fixtures() -> Vec<(&'static str, Frame)> {
    vec![
        ("state", Frame::State(ImeState::Active)),
        ("text_short", Frame::Text("hello".to_string())),
        ("text_utf8", Frame::Text("héllo こんにちは".to_string())),
        ("text_paragraph", Frame::Text("lorem ipsum ".repeat(40))),
        ("backspace", Frame::Backspace),
        ("clear", Frame::Clear),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_frame");
    for (name, frame) in fixtures() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &frame, |b, frame| {
            b.iter(|| encode_frame(black_box(frame)));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_frame");
    for (name, frame) in fixtures() {
        let line = encode_frame(&frame);
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, line| {
            b.iter(|| decode_frame(black_box(line)));
        });
    }
    // Worst case for the fallback path: a line matching no literal.
    let garbage = "X".repeat(256);
    group.bench_with_input(
        BenchmarkId::from_parameter("unknown"),
        &garbage,
        |b, line| {
            b.iter(|| decode_frame(black_box(line)));
        },
    );
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);

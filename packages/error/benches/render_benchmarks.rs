//! Rendering cost per verbosity tier
//!
//! Info and Verbose never capture frames; Debug and Trace walk the stack
//! through the default resolver.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use strata_error::{Error, Renderer, Verbosity};

fn sample() -> Error {
    Error::new(10, ["error message", "error details", "error hint"]).wrap(Error::new(
        2,
        ["wrapped error message", "wrapped error details"],
    ))
}

fn benchmark_render_text(c: &mut Criterion) {
    let e = sample();
    let mut group = c.benchmark_group("render_text");

    for tier in Verbosity::ALL {
        let renderer = Renderer::new(tier);
        group.bench_with_input(BenchmarkId::from_parameter(tier), &e, |b, e| {
            b.iter(|| std::hint::black_box(renderer.render(e)));
        });
    }
    group.finish();
}

fn benchmark_render_json(c: &mut Criterion) {
    let e = sample();
    let mut group = c.benchmark_group("render_json");

    for tier in Verbosity::ALL {
        let renderer = Renderer::new(tier);
        group.bench_with_input(BenchmarkId::from_parameter(tier), &e, |b, e| {
            b.iter(|| {
                let json = renderer.to_json(e).expect("record encodes");
                std::hint::black_box(json);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_render_text, benchmark_render_json);
criterion_main!(benches);

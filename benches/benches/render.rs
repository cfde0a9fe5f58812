//! Benchmark template rendering time.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tagmold::{Engine, Mode, Options};

use benches::context;

criterion_main! { benches }
criterion_group! { benches, bench_init, bench_render, bench_render_users }

/// Benchmarks the time taken to create a new instance of the engine.
fn bench_init(c: &mut Criterion) {
    c.bench_function("init", |b| b.iter(Engine::new));
}

/// Benchmarks the time taken to render each template in its mode.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");

    let ctx = context::random(150);

    for (name, mode, source) in [
        ("sql", Mode::Sql, benches::SQL),
        ("json", Mode::Json, benches::JSON),
    ] {
        g.bench_function(name, |b| {
            let source = benches::repeat(source, 20);
            let engine = Engine::with_options(Options::builder().mode(mode).build());
            b.iter(|| engine.render(&source, &ctx).unwrap());
        });
    }
}

/// Benchmarks how rendering scales with the size of the loop collection.
fn bench_render_users(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_users");

    let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
    for n in [10, 100, 1000] {
        let ctx = context::random(n);
        g.bench_with_input(BenchmarkId::from_parameter(n), &ctx, |b, ctx| {
            b.iter(|| engine.render(benches::SQL, ctx).unwrap());
        });
    }
}

// Benchmark for a full generation pass and ConfigObj rendering
// Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use cape_defaults::board::FixedRevisions;
use cape_defaults::config::RevisionSettings;
use cape_defaults::{generate, writer};

fn bench_generate(c: &mut Criterion) {
    let resolver = FixedRevisions::new(Some("0B3A"), Some("00A0"));
    let settings = RevisionSettings::default();
    c.bench_function("generate 8-axis default config", |b| {
        b.iter(|| {
            let generated = generate(&resolver, &settings).unwrap();
            assert_eq!(generated.heaters.len(), 6);
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let generated =
        generate(&FixedRevisions::new(Some("0B3A"), Some("00A0")), &RevisionSettings::default())
            .unwrap();
    c.bench_function("render default config as cfg", |b| {
        b.iter(|| writer::render_cfg(&generated.document));
    });
}

criterion_group!(benches, bench_generate, bench_render);
criterion_main!(benches);

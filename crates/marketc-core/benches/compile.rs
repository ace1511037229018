use criterion::{black_box, criterion_group, criterion_main, Criterion};

const REFERENCE: &str = r#"market "Will ETH reach $5000 in 2024?" {
    outcomes: Yes, No;
    oracle: 0x1234567890123456789012345678901234567890;
    fee: 1%;
    trading_mechanism: pool;
}
"#;

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("parse", |b| {
        b.iter(|| marketc_core::parser::parse(black_box(REFERENCE)))
    });

    let ast = marketc_core::parser::parse(REFERENCE).expect("reference parses");
    c.bench_function("validate", |b| {
        b.iter(|| marketc_core::validator::validate(black_box(&ast)))
    });

    let model = marketc_core::validator::validate(&ast).expect("reference validates");
    c.bench_function("generate", |b| {
        b.iter(|| marketc_core::codegen::generate(black_box(&model)))
    });

    c.bench_function("compile", |b| {
        b.iter(|| marketc_core::compile(black_box(REFERENCE)))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};

use slants_core::{codec::decode_clues, solve, SolveOptions};

fn bench_solve(c: &mut Criterion) {
    let clues = decode_clues("c120a0b21h3a2114f3a2b2a4b2110a1a1b1c2132d1b1a33a1a1c0b", 8, 8)
        .expect("reference clue string");

    c.bench_function("solve 8x8 reference", |b| {
        b.iter(|| solve(&clues, 8, 8, &SolveOptions::default()).unwrap())
    });

    c.bench_function("solve 8x8 paper rules", |b| {
        let options = SolveOptions {
            for_generation: true,
            ..SolveOptions::default()
        };
        b.iter(|| solve(&clues, 8, 8, &options).unwrap())
    });
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use venue_core::{default_tiers, ProjectionInput, Scenario, SeatTier};

fn wide_tiers(n: usize) -> Vec<SeatTier> {
    // n equal shares of 1/n, last tier absorbing the remainder.
    let each = Decimal::ONE / Decimal::from(n as u64);
    let mut tiers: Vec<SeatTier> = (0..n)
        .map(|i| SeatTier::new(format!("Block {i}"), Decimal::from(20 + i as u64), each))
        .collect();
    let assigned = each * Decimal::from((n - 1) as u64);
    if let Some(last) = tiers.last_mut() {
        last.share = Decimal::ONE - assigned;
    }
    tiers
}

fn bench_projection(c: &mut Criterion) {
    let stock = ProjectionInput::new(65_000, Scenario::Nominal, default_tiers());
    c.bench_function("project stock 4 tiers", |b| {
        b.iter(|| venue_econ::project(black_box(&stock)))
    });

    let wide = ProjectionInput::new(80_000, Scenario::Derby, wide_tiers(64));
    c.bench_function("project 64 tiers", |b| {
        b.iter(|| venue_econ::project(black_box(&wide)))
    });

    c.bench_function("capacity slider sweep", |b| {
        b.iter(|| {
            for capacity in (40_000..=80_000).step_by(1_000) {
                let input = ProjectionInput::new(capacity, Scenario::Rainy, default_tiers());
                let _ = black_box(venue_econ::project(&input));
            }
        })
    });
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);

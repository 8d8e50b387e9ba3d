use blend_calc::{PlanningCalculator, PriceSweep};
use blend_core::{PlanningConfig, ScenarioParameters};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

fn bench_reference_plan(c: &mut Criterion) {
    let calculator = PlanningCalculator::new();
    let params = ScenarioParameters::new(Decimal::from(150));

    c.bench_function("calculate_reference_plan", |b| {
        b.iter(|| calculator.calculate(black_box(&params)))
    });
}

fn bench_price_sweep(c: &mut Criterion) {
    let sweep = PriceSweep::new(PlanningConfig::reference());
    let prices = PriceSweep::price_grid(Decimal::ZERO, Decimal::from(300), Decimal::from(10));

    c.bench_function("price_sweep_0_300", |b| b.iter(|| sweep.run(black_box(&prices))));
}

criterion_group!(benches, bench_reference_plan, bench_price_sweep);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use roi_core::{default_scenarios, CurvePolicy, ForecastInputs, ValueMode};
use rust_decimal::Decimal;

fn base_inputs(horizon_months: u32) -> ForecastInputs {
    ForecastInputs {
        monthly_revenue: Decimal::new(420_000, 0),
        gross_margin_percent: Decimal::new(45, 0),
        monthly_investment: Decimal::new(5_000, 0),
        target_lift_percent: Decimal::new(20, 0),
        horizon_months,
        value_mode: ValueMode::Profit,
    }
}

fn bench_projection(c: &mut Criterion) {
    let discrete = roi_forecast::ForecastEngine::new(CurvePolicy::Discrete);
    let linear = roi_forecast::ForecastEngine::new(CurvePolicy::Linear);
    let scenarios = default_scenarios();
    let year = base_inputs(12);
    let decade = base_inputs(120);

    c.bench_function("three scenarios x 12m discrete", |b| {
        b.iter(|| {
            let _ = black_box(discrete.project_scenarios(&year, &scenarios));
        })
    });
    c.bench_function("three scenarios x 12m linear", |b| {
        b.iter(|| {
            let _ = black_box(linear.project_scenarios(&year, &scenarios));
        })
    });
    c.bench_function("single scenario x 120m discrete", |b| {
        b.iter(|| {
            let _ = black_box(discrete.project(&decade));
        })
    });
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);

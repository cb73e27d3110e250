use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use riverwatch::{plan_blocks, Span};

fn bench_planner(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    c.bench_function("plan_blocks_52_weeks", |b| {
        b.iter(|| plan_blocks(black_box(now), black_box(Span::Weeks(52))))
    });
    c.bench_function("plan_blocks_365_days", |b| {
        b.iter(|| plan_blocks(black_box(now), black_box(Span::Days(365))))
    });
}

criterion_group!(benches, bench_planner);
criterion_main!(benches);

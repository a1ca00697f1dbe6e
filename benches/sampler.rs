use chrono::{Duration, TimeDelta, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meteo_sampler::{
    CalendarPeriod, CalendarWindow, Sampler, SamplingSpec, WeatherRecord, WeatherTable,
};

/// Thirty days of hourly rows with a daily temperature cycle.
fn hourly_table() -> WeatherTable {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..24 * 30)
        .map(|i| {
            let hour = (i % 24) as f64;
            WeatherRecord::new()
                .with("date", start + Duration::hours(i))
                .with("duration", TimeDelta::hours(1))
                .with("T", 5.0 + (hour / 24.0 * std::f64::consts::TAU).sin() * 6.0)
                .with("Wind", 2.5)
                .with("Rh", 0.7)
                .with("Ri_SW_f", if (6.0..18.0).contains(&hour) { 350.0 } else { 0.0 })
                .with("Precipitations", 0.1)
        })
        .collect()
}

fn bench_sampler(c: &mut Criterion) {
    let table = hourly_table();
    let rolling = SamplingSpec::rolling(24.0).unwrap();
    let daily = SamplingSpec::calendar(
        CalendarWindow::builder()
            .period(CalendarPeriod::Day)
            .build()
            .unwrap(),
    );

    c.bench_function("materialize_rolling_24h", |b| {
        b.iter(|| {
            let mut sampler = Sampler::builder().table(&table).memoize(false).build().unwrap();
            sampler.materialize(black_box(&[rolling]), None).unwrap()
        })
    });
    c.bench_function("materialize_calendar_day", |b| {
        b.iter(|| {
            let mut sampler = Sampler::builder().table(&table).memoize(false).build().unwrap();
            sampler.materialize(black_box(&[daily]), None).unwrap()
        })
    });

    let mut warm = Sampler::from_table(&table);
    warm.materialize(&[rolling], None).unwrap();
    c.bench_function("sample_cached", |b| {
        b.iter(|| warm.sample(black_box(360), &rolling, None).unwrap())
    });
}

criterion_group!(benches, bench_sampler);
criterion_main!(benches);

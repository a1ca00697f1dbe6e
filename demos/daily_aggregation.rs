//! Aggregates two days of half-hourly observations to daily and 3-hourly steps,
//! then prints the daily result as a polars frame.

use chrono::{Duration, TimeDelta, TimeZone, Utc};
use meteo_sampler::{
    default_transforms, merge_transforms, CalendarPeriod, CalendarWindow, Completeness,
    RadiationMode, Reducer, Sampler, SamplerError, SamplingSpec, SourceTable, TransformInput,
    TransformRule, WeatherRecord, WeatherTable,
};
use std::env;

fn main() -> Result<(), SamplerError> {
    configure_polars_display();

    let start = Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap();
    let table: WeatherTable = (0..96)
        .map(|i| {
            let hour = i as f64 / 2.0 % 24.0;
            WeatherRecord::new()
                .with("date", start + Duration::minutes(30 * i))
                .with("duration", TimeDelta::minutes(30))
                .with("T", 14.0 + 0.5 * hour)
                .with("Wind", 1.5)
                .with("Rh", 0.8 - 0.01 * hour)
                .with("Ri_SW_f", if (6.0..20.0).contains(&hour) { 400.0 } else { 0.0 })
                .with("Precipitations", if i % 7 == 0 { 0.4 } else { 0.0 })
        })
        .collect();

    // Also keep the maximum wind speed of each window.
    let rules = merge_transforms(
        default_transforms(RadiationMode::EnergySum),
        [TransformRule::new("Windmax", "Wind", Reducer::Max)],
    );
    let mut sampler = Sampler::builder()
        .table(&table)
        .transforms(TransformInput::Rules(rules))
        .build()?;

    let daily = SamplingSpec::calendar(
        CalendarWindow::builder()
            .period(CalendarPeriod::Day)
            .completeness(Completeness::Strict)
            .build()?,
    );
    let three_hourly = SamplingSpec::rolling(6.0)?;

    let tables = sampler.materialize(&[daily, three_hourly], None)?;
    for (spec, aggregated) in &tables {
        println!("{}: {} records", spec, aggregated.len());
    }

    let first_day = sampler.sample(1, &daily, None)?;
    println!(
        "Day 1: Tmin {:?}, Tmax {:?}, shortwave energy {:?} MJ m-2",
        first_day.get_f64("Tmin"),
        first_day.get_f64("Tmax"),
        first_day.get_f64("Ri_SW_f"),
    );

    println!("{}", tables[&daily].to_dataframe()?);
    println!("{:?}", sampler.stats());
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "10");
}

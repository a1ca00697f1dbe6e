//! Conversion between polars frames and [`WeatherTable`]s.
//!
//! Column names become variable names. Nulls become missing variables, so a
//! frame with sparse columns yields records that simply lack those entries.

pub mod error;

use crate::frame::error::FrameError;
use crate::types::record::WeatherRecord;
use crate::types::table::WeatherTable;
use crate::types::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use log::warn;
use polars::prelude::{Column, DataFrame, DataType, LazyFrame, NamedFrom, Series, TimeUnit};
use std::collections::BTreeSet;

/// Days from 0001-01-01 to 1970-01-01, the epoch of polars `Date` columns.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub trait WeatherFrameExt {
    /// Reads every row of the frame into a [`WeatherTable`].
    ///
    /// Float and integer columns map to `Value::Float` and `Value::Int`,
    /// `Datetime`, `Date` and `Duration` columns to their chrono equivalents,
    /// `String` and `Boolean` columns to text and booleans. Columns of any
    /// other type are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::DataFrameProcessing`] if polars fails to read or
    /// cast a column, and [`FrameError::OutOfRangeTime`] for temporal values
    /// chrono cannot represent.
    fn to_weather_table(&self) -> Result<WeatherTable, FrameError>;
}

impl WeatherFrameExt for DataFrame {
    fn to_weather_table(&self) -> Result<WeatherTable, FrameError> {
        let mut rows = vec![WeatherRecord::new(); self.height()];
        for column in self.get_columns() {
            let Some(values) = read_column(column)? else {
                warn!(
                    "Skipping column '{}' with unsupported type {}",
                    column.name(),
                    column.dtype()
                );
                continue;
            };
            let name = column.name().to_string();
            for (row, value) in rows.iter_mut().zip(values) {
                if let Some(value) = value {
                    row.insert(name.clone(), value);
                }
            }
        }
        Ok(WeatherTable::new(rows))
    }
}

impl WeatherFrameExt for LazyFrame {
    fn to_weather_table(&self) -> Result<WeatherTable, FrameError> {
        self.clone().collect()?.to_weather_table()
    }
}

type ColumnValues = Vec<Option<Value>>;

fn read_column(column: &Column) -> Result<Option<ColumnValues>, FrameError> {
    let name = column.name().as_str();
    let values = match column.dtype() {
        DataType::Boolean => column.bool()?.into_iter().map(|v| v.map(Value::Bool)).collect(),
        DataType::String => column.str()?.into_iter().map(|v| v.map(Value::from)).collect(),
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = column.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .map(|v| {
                    v.map(|v| {
                        timestamp(v, unit)
                            .map(Value::Timestamp)
                            .ok_or_else(|| out_of_range(name, v))
                    })
                    .transpose()
                })
                .collect::<Result<_, _>>()?
        }
        DataType::Date => {
            let physical = column.cast(&DataType::Int32)?;
            physical
                .i32()?
                .into_iter()
                .map(|v| {
                    v.map(|v| {
                        v.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                            .and_then(NaiveDate::from_num_days_from_ce_opt)
                            .map(Value::Date)
                            .ok_or_else(|| out_of_range(name, i64::from(v)))
                    })
                    .transpose()
                })
                .collect::<Result<_, _>>()?
        }
        DataType::Duration(unit) => {
            let unit = *unit;
            let physical = column.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .map(|v| {
                    v.map(|v| {
                        time_delta(v, unit)
                            .map(Value::Duration)
                            .ok_or_else(|| out_of_range(name, v))
                    })
                    .transpose()
                })
                .collect::<Result<_, _>>()?
        }
        dtype if dtype.is_float() => {
            let physical = column.cast(&DataType::Float64)?;
            physical.f64()?.into_iter().map(|v| v.map(Value::Float)).collect()
        }
        dtype if dtype.is_integer() => {
            let physical = column.cast(&DataType::Int64)?;
            physical.i64()?.into_iter().map(|v| v.map(Value::Int)).collect()
        }
        _ => return Ok(None),
    };
    Ok(Some(values))
}

fn timestamp(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }
}

fn time_delta(value: i64, unit: TimeUnit) -> Option<TimeDelta> {
    match unit {
        TimeUnit::Nanoseconds => Some(TimeDelta::nanoseconds(value)),
        TimeUnit::Microseconds => Some(TimeDelta::microseconds(value)),
        TimeUnit::Milliseconds => TimeDelta::try_milliseconds(value),
    }
}

fn out_of_range(column: &str, value: i64) -> FrameError {
    FrameError::OutOfRangeTime {
        column: column.to_string(),
        value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Float,
    Int,
    Bool,
    Text,
    Timestamp,
    Date,
    Duration,
}

impl ColumnKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Float(_) => ColumnKind::Float,
            Value::Int(_) => ColumnKind::Int,
            Value::Bool(_) => ColumnKind::Bool,
            Value::Text(_) => ColumnKind::Text,
            Value::Timestamp(_) => ColumnKind::Timestamp,
            Value::Date(_) => ColumnKind::Date,
            Value::Duration(_) => ColumnKind::Duration,
        }
    }
}

impl WeatherTable {
    /// Writes the table as a polars frame, one column per variable name
    /// (sorted), with nulls where a record lacks that variable.
    ///
    /// Timestamps are written as UTC `Datetime` and durations as `Duration`,
    /// both in milliseconds. A column holding both integers and floats is
    /// written as `Float64`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MixedTypes`] when a variable holds values of
    /// incompatible types across records.
    pub fn to_dataframe(&self) -> Result<DataFrame, FrameError> {
        let names: BTreeSet<&str> = self.iter().flat_map(|record| record.names()).collect();
        let columns = names
            .into_iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DataFrame::new(columns)?)
    }

    fn column(&self, name: &str) -> Result<Column, FrameError> {
        let values: Vec<Option<&Value>> = self.iter().map(|record| record.get(name)).collect();

        let mut kind: Option<(ColumnKind, &Value)> = None;
        for &value in values.iter().flatten() {
            let next = ColumnKind::of(value);
            kind = match kind {
                None => Some((next, value)),
                Some((current, _)) if current == next => kind,
                Some((ColumnKind::Int, _)) | Some((ColumnKind::Float, _))
                    if matches!(next, ColumnKind::Int | ColumnKind::Float) =>
                {
                    Some((ColumnKind::Float, value))
                }
                Some((_, first)) => {
                    return Err(FrameError::MixedTypes {
                        column: name.to_string(),
                        first: first.type_name(),
                        other: value.type_name(),
                    })
                }
            };
        }

        let series = match kind.map(|(kind, _)| kind).unwrap_or(ColumnKind::Float) {
            ColumnKind::Float => {
                let floats: Vec<Option<f64>> =
                    values.iter().map(|v| v.and_then(Value::as_f64)).collect();
                Series::new(name.into(), floats)
            }
            ColumnKind::Int => {
                let ints: Vec<Option<i64>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Int(i)) => Some(*i),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), ints)
            }
            ColumnKind::Bool => {
                let bools: Vec<Option<bool>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Bool(b)) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), bools)
            }
            ColumnKind::Text => {
                let texts: Vec<Option<&str>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Text(s)) => Some(s.as_str()),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), texts)
            }
            ColumnKind::Timestamp => {
                let millis: Vec<Option<i64>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Timestamp(dt)) => Some(dt.timestamp_millis()),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            }
            ColumnKind::Date => {
                let days: Vec<Option<i32>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Date(d)) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), days).cast(&DataType::Date)?
            }
            ColumnKind::Duration => {
                let millis: Vec<Option<i64>> = values
                    .iter()
                    .map(|v| match v {
                        Some(Value::Duration(d)) => Some(d.num_milliseconds()),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), millis).cast(&DataType::Duration(TimeUnit::Milliseconds))?
            }
        };
        Ok(Column::from(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use chrono::TimeZone;
    use polars::prelude::IntoLazy;

    #[test]
    fn test_dataframe_to_weather_table() -> Result<(), Box<dyn std::error::Error>> {
        let df = DataFrame::new(vec![
            Column::new("T".into(), [20.5f64, 21.0]),
            Column::new("Rh".into(), [Some(0.5f32), None]),
            Column::new("station".into(), ["a", "b"]),
            Column::new("count".into(), [3u32, 4]),
        ])?;

        let table = df.to_weather_table()?;
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].get_f64("T"), Some(20.5));
        assert_eq!(table.rows()[0].get_f64("Rh"), Some(0.5));
        assert!(!table.rows()[1].contains("Rh"));
        assert_eq!(table.rows()[1].get("station"), Some(&Value::from("b")));
        assert_eq!(table.rows()[1].get("count"), Some(&Value::Int(4)));
        Ok(())
    }

    #[test]
    fn test_temporal_columns_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        let table: WeatherTable = (0..3)
            .map(|i| {
                record! {
                    "date" => start + TimeDelta::minutes(30 * i),
                    "duration" => TimeDelta::minutes(30),
                    "day" => start.date_naive(),
                    "T" => 18.0 + i as f64,
                }
            })
            .collect();

        let df = table.to_dataframe()?;
        assert_eq!(df.height(), 3);
        assert_eq!(
            df.column("date")?.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(
            df.column("duration")?.dtype(),
            &DataType::Duration(TimeUnit::Milliseconds)
        );
        assert_eq!(df.column("day")?.dtype(), &DataType::Date);

        assert_eq!(df.to_weather_table()?, table);
        assert_eq!(df.lazy().to_weather_table()?, table);
        Ok(())
    }

    #[test]
    fn test_sparse_and_promoted_columns() -> Result<(), Box<dyn std::error::Error>> {
        let table = WeatherTable::new(vec![
            record! { "T" => 1.5, "n" => 2 },
            record! { "n" => 3.5 },
        ]);
        let df = table.to_dataframe()?;
        assert_eq!(df.column("n")?.dtype(), &DataType::Float64);
        assert_eq!(df.column("T")?.null_count(), 1);

        let back = df.to_weather_table()?;
        assert_eq!(back.rows()[0].get_f64("n"), Some(2.0));
        assert!(!back.rows()[1].contains("T"));
        Ok(())
    }

    #[test]
    fn test_mixed_types_are_rejected() {
        let table = WeatherTable::new(vec![record! { "T" => 1.0 }, record! { "T" => "warm" }]);
        let err = table.to_dataframe().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MixedTypes { first: "float", other: "text", .. }
        ));
    }
}

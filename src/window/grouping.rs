//! Whole-table grouping of rows into civil periods, built once per calendar window.

use crate::types::duration::duration_seconds;
use crate::types::table::SourceTable;
use crate::window::calendar::{CalendarWindow, Completeness, PeriodAnchor};
use crate::window::error::WindowError;
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Tolerance (seconds) when comparing a period's covered duration to its civil length.
const COMPLETENESS_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct PeriodGroup {
    key: NaiveDate,
    /// 1-based steps of the rows in this period, in table order.
    members: Vec<usize>,
    total_seconds: f64,
    expected_seconds: f64,
}

impl PeriodGroup {
    fn is_complete(&self) -> bool {
        self.total_seconds + COMPLETENESS_TOLERANCE >= self.expected_seconds
    }
}

/// Rows of one source table grouped by the civil period of a [`CalendarWindow`].
///
/// A single O(n) pass over the table answers every later query for this
/// window; the grouping is never mutated after it is built.
#[derive(Debug, Clone)]
pub struct CalendarGrouping {
    window: CalendarWindow,
    /// Groups in ascending period order.
    groups: Vec<PeriodGroup>,
    /// Per row (0-based), the index into `groups` of its own period.
    row_periods: Vec<usize>,
}

impl CalendarGrouping {
    /// Groups every row of `table` by the period of its `date` field.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::MissingDate`] if any row lacks a `date` holding a
    /// timestamp or a date.
    pub fn build<T: SourceTable + ?Sized>(
        table: &T,
        window: CalendarWindow,
    ) -> Result<Self, WindowError> {
        let period = window.period();
        let mut by_key: BTreeMap<NaiveDate, (Vec<usize>, f64)> = BTreeMap::new();

        for step in 1..=table.len() {
            let row = table.row(step).ok_or(WindowError::MissingDate { step })?;
            let date = row
                .get("date")
                .and_then(|v| v.as_date())
                .ok_or(WindowError::MissingDate { step })?;
            let key = period.key(date, window.week_start());
            let entry = by_key.entry(key).or_insert_with(|| (Vec::new(), 0.0));
            entry.0.push(step);
            entry.1 += duration_seconds(row.get("duration"));
        }

        let groups: Vec<PeriodGroup> = by_key
            .into_iter()
            .map(|(key, (members, total_seconds))| PeriodGroup {
                key,
                members,
                total_seconds,
                expected_seconds: period.expected_seconds(key),
            })
            .collect();

        // Every step lands in exactly one group, so each slot is written once.
        let mut row_periods = vec![0; table.len()];
        for (index, group) in groups.iter().enumerate() {
            for &step in &group.members {
                row_periods[step - 1] = index;
            }
        }

        debug!(
            "Built calendar grouping for {}: {} rows in {} periods",
            window,
            table.len(),
            groups.len()
        );

        Ok(Self {
            window,
            groups,
            row_periods,
        })
    }

    pub fn window(&self) -> &CalendarWindow {
        &self.window
    }

    /// Number of distinct periods in the table.
    pub fn period_count(&self) -> usize {
        self.groups.len()
    }

    /// The 1-based source rows to aggregate for `step`.
    ///
    /// # Errors
    ///
    /// Under [`Completeness::Strict`], returns [`WindowError::NoPeriodAvailable`]
    /// when the anchor points before the first period, and
    /// [`WindowError::IncompletePeriod`] when the selected period does not cover
    /// its full civil length. `AllowPartial` falls back to `[step]` and accepts
    /// partial periods.
    pub fn select(&self, step: usize) -> Result<Vec<usize>, WindowError> {
        let Some(&own) = step.checked_sub(1).and_then(|i| self.row_periods.get(i)) else {
            return Ok(vec![step]);
        };
        let selected = match self.window.anchor() {
            PeriodAnchor::CurrentPeriod => Some(own),
            PeriodAnchor::PreviousCompletePeriod => own.checked_sub(1),
        };
        let strict = self.window.completeness() == Completeness::Strict;

        let Some(group) = selected.map(|i| &self.groups[i]) else {
            if strict {
                return Err(WindowError::NoPeriodAvailable {
                    step,
                    period: self.groups[own].key,
                });
            }
            return Ok(vec![step]);
        };

        if strict && !group.is_complete() {
            return Err(WindowError::IncompletePeriod {
                step,
                period: group.key,
                seconds: group.total_seconds,
                expected: group.expected_seconds,
            });
        }
        Ok(group.members.clone())
    }

    /// Whether the period selected for `step` covers its full civil length.
    /// `None` when no period is selected.
    pub fn is_complete(&self, step: usize) -> Option<bool> {
        let own = *self.row_periods.get(step.checked_sub(1)?)?;
        let selected = match self.window.anchor() {
            PeriodAnchor::CurrentPeriod => own,
            PeriodAnchor::PreviousCompletePeriod => own.checked_sub(1)?,
        };
        Some(self.groups[selected].is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::WeatherRecord;
    use crate::types::table::WeatherTable;
    use crate::window::calendar::CalendarPeriod;
    use chrono::{Duration, TimeDelta, TimeZone, Utc};

    fn hourly_table(start: chrono::DateTime<Utc>, hours: usize) -> WeatherTable {
        (0..hours)
            .map(|h| {
                WeatherRecord::new()
                    .with("date", start + Duration::hours(h as i64))
                    .with("duration", TimeDelta::hours(1))
                    .with("T", h as f64)
            })
            .collect()
    }

    fn window(
        period: CalendarPeriod,
        anchor: PeriodAnchor,
        completeness: Completeness,
    ) -> CalendarWindow {
        CalendarWindow::builder()
            .period(period)
            .anchor(anchor)
            .completeness(completeness)
            .build()
            .unwrap()
    }

    #[test]
    fn test_day_groups_current_period() -> Result<(), WindowError> {
        let table = hourly_table(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), 48);
        let grouping = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Day, PeriodAnchor::CurrentPeriod, Completeness::Strict),
        )?;
        assert_eq!(grouping.period_count(), 2);
        for step in [1, 12, 24] {
            assert_eq!(grouping.select(step)?, (1..=24).collect::<Vec<_>>());
        }
        for step in [25, 30, 48] {
            assert_eq!(grouping.select(step)?, (25..=48).collect::<Vec<_>>());
        }
        Ok(())
    }

    #[test]
    fn test_unordered_rows_map_to_their_own_period() -> Result<(), WindowError> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        // Days 3, 1, 2, 1 in table order.
        let table: WeatherTable = [50, 2, 30, 5]
            .into_iter()
            .map(|h| {
                WeatherRecord::new()
                    .with("date", start + Duration::hours(h))
                    .with("duration", TimeDelta::hours(1))
            })
            .collect();
        let grouping = CalendarGrouping::build(
            &table,
            window(
                CalendarPeriod::Day,
                PeriodAnchor::CurrentPeriod,
                Completeness::AllowPartial,
            ),
        )?;
        assert_eq!(grouping.period_count(), 3);
        assert_eq!(grouping.select(1)?, vec![1]);
        assert_eq!(grouping.select(2)?, vec![2, 4]);
        assert_eq!(grouping.select(3)?, vec![3]);
        assert_eq!(grouping.select(4)?, vec![2, 4]);

        let previous = CalendarGrouping::build(
            &table,
            window(
                CalendarPeriod::Day,
                PeriodAnchor::PreviousCompletePeriod,
                Completeness::AllowPartial,
            ),
        )?;
        assert_eq!(previous.select(1)?, vec![3]);
        assert_eq!(previous.select(3)?, vec![2, 4]);
        assert_eq!(previous.select(4)?, vec![4]);
        Ok(())
    }

    #[test]
    fn test_previous_period_anchor() -> Result<(), WindowError> {
        let table = hourly_table(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(), 48);

        let partial = CalendarGrouping::build(
            &table,
            window(
                CalendarPeriod::Day,
                PeriodAnchor::PreviousCompletePeriod,
                Completeness::AllowPartial,
            ),
        )?;
        assert_eq!(partial.select(30)?, (1..=24).collect::<Vec<_>>());
        assert_eq!(partial.select(5)?, vec![5]);
        assert_eq!(partial.is_complete(5), None);

        let strict = CalendarGrouping::build(
            &table,
            window(
                CalendarPeriod::Day,
                PeriodAnchor::PreviousCompletePeriod,
                Completeness::Strict,
            ),
        )?;
        assert_eq!(strict.select(48)?, (1..=24).collect::<Vec<_>>());
        assert!(matches!(
            strict.select(5),
            Err(WindowError::NoPeriodAvailable { step: 5, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_incomplete_period_is_strict_error() -> Result<(), WindowError> {
        // Starts at 06:00, so the first day only covers 18 hours.
        let table = hourly_table(Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap(), 42);
        let strict = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Day, PeriodAnchor::CurrentPeriod, Completeness::Strict),
        )?;
        assert_eq!(strict.is_complete(1), Some(false));
        assert!(matches!(
            strict.select(1),
            Err(WindowError::IncompletePeriod { seconds, expected, .. })
                if seconds == 18.0 * 3600.0 && expected == 86_400.0
        ));
        assert_eq!(strict.select(42)?, (19..=42).collect::<Vec<_>>());

        let partial = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Day, PeriodAnchor::CurrentPeriod, Completeness::AllowPartial),
        )?;
        assert_eq!(partial.select(1)?, (1..=18).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_week_and_month_keys() -> Result<(), WindowError> {
        // 2024-01-29 (Monday) .. 2024-02-11, daily rows.
        let start = Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).unwrap();
        let table: WeatherTable = (0..14)
            .map(|d| {
                WeatherRecord::new()
                    .with("date", start + Duration::days(d))
                    .with("duration", TimeDelta::days(1))
            })
            .collect();

        let weekly = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Week, PeriodAnchor::CurrentPeriod, Completeness::Strict),
        )?;
        assert_eq!(weekly.period_count(), 2);
        assert_eq!(weekly.select(3)?, (1..=7).collect::<Vec<_>>());
        assert_eq!(weekly.select(8)?, (8..=14).collect::<Vec<_>>());

        let monthly = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Month, PeriodAnchor::CurrentPeriod, Completeness::AllowPartial),
        )?;
        assert_eq!(monthly.period_count(), 2);
        assert_eq!(monthly.select(1)?, vec![1, 2, 3]);
        assert_eq!(monthly.is_complete(1), Some(false));
        Ok(())
    }

    #[test]
    fn test_missing_date_fails_build() {
        let table = WeatherTable::new(vec![WeatherRecord::new().with("T", 1.0)]);
        let result = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Day, PeriodAnchor::CurrentPeriod, Completeness::AllowPartial),
        );
        assert_eq!(result.unwrap_err(), WindowError::MissingDate { step: 1 });
    }

    #[test]
    fn test_rows_without_duration_count_one_second() -> Result<(), WindowError> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let table: WeatherTable = (0..24)
            .map(|h| WeatherRecord::new().with("date", start + Duration::hours(h)))
            .collect();
        let strict = CalendarGrouping::build(
            &table,
            window(CalendarPeriod::Day, PeriodAnchor::CurrentPeriod, Completeness::Strict),
        )?;
        assert!(matches!(
            strict.select(1),
            Err(WindowError::IncompletePeriod { seconds, .. }) if seconds == 24.0
        ));
        Ok(())
    }
}

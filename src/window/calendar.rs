//! Civil-calendar window configuration.

use crate::types::calendar::{days_in_month, first_of_month, start_of_week, SECONDS_PER_DAY};
use crate::window::error::WindowError;
use bon::bon;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The civil period rows are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPeriod {
    Day,
    Week,
    Month,
}

/// Which period a query step aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodAnchor {
    /// The period the step itself falls in.
    #[default]
    CurrentPeriod,
    /// The period immediately before the step's own period.
    PreviousCompletePeriod,
}

/// What to do with a period whose rows do not cover its full civil length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    #[default]
    AllowPartial,
    Strict,
}

impl CalendarPeriod {
    /// Canonical key of the period containing `date`.
    pub(crate) fn key(self, date: NaiveDate, week_start: u8) -> NaiveDate {
        match self {
            CalendarPeriod::Day => date,
            CalendarPeriod::Week => start_of_week(date, week_start),
            CalendarPeriod::Month => first_of_month(date),
        }
    }

    /// Length in seconds of the full period starting at `key`.
    ///
    /// Weeks always count as 7 × 86400 s; daylight-saving shifts are not
    /// accounted for.
    pub(crate) fn expected_seconds(self, key: NaiveDate) -> f64 {
        match self {
            CalendarPeriod::Day => SECONDS_PER_DAY,
            CalendarPeriod::Week => 7.0 * SECONDS_PER_DAY,
            CalendarPeriod::Month => {
                days_in_month(key.year(), key.month()).unwrap_or(30) as f64 * SECONDS_PER_DAY
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarPeriod::Day => "day",
            CalendarPeriod::Week => "week",
            CalendarPeriod::Month => "month",
        }
    }
}

impl PeriodAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodAnchor::CurrentPeriod => "current_period",
            PeriodAnchor::PreviousCompletePeriod => "previous_complete_period",
        }
    }
}

impl Completeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Completeness::AllowPartial => "allow_partial",
            Completeness::Strict => "strict",
        }
    }
}

impl FromStr for CalendarPeriod {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(CalendarPeriod::Day),
            "week" => Ok(CalendarPeriod::Week),
            "month" => Ok(CalendarPeriod::Month),
            other => Err(WindowError::InvalidPeriod(other.to_string())),
        }
    }
}

impl FromStr for PeriodAnchor {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_period" => Ok(PeriodAnchor::CurrentPeriod),
            "previous_complete_period" => Ok(PeriodAnchor::PreviousCompletePeriod),
            other => Err(WindowError::InvalidAnchor(other.to_string())),
        }
    }
}

impl FromStr for Completeness {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_partial" => Ok(Completeness::AllowPartial),
            "strict" => Ok(Completeness::Strict),
            other => Err(WindowError::InvalidCompleteness(other.to_string())),
        }
    }
}

impl fmt::Display for CalendarPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PeriodAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window aligned on civil days, weeks or months.
///
/// All fields are validated when the window is built, so a `CalendarWindow`
/// that exists is always usable. Build one with [`CalendarWindow::builder`]:
///
/// ```
/// use meteo_sampler::{CalendarPeriod, CalendarWindow, Completeness, PeriodAnchor};
///
/// let window = CalendarWindow::builder()
///     .period(CalendarPeriod::Week)
///     .week_start(7)
///     .anchor(PeriodAnchor::PreviousCompletePeriod)
///     .completeness(Completeness::Strict)
///     .build()?;
/// assert_eq!(window.week_start(), 7);
///
/// assert!(CalendarWindow::builder().period(CalendarPeriod::Day).week_start(8).build().is_err());
/// # Ok::<(), meteo_sampler::WindowError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CalendarWindowConfig", into = "CalendarWindowConfig")]
pub struct CalendarWindow {
    period: CalendarPeriod,
    anchor: PeriodAnchor,
    week_start: u8,
    completeness: Completeness,
}

#[bon]
impl CalendarWindow {
    /// Builds a validated calendar window.
    ///
    /// Defaults: `anchor = CurrentPeriod`, `week_start = 1` (Monday),
    /// `completeness = AllowPartial`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidWeekStart`] if `week_start` is outside `1..=7`.
    #[builder]
    pub fn new(
        period: CalendarPeriod,
        #[builder(default)] anchor: PeriodAnchor,
        #[builder(default = 1)] week_start: u8,
        #[builder(default)] completeness: Completeness,
    ) -> Result<Self, WindowError> {
        if !(1..=7).contains(&week_start) {
            return Err(WindowError::InvalidWeekStart(week_start));
        }
        Ok(Self {
            period,
            anchor,
            week_start,
            completeness,
        })
    }

    /// Builds a calendar window from the snake_case names of its settings.
    ///
    /// # Errors
    ///
    /// Returns the matching `WindowError::Invalid*` variant for any unknown
    /// name or out-of-range `week_start`.
    pub fn parse(
        period: &str,
        anchor: &str,
        week_start: u8,
        completeness: &str,
    ) -> Result<Self, WindowError> {
        Self::builder()
            .period(period.parse()?)
            .anchor(anchor.parse()?)
            .week_start(week_start)
            .completeness(completeness.parse()?)
            .build()
    }

    pub fn period(&self) -> CalendarPeriod {
        self.period
    }

    pub fn anchor(&self) -> PeriodAnchor {
        self.anchor
    }

    /// First day of the week, 1 = Monday … 7 = Sunday.
    pub fn week_start(&self) -> u8 {
        self.week_start
    }

    pub fn completeness(&self) -> Completeness {
        self.completeness
    }
}

impl fmt::Display for CalendarWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "calendar({}, {}, week_start={}, {})",
            self.period, self.anchor, self.week_start, self.completeness
        )
    }
}

fn default_week_start() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalendarWindowConfig {
    period: CalendarPeriod,
    #[serde(default)]
    anchor: PeriodAnchor,
    #[serde(default = "default_week_start")]
    week_start: u8,
    #[serde(default)]
    completeness: Completeness,
}

impl TryFrom<CalendarWindowConfig> for CalendarWindow {
    type Error = WindowError;

    fn try_from(config: CalendarWindowConfig) -> Result<Self, Self::Error> {
        CalendarWindow::builder()
            .period(config.period)
            .anchor(config.anchor)
            .week_start(config.week_start)
            .completeness(config.completeness)
            .build()
    }
}

impl From<CalendarWindow> for CalendarWindowConfig {
    fn from(window: CalendarWindow) -> Self {
        Self {
            period: window.period,
            anchor: window.anchor,
            week_start: window.week_start,
            completeness: window.completeness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() -> Result<(), WindowError> {
        let window = CalendarWindow::builder()
            .period(CalendarPeriod::Day)
            .build()?;
        assert_eq!(window.anchor(), PeriodAnchor::CurrentPeriod);
        assert_eq!(window.week_start(), 1);
        assert_eq!(window.completeness(), Completeness::AllowPartial);
        Ok(())
    }

    #[test]
    fn test_invalid_week_start() {
        for week_start in [0, 8, 255] {
            let result = CalendarWindow::builder()
                .period(CalendarPeriod::Week)
                .week_start(week_start)
                .build();
            assert_eq!(result, Err(WindowError::InvalidWeekStart(week_start)));
        }
    }

    #[test]
    fn test_parse_names() -> Result<(), WindowError> {
        let window = CalendarWindow::parse("month", "previous_complete_period", 3, "strict")?;
        assert_eq!(window.period(), CalendarPeriod::Month);
        assert_eq!(window.anchor(), PeriodAnchor::PreviousCompletePeriod);
        assert_eq!(window.completeness(), Completeness::Strict);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(
            CalendarWindow::parse("fortnight", "current_period", 1, "strict"),
            Err(WindowError::InvalidPeriod("fortnight".into()))
        );
        assert_eq!(
            CalendarWindow::parse("day", "next_period", 1, "strict"),
            Err(WindowError::InvalidAnchor("next_period".into()))
        );
        assert_eq!(
            CalendarWindow::parse("day", "current_period", 1, "lenient"),
            Err(WindowError::InvalidCompleteness("lenient".into()))
        );
    }

    #[test]
    fn test_expected_seconds() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(CalendarPeriod::Day.expected_seconds(feb), 86_400.0);
        assert_eq!(CalendarPeriod::Week.expected_seconds(feb), 604_800.0);
        assert_eq!(CalendarPeriod::Month.expected_seconds(feb), 29.0 * 86_400.0);
    }

    #[test]
    fn test_serde_validates_week_start() {
        let ok: CalendarWindow =
            serde_json::from_str(r#"{"period": "week", "week_start": 7}"#).unwrap();
        assert_eq!(ok.week_start(), 7);
        assert_eq!(ok.completeness(), Completeness::AllowPartial);

        let bad = serde_json::from_str::<CalendarWindow>(r#"{"period": "week", "week_start": 9}"#);
        assert!(bad.is_err());
    }
}

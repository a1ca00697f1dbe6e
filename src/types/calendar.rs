use chrono::{Datelike, Duration, Months, NaiveDate};

pub(crate) const SECONDS_PER_DAY: f64 = 86_400.0;

/// Civil length of `month` in `year`, or `None` outside chrono's date range.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from((next - first).num_days()).ok()
}

/// The latest date on or before `date` that falls on `week_start` (1 = Monday, 7 = Sunday).
pub(crate) fn start_of_week(date: NaiveDate, week_start: u8) -> NaiveDate {
    let weekday = date.weekday().number_from_monday() as i64;
    let offset = (weekday - week_start as i64).rem_euclid(7);
    date - Duration::days(offset)
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 4), Some(30));
        assert_eq!(days_in_month(2023, 13), None);
        assert_eq!(days_in_month(2023, 0), None);
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
    }

    #[test]
    fn test_start_of_week() {
        // 2024-05-15 is a Wednesday.
        let wednesday = ymd(2024, 5, 15);
        assert_eq!(start_of_week(wednesday, 1), ymd(2024, 5, 13));
        assert_eq!(start_of_week(wednesday, 3), wednesday);
        assert_eq!(start_of_week(wednesday, 7), ymd(2024, 5, 12));
        assert_eq!(start_of_week(wednesday, 4), ymd(2024, 5, 9));
    }

    #[test]
    fn test_first_of_month() {
        assert_eq!(first_of_month(ymd(2024, 2, 29)), ymd(2024, 2, 1));
    }
}

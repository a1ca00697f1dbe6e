use crate::types::value::Value;
use chrono::TimeDelta;

/// Seconds assumed for a row whose duration is missing or not understood.
pub const FALLBACK_DURATION_SECONDS: f64 = 1.0;

/// Converts a row's `duration` field to seconds.
///
/// Numeric values are taken as seconds already; `Duration` values go through
/// their millisecond representation. Anything else (including a missing field)
/// counts as [`FALLBACK_DURATION_SECONDS`], without raising an error.
pub fn duration_seconds(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Float(v)) => *v,
        Some(Value::Int(v)) => *v as f64,
        Some(Value::Duration(d)) => d.num_milliseconds() as f64 / 1000.0,
        _ => FALLBACK_DURATION_SECONDS,
    }
}

/// Inverse of [`duration_seconds`], rounded to whole milliseconds.
///
/// Totals beyond what a `TimeDelta` can hold saturate at `TimeDelta::MIN` or
/// `TimeDelta::MAX`; NaN becomes zero.
pub(crate) fn seconds_to_duration(seconds: f64) -> TimeDelta {
    let millis = (seconds * 1000.0).round() as i64;
    TimeDelta::try_milliseconds(millis).unwrap_or(if seconds < 0.0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_seconds() {
        assert_eq!(duration_seconds(Some(&Value::Float(1800.0))), 1800.0);
        assert_eq!(duration_seconds(Some(&Value::Int(60))), 60.0);
        assert_eq!(
            duration_seconds(Some(&Value::Duration(TimeDelta::hours(1)))),
            3600.0
        );
        assert_eq!(
            duration_seconds(Some(&Value::Duration(TimeDelta::milliseconds(1500)))),
            1.5
        );
    }

    #[test]
    fn test_unknown_duration_defaults_to_one_second() {
        assert_eq!(duration_seconds(None), 1.0);
        assert_eq!(duration_seconds(Some(&Value::from("1h"))), 1.0);
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(seconds_to_duration(10800.0), TimeDelta::hours(3));
    }

    #[test]
    fn test_seconds_to_duration_saturates() {
        assert_eq!(seconds_to_duration(-1e300), TimeDelta::MIN);
        assert_eq!(seconds_to_duration(1e300), TimeDelta::MAX);
        assert_eq!(seconds_to_duration(f64::NEG_INFINITY), TimeDelta::MIN);
        assert_eq!(seconds_to_duration(f64::NAN), TimeDelta::zero());
    }
}

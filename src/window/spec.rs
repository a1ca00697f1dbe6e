//! Sampling specifications: how one output step maps onto source rows.

use crate::window::calendar::CalendarWindow;
use crate::window::error::WindowError;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects which rows feed one aggregated step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowSpec {
    /// The `dt` rows ending at the query step.
    #[default]
    Rolling,
    /// The civil day, week or month around (or before) the query step.
    Calendar(CalendarWindow),
}

/// A validated `(dt, phase, window)` triple.
///
/// `dt` and `phase` are expressed in source-table steps. Two specs with equal
/// fields are equal and hash identically, which is what the sampler's result
/// cache keys on.
///
/// `phase` is carried for identity only: it does not shift rolling window
/// indices.
///
/// # Examples
///
/// ```
/// use meteo_sampler::SamplingSpec;
///
/// let three_hourly = SamplingSpec::rolling(3.0)?;
/// assert_eq!(three_hourly, SamplingSpec::new(3.0, 0.0, Default::default())?);
/// assert!(SamplingSpec::rolling(-1.0).is_err());
/// # Ok::<(), meteo_sampler::WindowError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SamplingSpecConfig", into = "SamplingSpecConfig")]
pub struct SamplingSpec {
    dt: OrderedFloat<f64>,
    phase: OrderedFloat<f64>,
    window: WindowSpec,
}

impl SamplingSpec {
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidDt`] for a negative or non-finite `dt`,
    /// and [`WindowError::InvalidPhase`] for a non-finite `phase`.
    pub fn new(dt: f64, phase: f64, window: WindowSpec) -> Result<Self, WindowError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(WindowError::InvalidDt(dt));
        }
        if !phase.is_finite() {
            return Err(WindowError::InvalidPhase(phase));
        }
        Ok(Self {
            dt: OrderedFloat(dt),
            phase: OrderedFloat(phase),
            window,
        })
    }

    /// A trailing window of `dt` source steps with zero phase.
    pub fn rolling(dt: f64) -> Result<Self, WindowError> {
        Self::new(dt, 0.0, WindowSpec::Rolling)
    }

    /// A calendar-aligned spec. `dt` is fixed to one source step as calendar
    /// windows size themselves from the civil period.
    pub fn calendar(window: CalendarWindow) -> Self {
        Self {
            dt: OrderedFloat(1.0),
            phase: OrderedFloat(0.0),
            window: WindowSpec::Calendar(window),
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt.into_inner()
    }

    pub fn phase(&self) -> f64 {
        self.phase.into_inner()
    }

    pub fn window(&self) -> &WindowSpec {
        &self.window
    }
}

impl fmt::Display for SamplingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.window {
            WindowSpec::Rolling => write!(f, "rolling(dt={}, phase={})", self.dt, self.phase),
            WindowSpec::Calendar(window) => write!(f, "{}", window),
        }
    }
}

fn default_dt() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SamplingSpecConfig {
    #[serde(default = "default_dt")]
    dt: f64,
    #[serde(default)]
    phase: f64,
    #[serde(default)]
    window: WindowSpec,
}

impl TryFrom<SamplingSpecConfig> for SamplingSpec {
    type Error = WindowError;

    fn try_from(config: SamplingSpecConfig) -> Result<Self, Self::Error> {
        SamplingSpec::new(config.dt, config.phase, config.window)
    }
}

impl From<SamplingSpec> for SamplingSpecConfig {
    fn from(spec: SamplingSpec) -> Self {
        Self {
            dt: spec.dt(),
            phase: spec.phase(),
            window: spec.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::calendar::{CalendarPeriod, Completeness};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equal_fields_hash_identically() -> Result<(), WindowError> {
        let a = SamplingSpec::new(3.0, 0.5, WindowSpec::Rolling)?;
        let b = SamplingSpec::new(3.0, 0.5, WindowSpec::Rolling)?;
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = SamplingSpec::new(3.0, 0.0, WindowSpec::Rolling)?;
        assert_ne!(a, c);
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_dt_and_phase() {
        assert_eq!(SamplingSpec::rolling(-0.5), Err(WindowError::InvalidDt(-0.5)));
        assert!(SamplingSpec::rolling(f64::NAN).is_err());
        assert!(SamplingSpec::rolling(f64::INFINITY).is_err());
        assert!(SamplingSpec::new(1.0, f64::NAN, WindowSpec::Rolling).is_err());
        assert!(SamplingSpec::rolling(0.0).is_ok());
    }

    #[test]
    fn test_deserialize_rolling_and_calendar() -> Result<(), Box<dyn std::error::Error>> {
        let rolling: SamplingSpec = serde_json::from_str(r#"{"dt": 24.0}"#)?;
        assert_eq!(rolling, SamplingSpec::rolling(24.0)?);

        let calendar: SamplingSpec = serde_json::from_str(
            r#"{"dt": 1.0, "window": {"type": "calendar", "period": "day", "completeness": "strict"}}"#,
        )?;
        let WindowSpec::Calendar(window) = calendar.window() else {
            panic!("expected a calendar window, got {:?}", calendar.window());
        };
        assert_eq!(window.period(), CalendarPeriod::Day);
        assert_eq!(window.completeness(), Completeness::Strict);

        assert!(serde_json::from_str::<SamplingSpec>(r#"{"dt": -3.0}"#).is_err());
        Ok(())
    }

    #[test]
    fn test_serialize_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let spec = SamplingSpec::new(6.0, 1.0, WindowSpec::Rolling)?;
        let json = serde_json::to_string(&spec)?;
        assert_eq!(serde_json::from_str::<SamplingSpec>(&json)?, spec);
        Ok(())
    }
}

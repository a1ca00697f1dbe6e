//! The reducer library: folds a window of values into a single value.

use crate::reducers::custom::CustomReducer;
use crate::reducers::error::ReduceError;
use crate::types::value::Value;
use std::fmt;

/// Joules to megajoules, the energy unit used for radiation quantities.
const JOULES_TO_MEGAJOULES: f64 = 1e-6;

/// The tag of a built-in reducer.
///
/// Use [`ReducerKind::build`] to get the zero-configuration [`Reducer`] for a
/// kind. Kinds deliberately have no string parsing: reducers are picked in
/// code, never looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReducerKind {
    DurationWeightedMean,
    Mean,
    Sum,
    Min,
    Max,
    First,
    Last,
    FluxToEnergy,
}

impl ReducerKind {
    pub fn build(self) -> Reducer {
        match self {
            ReducerKind::DurationWeightedMean => Reducer::DurationWeightedMean,
            ReducerKind::Mean => Reducer::Mean,
            ReducerKind::Sum => Reducer::Sum,
            ReducerKind::Min => Reducer::Min,
            ReducerKind::Max => Reducer::Max,
            ReducerKind::First => Reducer::First,
            ReducerKind::Last => Reducer::Last,
            ReducerKind::FluxToEnergy => Reducer::FluxToEnergy,
        }
    }
}

/// Collapses the values of one variable over a sampling window.
///
/// Built-in reducers are stateless. A reducer returning `Ok(None)` means "no
/// result": the target variable is left out of the aggregated record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Reducer {
    /// `Σ(v·d) / Σd`, or the plain mean when called without durations.
    #[default]
    DurationWeightedMean,
    Mean,
    Sum,
    Min,
    Max,
    /// First value in window order. Accepts non-numeric values.
    First,
    /// Last value in window order. Accepts non-numeric values.
    Last,
    /// Integrates a flux (W m⁻²) over the window into MJ m⁻²: `Σ(v·d) × 1e-6`.
    FluxToEnergy,
    Custom(CustomReducer),
}

impl Reducer {
    /// The built-in tag, `None` for custom reducers.
    pub fn kind(&self) -> Option<ReducerKind> {
        Some(match self {
            Reducer::DurationWeightedMean => ReducerKind::DurationWeightedMean,
            Reducer::Mean => ReducerKind::Mean,
            Reducer::Sum => ReducerKind::Sum,
            Reducer::Min => ReducerKind::Min,
            Reducer::Max => ReducerKind::Max,
            Reducer::First => ReducerKind::First,
            Reducer::Last => ReducerKind::Last,
            Reducer::FluxToEnergy => ReducerKind::FluxToEnergy,
            Reducer::Custom(_) => return None,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Reducer::DurationWeightedMean => "duration_weighted_mean",
            Reducer::Mean => "mean",
            Reducer::Sum => "sum",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::First => "first",
            Reducer::Last => "last",
            Reducer::FluxToEnergy => "flux_to_energy",
            Reducer::Custom(custom) => custom.name(),
        }
    }

    /// Whether the sampler should pass per-value durations when it has them.
    pub fn prefers_durations(&self) -> bool {
        match self {
            Reducer::DurationWeightedMean | Reducer::FluxToEnergy => true,
            Reducer::Custom(custom) => custom.prefers_durations(),
            _ => false,
        }
    }

    /// Reduces `values` (with optional parallel `durations` in seconds) to one value.
    ///
    /// Numeric reducers return `Ok(None)` when any value is non-numeric or the
    /// window is empty, so a malformed column only drops its own target.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::MissingDurations`] when `FluxToEnergy` (or a
    /// duration-aware custom reducer) is called without durations.
    pub fn reduce(
        &self,
        values: &[Value],
        durations: Option<&[f64]>,
    ) -> Result<Option<Value>, ReduceError> {
        let result = match self {
            Reducer::First => return Ok(values.first().cloned()),
            Reducer::Last => return Ok(values.last().cloned()),
            Reducer::Custom(custom) => return custom.call(values, durations),
            Reducer::FluxToEnergy => {
                let durations = durations
                    .ok_or_else(|| ReduceError::MissingDurations(self.name().to_string()))?;
                numeric(values)
                    .map(|numbers| weighted_sum(&numbers, durations) * JOULES_TO_MEGAJOULES)
            }
            Reducer::DurationWeightedMean => numeric(values).and_then(|numbers| match durations {
                Some(durations) => weighted_mean(&numbers, durations),
                None => Some(mean(&numbers)),
            }),
            Reducer::Mean => numeric(values).map(|numbers| mean(&numbers)),
            Reducer::Sum => numeric(values).map(|numbers| numbers.iter().sum()),
            Reducer::Min => {
                numeric(values).and_then(|numbers| numbers.into_iter().reduce(f64::min))
            }
            Reducer::Max => {
                numeric(values).and_then(|numbers| numbers.into_iter().reduce(f64::max))
            }
        };
        Ok(result.map(Value::Float))
    }
}

impl From<ReducerKind> for Reducer {
    fn from(kind: ReducerKind) -> Self {
        kind.build()
    }
}

impl From<CustomReducer> for Reducer {
    fn from(custom: CustomReducer) -> Self {
        Reducer::Custom(custom)
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// All values as `f64`, or `None` if the window is empty or not uniformly numeric.
fn numeric(values: &[Value]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    values.iter().map(Value::as_f64).collect()
}

fn mean(numbers: &[f64]) -> f64 {
    numbers.iter().sum::<f64>() / numbers.len() as f64
}

fn weighted_sum(numbers: &[f64], durations: &[f64]) -> f64 {
    numbers.iter().zip(durations).map(|(v, d)| v * d).sum()
}

fn weighted_mean(numbers: &[f64], durations: &[f64]) -> Option<f64> {
    let total: f64 = durations.iter().take(numbers.len()).sum();
    if total == 0.0 {
        return None;
    }
    Some(weighted_sum(numbers, durations) / total)
}

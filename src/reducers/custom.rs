//! User-supplied reducer functions.

use crate::reducers::error::ReduceError;
use crate::types::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of reducer identities; never reused within a process.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

type PlainFn = dyn Fn(&[Value]) -> Option<Value> + Send + Sync;
type WeightedFn = dyn Fn(&[Value], &[f64]) -> Option<Value> + Send + Sync;

#[derive(Clone)]
enum CustomFn {
    Plain(Arc<PlainFn>),
    Weighted(Arc<WeightedFn>),
}

/// A named reducer backed by a closure.
///
/// Every constructor call assigns a fresh process-wide id. Clones share that
/// id; two separately built reducers never compare equal, even with the same
/// name, so they never share an entry in the sampler's result cache.
///
/// # Examples
///
/// ```
/// use meteo_sampler::{CustomReducer, Value};
///
/// let range = CustomReducer::new("range", |values: &[Value]| {
///     let nums: Vec<f64> = values.iter().filter_map(Value::as_f64).collect();
///     let max = nums.iter().cloned().fold(f64::MIN, f64::max);
///     let min = nums.iter().cloned().fold(f64::MAX, f64::min);
///     Some(Value::Float(max - min))
/// });
/// assert_eq!(range.name(), "range");
/// ```
#[derive(Clone)]
pub struct CustomReducer {
    id: u64,
    name: String,
    func: CustomFn,
}

impl CustomReducer {
    /// A reducer called with the windowed values only.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            id: next_id(),
            name: name.into(),
            func: CustomFn::Plain(Arc::new(func)),
        }
    }

    /// A reducer called with the windowed values and each value's duration in seconds.
    pub fn with_durations<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value], &[f64]) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            id: next_id(),
            name: name.into(),
            func: CustomFn::Weighted(Arc::new(func)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefers_durations(&self) -> bool {
        matches!(self.func, CustomFn::Weighted(_))
    }

    pub(crate) fn call(
        &self,
        values: &[Value],
        durations: Option<&[f64]>,
    ) -> Result<Option<Value>, ReduceError> {
        match (&self.func, durations) {
            (CustomFn::Plain(f), _) => Ok(f(values)),
            (CustomFn::Weighted(f), Some(durations)) => Ok(f(values, durations)),
            (CustomFn::Weighted(_), None) => Err(ReduceError::MissingDurations(self.name.clone())),
        }
    }
}

impl PartialEq for CustomReducer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CustomReducer {}

impl Hash for CustomReducer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for CustomReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomReducer")
            .field("name", &self.name)
            .field("prefers_durations", &self.prefers_durations())
            .finish()
    }
}

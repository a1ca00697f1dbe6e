//! Turns the convenient user-facing transform shapes into a canonical rule list.

use crate::reducers::custom::CustomReducer;
use crate::reducers::reducer::{Reducer, ReducerKind};
use crate::transforms::error::TransformError;
use crate::transforms::rule::TransformRule;

/// A reducer as supplied by a caller.
///
/// Names (`Named`) are representable so that they can be rejected with a
/// clear error: reducers are never looked up from strings.
#[derive(Debug, Clone)]
pub enum ReducerInput {
    Reducer(Reducer),
    Kind(ReducerKind),
    Callable(CustomReducer),
    Named(String),
}

impl ReducerInput {
    /// # Errors
    ///
    /// Returns [`TransformError::UnsupportedReducer`] for [`ReducerInput::Named`].
    pub fn resolve(self) -> Result<Reducer, TransformError> {
        match self {
            ReducerInput::Reducer(reducer) => Ok(reducer),
            ReducerInput::Kind(kind) => Ok(kind.build()),
            ReducerInput::Callable(custom) => Ok(Reducer::Custom(custom)),
            ReducerInput::Named(name) => Err(TransformError::UnsupportedReducer(format!(
                "name '{}'",
                name
            ))),
        }
    }
}

impl From<Reducer> for ReducerInput {
    fn from(reducer: Reducer) -> Self {
        ReducerInput::Reducer(reducer)
    }
}

impl From<ReducerKind> for ReducerInput {
    fn from(kind: ReducerKind) -> Self {
        ReducerInput::Kind(kind)
    }
}

impl From<CustomReducer> for ReducerInput {
    fn from(custom: CustomReducer) -> Self {
        ReducerInput::Callable(custom)
    }
}

impl From<&str> for ReducerInput {
    fn from(name: &str) -> Self {
        ReducerInput::Named(name.to_string())
    }
}

impl From<String> for ReducerInput {
    fn from(name: String) -> Self {
        ReducerInput::Named(name)
    }
}

/// A `{source, reducer}` pair for one target; both halves are optional.
///
/// A missing source means "same name as the target", a missing reducer means
/// [`Reducer::DurationWeightedMean`].
#[derive(Debug, Clone, Default)]
pub struct RuleBinding {
    source: Option<String>,
    reducer: Option<ReducerInput>,
}

impl RuleBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn reducer(mut self, reducer: impl Into<ReducerInput>) -> Self {
        self.reducer = Some(reducer.into());
        self
    }
}

/// The accepted shapes of a transform specification.
#[derive(Debug, Clone)]
pub enum TransformInput {
    /// Already canonical; copied as-is.
    Rules(Vec<TransformRule>),
    /// `target => reducer`, with the target doubling as the source.
    Reducers(Vec<(String, ReducerInput)>),
    /// `target => {source, reducer}`.
    Bindings(Vec<(String, RuleBinding)>),
}

impl TransformInput {
    pub fn reducers<S, R>(entries: impl IntoIterator<Item = (S, R)>) -> Self
    where
        S: Into<String>,
        R: Into<ReducerInput>,
    {
        TransformInput::Reducers(
            entries
                .into_iter()
                .map(|(target, reducer)| (target.into(), reducer.into()))
                .collect(),
        )
    }

    pub fn bindings<S>(entries: impl IntoIterator<Item = (S, RuleBinding)>) -> Self
    where
        S: Into<String>,
    {
        TransformInput::Bindings(
            entries
                .into_iter()
                .map(|(target, binding)| (target.into(), binding))
                .collect(),
        )
    }
}

impl From<Vec<TransformRule>> for TransformInput {
    fn from(rules: Vec<TransformRule>) -> Self {
        TransformInput::Rules(rules)
    }
}

/// Converts any [`TransformInput`] to an ordered list of [`TransformRule`]s.
///
/// Entry order is preserved: it decides both the order rules run in and the
/// identity of the rule list in the sampler's cache.
///
/// # Errors
///
/// * [`TransformError::UnsupportedReducer`] if a reducer is given by name.
/// * [`TransformError::UnsupportedShape`] if a mapping entry has an empty
///   target or an explicitly empty source.
///
/// # Examples
///
/// ```
/// use meteo_sampler::{normalize_transforms, ReducerKind, RuleBinding, TransformInput};
///
/// let rules = normalize_transforms(TransformInput::bindings([
///     ("Tmax", RuleBinding::new().source("T").reducer(ReducerKind::Max)),
///     ("Wind", RuleBinding::new()),
/// ]))?;
/// assert_eq!(rules[0].source, "T");
/// assert_eq!(rules[1].source, "Wind");
///
/// assert!(normalize_transforms(TransformInput::reducers([("T", "weighted_mean")])).is_err());
/// # Ok::<(), meteo_sampler::TransformError>(())
/// ```
pub fn normalize_transforms(input: TransformInput) -> Result<Vec<TransformRule>, TransformError> {
    match input {
        TransformInput::Rules(rules) => Ok(rules),
        TransformInput::Reducers(entries) => entries
            .into_iter()
            .map(|(target, reducer)| {
                check_target(&target)?;
                Ok(TransformRule::new(target.clone(), target, reducer.resolve()?))
            })
            .collect(),
        TransformInput::Bindings(entries) => entries
            .into_iter()
            .map(|(target, binding)| {
                check_target(&target)?;
                let source = match binding.source {
                    Some(source) if source.is_empty() => {
                        return Err(TransformError::UnsupportedShape(format!(
                            "empty source for target '{}'",
                            target
                        )))
                    }
                    Some(source) => source,
                    None => target.clone(),
                };
                let reducer = match binding.reducer {
                    Some(reducer) => reducer.resolve()?,
                    None => Reducer::DurationWeightedMean,
                };
                Ok(TransformRule::new(target, source, reducer))
            })
            .collect(),
    }
}

/// Layers `overrides` on top of `base`.
///
/// A rule whose target already exists in `base` replaces it in place, so the
/// position (and thus evaluation order) of that target is kept. Rules with new
/// targets are appended in their given order.
pub fn merge_transforms(
    base: Vec<TransformRule>,
    overrides: impl IntoIterator<Item = TransformRule>,
) -> Vec<TransformRule> {
    let mut merged = base;
    for rule in overrides {
        match merged.iter_mut().find(|r| r.target == rule.target) {
            Some(existing) => *existing = rule,
            None => merged.push(rule),
        }
    }
    merged
}

fn check_target(target: &str) -> Result<(), TransformError> {
    if target.is_empty() {
        return Err(TransformError::UnsupportedShape(
            "empty target identifier".to_string(),
        ));
    }
    Ok(())
}

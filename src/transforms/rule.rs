use crate::reducers::reducer::Reducer;
use std::fmt;

/// Binds one output variable to one input variable and a reducer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformRule {
    pub target: String,
    pub source: String,
    pub reducer: Reducer,
}

impl TransformRule {
    pub fn new(
        target: impl Into<String>,
        source: impl Into<String>,
        reducer: impl Into<Reducer>,
    ) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
            reducer: reducer.into(),
        }
    }

    /// A rule whose target keeps the source variable's name.
    pub fn same(name: impl Into<String>, reducer: impl Into<Reducer>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, reducer)
    }
}

impl fmt::Display for TransformRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}({})", self.target, self.reducer, self.source)
    }
}

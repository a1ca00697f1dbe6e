//! The `WeatherRecord` type: one row of a weather table, or one aggregated step.

use crate::types::value::Value;
use std::collections::btree_map::{self, BTreeMap};

/// An ordered mapping of variable names to values.
///
/// The same type is used for source rows and for aggregated output, so code
/// downstream of the sampler never has to care whether it is looking at raw or
/// resampled weather. Variables iterate in lexicographic order of their names,
/// which makes two records built from the same inputs structurally identical.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherRecord {
    values: BTreeMap<String, Value>,
}

impl WeatherRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a variable, returning the record for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Numeric value of a variable, `None` if absent or not numeric.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variable names, in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for WeatherRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for WeatherRecord {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a WeatherRecord {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Builds a [`WeatherRecord`] from `name => value` pairs.
///
/// ```
/// use meteo_sampler::record;
///
/// let row = record! { "T" => 21.5, "Wind" => 1.2, "Rh" => 0.6 };
/// assert_eq!(row.get_f64("T"), Some(21.5));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::WeatherRecord::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::WeatherRecord::new();
        $(record.insert($name, $value);)+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_lexicographically_ordered() {
        let record = record! { "Wind" => 1.0, "T" => 20.0, "Rh" => 0.5, "P" => 101.3 };
        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["P", "Rh", "T", "Wind"]);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a: WeatherRecord = vec![("T", 1.0), ("Rh", 0.2)].into_iter().collect();
        let b: WeatherRecord = vec![("Rh", 0.2), ("T", 1.0)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_replaces_existing() {
        let record = WeatherRecord::new().with("T", 1.0).with("T", 2.0);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get_f64("T"), Some(2.0));
    }
}

//! The source-table abstraction the sampler reads from, and its in-memory implementation.

use crate::types::record::WeatherRecord;

/// An ordered, 1-based-indexable sequence of weather records.
///
/// Step `1` is the first row. Implement this for any container that can hand
/// out `&WeatherRecord`s; [`WeatherTable`] is the default in-memory version.
pub trait SourceTable {
    /// Number of rows.
    fn len(&self) -> usize;

    /// The row at 1-based `step`, or `None` when out of range.
    fn row(&self, step: usize) -> Option<&WeatherRecord>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A plain vector of weather records.
///
/// Also the output type of [`crate::Sampler::materialize`], so an aggregated
/// table can itself be fed to another sampler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherTable {
    rows: Vec<WeatherRecord>,
}

impl WeatherTable {
    pub fn new(rows: Vec<WeatherRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[WeatherRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherRecord> {
        self.rows.iter()
    }
}

impl SourceTable for WeatherTable {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, step: usize) -> Option<&WeatherRecord> {
        self.rows.get(step.checked_sub(1)?)
    }
}

impl SourceTable for [WeatherRecord] {
    fn len(&self) -> usize {
        <[WeatherRecord]>::len(self)
    }

    fn row(&self, step: usize) -> Option<&WeatherRecord> {
        self.get(step.checked_sub(1)?)
    }
}

impl SourceTable for Vec<WeatherRecord> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn row(&self, step: usize) -> Option<&WeatherRecord> {
        self.as_slice().row(step)
    }
}

impl From<Vec<WeatherRecord>> for WeatherTable {
    fn from(rows: Vec<WeatherRecord>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<WeatherRecord> for WeatherTable {
    fn from_iter<I: IntoIterator<Item = WeatherRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for WeatherTable {
    type Item = WeatherRecord;
    type IntoIter = std::vec::IntoIter<WeatherRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

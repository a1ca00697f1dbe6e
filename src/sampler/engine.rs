use crate::error::SamplerError;
use crate::sampler::cache::{transforms_fingerprint, CacheKey, SamplerStats};
use crate::transforms::defaults::{default_transforms, RadiationMode};
use crate::transforms::normalize::{normalize_transforms, TransformInput};
use crate::transforms::rule::TransformRule;
use crate::types::duration::{duration_seconds, seconds_to_duration};
use crate::types::record::WeatherRecord;
use crate::types::table::{SourceTable, WeatherTable};
use crate::types::value::Value;
use crate::window::calendar::CalendarWindow;
use crate::window::grouping::CalendarGrouping;
use crate::window::rolling::rolling_window;
use crate::window::spec::{SamplingSpec, WindowSpec};
use bon::bon;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Atmospheric pressure (kPa) used when neither a transform nor the anchor row provides `P`.
pub const DEFAULT_PRESSURE: f64 = 101.325;

/// Variables every sampled record must carry. When no rule produced one, it is
/// copied from the anchor row.
const REQUIRED_VARIABLES: [&str; 3] = ["T", "Wind", "Rh"];

/// Aggregates rows of a fine-grained weather table into coarser records.
///
/// A sampler borrows its table for its whole life and owns two caches: one
/// [`CalendarGrouping`] per calendar window seen so far, and (when memoizing)
/// every record it has produced. Both only ever grow, so a record handed out
/// as an `Arc` stays valid and equal to any later result for the same query.
///
/// `sample` takes `&mut self`; share a sampler between threads behind a
/// `Mutex`, or give each thread its own.
///
/// # Examples
///
/// ```
/// use meteo_sampler::{record, Sampler, SamplingSpec, WeatherTable};
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let table: WeatherTable = (0..24)
///     .map(|h| {
///         record! {
///             "date" => Utc.with_ymd_and_hms(2025, 7, 1, h, 0, 0).unwrap(),
///             "duration" => TimeDelta::hours(1),
///             "T" => 15.0 + h as f64,
///             "Wind" => 2.0,
///             "Rh" => 0.6,
///         }
///     })
///     .collect();
///
/// let mut sampler = Sampler::builder().table(&table).build()?;
/// let spec = SamplingSpec::rolling(3.0)?;
/// let record = sampler.sample(5, &spec, None)?;
/// assert_eq!(record.get_f64("Tmax"), Some(19.0));
/// assert_eq!(record.get_f64("P"), Some(101.325));
/// # Ok::<(), meteo_sampler::SamplerError>(())
/// ```
#[derive(Debug)]
pub struct Sampler<'a, T: SourceTable> {
    table: &'a T,
    transforms: Vec<TransformRule>,
    transforms_fingerprint: u64,
    memoize: bool,
    groupings: HashMap<CalendarWindow, CalendarGrouping>,
    results: HashMap<CacheKey, Arc<WeatherRecord>>,
    hits: usize,
    misses: usize,
}

#[bon]
impl<'a, T: SourceTable> Sampler<'a, T> {
    /// Builds a sampler over `table`.
    ///
    /// `transforms` defaults to [`default_transforms`] for `radiation_mode`;
    /// `memoize` defaults to `true`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Transform`] when `transforms` cannot be normalized.
    #[builder]
    pub fn new(
        table: &'a T,
        transforms: Option<TransformInput>,
        #[builder(default)] radiation_mode: RadiationMode,
        #[builder(default = true)] memoize: bool,
    ) -> Result<Self, SamplerError> {
        let transforms = match transforms {
            Some(input) => normalize_transforms(input)?,
            None => default_transforms(radiation_mode),
        };
        Ok(Self::with_rules(table, transforms, memoize))
    }
}

impl<'a, T: SourceTable> Sampler<'a, T> {
    /// A memoizing sampler with the default rule set.
    pub fn from_table(table: &'a T) -> Self {
        Self::with_rules(table, default_transforms(RadiationMode::default()), true)
    }

    pub(crate) fn with_rules(table: &'a T, transforms: Vec<TransformRule>, memoize: bool) -> Self {
        Self {
            table,
            transforms_fingerprint: transforms_fingerprint(&transforms),
            transforms,
            memoize,
            groupings: HashMap::new(),
            results: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn table(&self) -> &'a T {
        self.table
    }

    /// The rule set used when `sample` is called without an override.
    pub fn transforms(&self) -> &[TransformRule] {
        &self.transforms
    }

    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    pub fn stats(&self) -> SamplerStats {
        SamplerStats {
            hits: self.hits,
            misses: self.misses,
            cached_records: self.results.len(),
            calendar_groupings: self.groupings.len(),
        }
    }

    /// Aggregates the window around `step` into one record.
    ///
    /// `transforms` overrides the sampler's rule set for this call only; it
    /// is used as given, without merging with the stored rules (see
    /// [`crate::merge_transforms`] to build an override from the defaults).
    ///
    /// The record holds one entry per rule whose source exists in at least
    /// one window row, plus `date` (from the anchor row), `duration` (sum of
    /// the rows actually aggregated), `T`, `Wind` and `Rh` (copied from the
    /// anchor row when no rule produced them) and `P` (falling back to
    /// [`DEFAULT_PRESSURE`]).
    ///
    /// # Errors
    ///
    /// * [`SamplerError::StepOutOfRange`] if `step` is not in `1..=len`.
    /// * [`SamplerError::Window`] if a calendar window cannot be built or a
    ///   strict window rejects the step.
    /// * [`SamplerError::Reduce`] if a reducer fails.
    /// * [`SamplerError::MissingRequiredVariable`] if `date`, `T`, `Wind` or
    ///   `Rh` cannot be filled.
    ///
    /// Nothing is cached when an error is returned.
    pub fn sample(
        &mut self,
        step: usize,
        spec: &SamplingSpec,
        transforms: Option<&[TransformRule]>,
    ) -> Result<Arc<WeatherRecord>, SamplerError> {
        let len = self.table.len();
        if step == 0 || step > len {
            return Err(SamplerError::StepOutOfRange { step, len });
        }

        let key = CacheKey {
            step,
            spec: *spec,
            transforms: transforms.map_or(self.transforms_fingerprint, transforms_fingerprint),
        };
        if self.memoize {
            if let Some(hit) = self.results.get(&key) {
                self.hits += 1;
                trace!("Cache hit for step {} with {}", step, spec);
                return Ok(Arc::clone(hit));
            }
        }
        self.misses += 1;
        trace!("Cache miss for step {} with {}", step, spec);

        let rows = self.window_indices(step, spec)?;
        let rules = transforms.unwrap_or(&self.transforms);
        let record = Arc::new(self.aggregate(step, &rows, rules)?);

        if self.memoize {
            self.results.insert(key, Arc::clone(&record));
        }
        Ok(record)
    }

    /// Samples every step of the table for each spec.
    ///
    /// The output maps each spec to a table with exactly one record per
    /// source row, in step order. Identical specs collapse to one entry.
    ///
    /// # Errors
    ///
    /// Fails on the first step that [`Sampler::sample`] rejects.
    pub fn materialize(
        &mut self,
        specs: &[SamplingSpec],
        transforms: Option<&[TransformRule]>,
    ) -> Result<HashMap<SamplingSpec, WeatherTable>, SamplerError> {
        let len = self.table.len();
        let mut tables = HashMap::with_capacity(specs.len());

        for spec in specs {
            if tables.contains_key(spec) {
                continue;
            }
            debug!("Materializing {} steps with {}", len, spec);
            let rows = (1..=len)
                .map(|step| {
                    self.sample(step, spec, transforms)
                        .map(|record| WeatherRecord::clone(&record))
                })
                .collect::<Result<Vec<_>, _>>()?;
            tables.insert(*spec, WeatherTable::new(rows));
        }

        debug!(
            "Materialized {} tables ({} cached records)",
            tables.len(),
            self.results.len()
        );
        Ok(tables)
    }

    /// The 1-based rows a spec selects for `step`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Window`] when a calendar grouping cannot be
    /// built or a strict window rejects the step.
    pub fn window_indices(
        &mut self,
        step: usize,
        spec: &SamplingSpec,
    ) -> Result<Vec<usize>, SamplerError> {
        match spec.window() {
            WindowSpec::Rolling => Ok(rolling_window(step, spec.dt()).collect()),
            WindowSpec::Calendar(window) => Ok(self.grouping(*window)?.select(step)?),
        }
    }

    fn grouping(&mut self, window: CalendarWindow) -> Result<&CalendarGrouping, SamplerError> {
        if !self.groupings.contains_key(&window) {
            let grouping = CalendarGrouping::build(self.table, window)?;
            self.groupings.insert(window, grouping);
        }
        Ok(&self.groupings[&window])
    }

    fn aggregate(
        &self,
        step: usize,
        rows: &[usize],
        rules: &[TransformRule],
    ) -> Result<WeatherRecord, SamplerError> {
        let anchor = self.table.row(step).ok_or(SamplerError::StepOutOfRange {
            step,
            len: self.table.len(),
        })?;

        let mut record = WeatherRecord::new();
        let mut touched = BTreeSet::new();

        for rule in rules {
            let mut values = Vec::with_capacity(rows.len());
            let mut durations = Vec::with_capacity(rows.len());
            for &i in rows {
                let Some(row) = self.table.row(i) else {
                    continue;
                };
                if let Some(value) = row.get(&rule.source) {
                    values.push(value.clone());
                    durations.push(duration_seconds(row.get("duration")));
                    touched.insert(i);
                }
            }

            if values.is_empty() {
                trace!("Skipping {}: no '{}' in window", rule.target, rule.source);
                continue;
            }

            let durations = rule
                .reducer
                .prefers_durations()
                .then_some(durations.as_slice());
            if let Some(value) = rule.reducer.reduce(&values, durations)? {
                record.insert(rule.target.clone(), value);
            }
        }

        let date = anchor
            .get("date")
            .cloned()
            .ok_or_else(|| missing("date", step))?;
        record.insert("date", date);

        let seconds: f64 = touched
            .iter()
            .filter_map(|&i| self.table.row(i))
            .map(|row| duration_seconds(row.get("duration")))
            .sum();
        record.insert("duration", seconds_to_duration(seconds));

        for variable in REQUIRED_VARIABLES {
            if !record.contains(variable) {
                let value = anchor
                    .get(variable)
                    .cloned()
                    .ok_or_else(|| missing(variable, step))?;
                record.insert(variable, value);
            }
        }

        if !record.contains("P") {
            let pressure = anchor
                .get("P")
                .cloned()
                .unwrap_or(Value::Float(DEFAULT_PRESSURE));
            record.insert("P", pressure);
        }

        Ok(record)
    }
}

fn missing(variable: &str, step: usize) -> SamplerError {
    SamplerError::MissingRequiredVariable {
        variable: variable.to_string(),
        step,
    }
}

//! JSON configuration for a sampling run.

pub mod error;

use crate::config::error::ConfigError;
use crate::sampler::engine::Sampler;
use crate::transforms::defaults::{default_transforms, RadiationMode};
use crate::transforms::rule::TransformRule;
use crate::types::table::SourceTable;
use crate::window::spec::SamplingSpec;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The sampling specs to materialize and how to build the sampler for them.
///
/// ```json
/// {
///   "specs": [
///     { "dt": 3.0 },
///     { "window": { "type": "calendar", "period": "day", "completeness": "strict" } }
///   ],
///   "radiation_mode": "energy_sum",
///   "memoize": true
/// }
/// ```
///
/// Every spec is validated while deserializing, so a config that loads is
/// ready to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    pub specs: Vec<SamplingSpec>,
    #[serde(default)]
    pub radiation_mode: RadiationMode,
    #[serde(default = "memoize_by_default")]
    pub memoize: bool,
}

fn memoize_by_default() -> bool {
    true
}

impl SamplerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config = Self::from_json_str(&json)?;
        debug!(
            "Loaded {} sampling specs from '{}'",
            config.specs.len(),
            path.display()
        );
        Ok(config)
    }

    /// The default rule set for this config's radiation mode.
    pub fn rules(&self) -> Vec<TransformRule> {
        default_transforms(self.radiation_mode)
    }

    /// A sampler over `table` using this config's rules and memoization.
    pub fn sampler<'a, T: SourceTable>(&self, table: &'a T) -> Sampler<'a, T> {
        Sampler::with_rules(table, self.rules(), self.memoize)
    }
}

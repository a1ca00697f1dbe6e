//! The default rule set used when a sampler is built without explicit transforms.

use crate::reducers::reducer::Reducer;
use crate::transforms::error::TransformError;
use crate::transforms::rule::TransformRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Variables aggregated with a duration-weighted mean: the base atmospheric
/// state plus every derived quantity of an atmospheric record.
pub const MEAN_VARIABLES: [&str; 14] = [
    "T",
    "Wind",
    "P",
    "Rh",
    "Cₐ",
    "e",
    "eₛ",
    "VPD",
    "ρ",
    "λ",
    "γ",
    "ε",
    "Δ",
    "clearness",
];

/// Radiation flux variables (W m⁻²).
pub const RADIATION_FLUXES: [&str; 5] = ["Ri_SW_f", "Ri_PAR_f", "Ri_NIR_f", "Ri_TIR_f", "Ri_custom_f"];

pub const PRECIPITATION: &str = "Precipitations";

const FLUX_SUFFIX: &str = "_f";
const QUANTITY_SUFFIX: &str = "_q";

/// How radiation fluxes are aggregated by [`default_transforms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiationMode {
    /// Duration-weighted mean flux, kept under the flux name.
    FluxMean,
    /// Flux integrated to energy (MJ m⁻²), written back under the flux name.
    EnergySum,
    /// Mean flux under the flux name, plus its energy under the `_q` companion.
    #[default]
    Both,
}

impl RadiationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadiationMode::FluxMean => "flux_mean",
            RadiationMode::EnergySum => "energy_sum",
            RadiationMode::Both => "both",
        }
    }
}

impl FromStr for RadiationMode {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flux_mean" => Ok(RadiationMode::FluxMean),
            "energy_sum" => Ok(RadiationMode::EnergySum),
            "both" => Ok(RadiationMode::Both),
            other => Err(TransformError::InvalidRadiationMode(other.to_string())),
        }
    }
}

impl fmt::Display for RadiationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The energy companion name of a flux variable: `Ri_SW_f` becomes `Ri_SW_q`.
pub fn quantity_name(flux: &str) -> String {
    let stem = flux.strip_suffix(FLUX_SUFFIX).unwrap_or(flux);
    format!("{}{}", stem, QUANTITY_SUFFIX)
}

/// The default rule set.
///
/// Duration-weighted means for [`MEAN_VARIABLES`], `Tmin`/`Tmax` and
/// `Rhmin`/`Rhmax` companions, a sum for precipitation, and radiation rules
/// chosen by `radiation_mode`.
pub fn default_transforms(radiation_mode: RadiationMode) -> Vec<TransformRule> {
    let mut rules: Vec<TransformRule> = MEAN_VARIABLES
        .iter()
        .map(|name| TransformRule::same(*name, Reducer::DurationWeightedMean))
        .collect();

    rules.extend([
        TransformRule::new("Tmin", "T", Reducer::Min),
        TransformRule::new("Tmax", "T", Reducer::Max),
        TransformRule::new("Rhmin", "Rh", Reducer::Min),
        TransformRule::new("Rhmax", "Rh", Reducer::Max),
        TransformRule::same(PRECIPITATION, Reducer::Sum),
    ]);

    for flux in RADIATION_FLUXES {
        match radiation_mode {
            RadiationMode::FluxMean => {
                rules.push(TransformRule::same(flux, Reducer::DurationWeightedMean));
            }
            RadiationMode::EnergySum => {
                rules.push(TransformRule::same(flux, Reducer::FluxToEnergy));
            }
            RadiationMode::Both => {
                rules.push(TransformRule::same(flux, Reducer::DurationWeightedMean));
                rules.push(TransformRule::new(
                    quantity_name(flux),
                    flux,
                    Reducer::FluxToEnergy,
                ));
            }
        }
    }
    rules
}

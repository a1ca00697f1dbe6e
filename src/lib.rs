mod config;
mod error;
mod frame;
mod reducers;
mod sampler;
mod transforms;
mod types;
mod window;

pub use error::SamplerError;

pub use sampler::cache::SamplerStats;
pub use sampler::engine::{Sampler, DEFAULT_PRESSURE};

pub use types::duration::{duration_seconds, FALLBACK_DURATION_SECONDS};
pub use types::record::WeatherRecord;
pub use types::table::{SourceTable, WeatherTable};
pub use types::value::Value;

pub use reducers::custom::CustomReducer;
pub use reducers::reducer::{Reducer, ReducerKind};

pub use window::calendar::{CalendarPeriod, CalendarWindow, Completeness, PeriodAnchor};
pub use window::grouping::CalendarGrouping;
pub use window::rolling::rolling_window;
pub use window::spec::{SamplingSpec, WindowSpec};

pub use transforms::defaults::{
    default_transforms, quantity_name, RadiationMode, MEAN_VARIABLES, PRECIPITATION,
    RADIATION_FLUXES,
};
pub use transforms::normalize::{
    merge_transforms, normalize_transforms, ReducerInput, RuleBinding, TransformInput,
};
pub use transforms::rule::TransformRule;

pub use config::SamplerConfig;
pub use frame::WeatherFrameExt;

pub use config::error::ConfigError;
pub use frame::error::FrameError;
pub use reducers::error::ReduceError;
pub use transforms::error::TransformError;
pub use window::error::WindowError;

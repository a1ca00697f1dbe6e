pub mod defaults;
pub mod error;
pub mod normalize;
pub mod rule;

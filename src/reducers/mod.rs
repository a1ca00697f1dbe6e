pub mod custom;
pub mod error;
pub mod reducer;

pub mod calendar;
pub mod error;
pub mod grouping;
pub mod rolling;
pub mod spec;

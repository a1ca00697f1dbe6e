pub mod calendar;
pub mod duration;
pub mod record;
pub mod table;
pub mod value;

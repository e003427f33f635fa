mod area;
mod critical_day;

pub use area::AreaEstimator;
pub use critical_day::{select_critical_day, select_from_layers, CriticalDay, CriticalDaySelector, DayArea, SkippedDay};

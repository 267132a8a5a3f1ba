pub mod period;

pub use period::{Granularity, Period, PeriodCalendar, DAY_COUNT_BASIS, MAX_HORIZON_PERIODS};

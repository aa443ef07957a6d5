//! Domain types for departures and polling windows.

mod departure;
mod direction;
mod line;
mod window;

#[cfg(test)]
pub(crate) use departure::test_support;
pub use departure::{Departure, Deviation, TransportType, sort_by_expected_time};
pub use direction::Direction;
pub use line::LineId;
pub use window::{ClockTime, DayClass, TimeError, is_between, is_time_between};

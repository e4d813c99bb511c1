//! Source of the evaluation date.

use chrono::NaiveDate;

pub trait ClockPort {
    fn today(&self) -> NaiveDate;
}

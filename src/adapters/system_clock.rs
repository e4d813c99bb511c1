//! Local wall-clock date.

use chrono::{Local, NaiveDate};

use crate::ports::clock_port::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

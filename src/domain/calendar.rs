//! Business-day calendar: Monday to Friday minus public holidays.
//!
//! The US federal holiday set is generated for a fixed year range when the
//! process starts; extra dates from configuration are merged in. The calendar
//! is immutable afterwards.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct BusinessCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl BusinessCalendar {
    /// Calendar with weekends only.
    pub fn weekends_only() -> Self {
        Self::default()
    }

    /// US federal holidays for `first_year..=last_year`, observed dates applied.
    pub fn us_federal(first_year: i32, last_year: i32) -> Self {
        let mut holidays = BTreeSet::new();
        // Next year's New Year's Day can be observed on Dec 31 of last_year.
        for year in first_year..=last_year.saturating_add(1) {
            for date in us_federal_holidays(year) {
                if date.year() >= first_year && date.year() <= last_year {
                    holidays.insert(date);
                }
            }
        }
        Self { holidays }
    }

    pub fn with_extra_holidays<I>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.holidays.extend(dates);
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// Business days in `[start, end]`, both ends included. Zero when `end < start`.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            return 0;
        }
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_business_day(*d))
            .count() as u32
    }

    pub fn holidays_in(&self, year: i32) -> Vec<NaiveDate> {
        self.holidays
            .iter()
            .copied()
            .filter(|d| d.year() == year)
            .collect()
    }

    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Federal holidays whose observance falls in or just before `year`.
fn us_federal_holidays(year: i32) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(11);

    let fixed = |month: u32, day: u32| NaiveDate::from_ymd_opt(year, month, day).map(observed);

    dates.extend(fixed(1, 1));
    dates.extend(NaiveDate::from_weekday_of_month_opt(year, 1, Weekday::Mon, 3));
    dates.extend(NaiveDate::from_weekday_of_month_opt(year, 2, Weekday::Mon, 3));
    dates.extend(last_weekday_of_month(year, 5, Weekday::Mon));
    if year >= 2021 {
        dates.extend(fixed(6, 19));
    }
    dates.extend(fixed(7, 4));
    dates.extend(NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1));
    dates.extend(NaiveDate::from_weekday_of_month_opt(year, 10, Weekday::Mon, 2));
    dates.extend(fixed(11, 11));
    dates.extend(NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Thu, 4));
    dates.extend(fixed(12, 25));

    dates
}

/// Saturday holidays move to Friday, Sunday holidays to Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.pred_opt().unwrap_or(date),
        Weekday::Sun => date.succ_opt().unwrap_or(date),
        _ => date,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut day = first_of_next.checked_sub_days(Days::new(1))?;
    while day.weekday() != weekday {
        day = day.pred_opt()?;
    }
    Some(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn us_federal_2024() {
        let cal = BusinessCalendar::us_federal(2024, 2024);
        assert_eq!(
            cal.holidays_in(2024),
            vec![
                date(2024, 1, 1),
                date(2024, 1, 15),
                date(2024, 2, 19),
                date(2024, 5, 27),
                date(2024, 6, 19),
                date(2024, 7, 4),
                date(2024, 9, 2),
                date(2024, 10, 14),
                date(2024, 11, 11),
                date(2024, 11, 28),
                date(2024, 12, 25),
            ]
        );
    }

    #[test]
    fn saturday_holiday_observed_friday() {
        // 2026-07-04 is a Saturday.
        let cal = BusinessCalendar::us_federal(2026, 2026);
        assert!(cal.is_holiday(date(2026, 7, 3)));
        assert!(!cal.is_holiday(date(2026, 7, 4)));
    }

    #[test]
    fn sunday_holiday_observed_monday() {
        // 2023-01-01 is a Sunday.
        let cal = BusinessCalendar::us_federal(2023, 2023);
        assert!(cal.is_holiday(date(2023, 1, 2)));
    }

    #[test]
    fn new_year_observed_on_previous_december() {
        // 2022-01-01 is a Saturday, observed 2021-12-31.
        let cal = BusinessCalendar::us_federal(2021, 2021);
        assert!(cal.is_holiday(date(2021, 12, 31)));
    }

    #[test]
    fn juneteenth_only_from_2021() {
        let cal = BusinessCalendar::us_federal(2020, 2021);
        assert!(!cal.is_holiday(date(2020, 6, 19)));
        assert!(cal.is_holiday(date(2021, 6, 18)));
    }

    #[test]
    fn weekend_days_are_not_business_days() {
        let cal = BusinessCalendar::weekends_only();
        assert!(!cal.is_business_day(date(2024, 3, 9)));
        assert!(!cal.is_business_day(date(2024, 3, 10)));
        assert!(cal.is_business_day(date(2024, 3, 11)));
    }

    #[test]
    fn count_spans_weekend() {
        let cal = BusinessCalendar::weekends_only();
        // Fri 2024-03-08 .. Tue 2024-03-12 → Fri, Mon, Tue
        assert_eq!(cal.business_days_between(date(2024, 3, 8), date(2024, 3, 12)), 3);
    }

    #[test]
    fn count_excludes_holidays() {
        let cal = BusinessCalendar::us_federal(2024, 2024);
        // Mon 2024-07-01 .. Fri 2024-07-05 minus Thu July 4th
        assert_eq!(cal.business_days_between(date(2024, 7, 1), date(2024, 7, 5)), 4);
    }

    #[test]
    fn count_is_zero_when_end_before_start() {
        let cal = BusinessCalendar::weekends_only();
        assert_eq!(cal.business_days_between(date(2024, 3, 12), date(2024, 3, 11)), 0);
    }

    #[test]
    fn count_single_day() {
        let cal = BusinessCalendar::weekends_only();
        assert_eq!(cal.business_days_between(date(2024, 3, 11), date(2024, 3, 11)), 1);
        assert_eq!(cal.business_days_between(date(2024, 3, 9), date(2024, 3, 9)), 0);
    }

    #[test]
    fn extra_holidays_are_merged() {
        let cal = BusinessCalendar::weekends_only().with_extra_holidays([date(2025, 1, 9)]);
        assert!(cal.is_holiday(date(2025, 1, 9)));
        assert!(!cal.is_business_day(date(2025, 1, 9)));
        assert_eq!(cal.holiday_count(), 1);
    }
}

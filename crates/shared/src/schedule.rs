//! Weekly schedule resolution.
//!
//! An exercise prescribed `n` times a week is spread as evenly as possible
//! across a fixed 7 day week: session `i` lands on day `floor(i * 7 / n)`.
//! The mapping is a pure function of the frequency and the day of the week so
//! every caller that needs to know what is due (daily checklist, statistics,
//! reminders) gets the same answer.
//!
//! Days of the week are numbered from Sunday (`0`) to Saturday (`6`) and are
//! only ever derived from a calendar date via [`day_of_week`].

use chrono::{Datelike, NaiveDate};

use crate::model::Exercise;

pub const DAYS_PER_WEEK: u32 = 7;

/// Day of the week for a calendar date, `0 = Sunday ... 6 = Saturday`
pub fn day_of_week(date: &NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Whether an exercise with the given weekly frequency is scheduled on
/// `day_of_week`.
///
/// A frequency of 7 or more means every day. A frequency of 0 is never valid
/// and is rejected before an exercise is stored, it is treated as "never due"
/// here rather than dividing by zero.
pub fn is_due(frequency_per_week: u32, day_of_week: u32) -> bool {
    if frequency_per_week >= DAYS_PER_WEEK {
        return true;
    }
    if frequency_per_week == 0 {
        return false;
    }

    let interval = f64::from(DAYS_PER_WEEK) / f64::from(frequency_per_week);
    (0..frequency_per_week).any(|i| {
        let scheduled_day = (f64::from(i) * interval).floor() as u32 % DAYS_PER_WEEK;
        scheduled_day == day_of_week
    })
}

/// Whether an exercise with the given weekly frequency is scheduled on `date`
pub fn is_due_on(frequency_per_week: u32, date: &NaiveDate) -> bool {
    is_due(frequency_per_week, day_of_week(date))
}

/// The days of the week an exercise is scheduled on, in ascending order
pub fn scheduled_days(frequency_per_week: u32) -> Vec<u32> {
    (0..DAYS_PER_WEEK).filter(|d| is_due(frequency_per_week, *d)).collect()
}

impl Exercise {
    pub fn is_due_on(&self, date: &NaiveDate) -> bool {
        is_due_on(self.frequency_per_week, date)
    }
}

/// Filters the catalog down to the exercises due on `date`, keeping the
/// catalog's order
pub fn due_exercises<'a, I>(exercises: I, date: &NaiveDate) -> Vec<&'a Exercise>
where
    I: IntoIterator<Item = &'a Exercise>,
{
    let day = day_of_week(date);
    exercises
        .into_iter()
        .filter(|e| is_due(e.frequency_per_week, day))
        .collect()
}

/// Number of exercises in the catalog due on `date`
pub fn expected_count<'a, I>(exercises: I, date: &NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a Exercise>,
{
    let day = day_of_week(date);
    exercises
        .into_iter()
        .filter(|e| is_due(e.frequency_per_week, day))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_or_more_is_always_due() {
        for frequency in [7, 8, 14, u32::MAX] {
            for day in 0..7 {
                assert!(is_due(frequency, day), "frequency {frequency} day {day}");
            }
        }
    }

    #[test]
    fn frequency_maps_to_exactly_that_many_days() {
        for frequency in 1..7 {
            let days = scheduled_days(frequency);
            assert_eq!(days.len() as u32, frequency, "frequency {frequency}: {days:?}");
        }
    }

    #[test]
    fn known_schedules() {
        assert_eq!(scheduled_days(1), vec![0]);
        assert_eq!(scheduled_days(2), vec![0, 3]);
        assert_eq!(scheduled_days(3), vec![0, 2, 4]);
        assert_eq!(scheduled_days(4), vec![0, 1, 3, 5]);
        assert_eq!(scheduled_days(5), vec![0, 1, 2, 4, 5]);
        assert_eq!(scheduled_days(6), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(scheduled_days(7), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn zero_frequency_is_never_due() {
        assert!(scheduled_days(0).is_empty());
    }

    #[test]
    fn day_of_week_counts_from_sunday() {
        // 2024-03-03 was a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(day_of_week(&sunday), 0);
        assert_eq!(day_of_week(&sunday.succ_opt().unwrap()), 1);
        assert_eq!(day_of_week(&NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), 6);
    }

    #[test]
    fn filters_catalog_by_date() {
        let daily = Exercise::for_test("Bridge", 3, 10, 7);
        let twice = Exercise::for_test("Clamshell", 2, 15, 2);
        let catalog = vec![daily.clone(), twice.clone()];

        let sunday = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();

        assert_eq!(due_exercises(&catalog, &sunday), vec![&daily, &twice]);
        assert_eq!(due_exercises(&catalog, &monday), vec![&daily]);
        assert_eq!(due_exercises(&catalog, &wednesday), vec![&daily, &twice]);
        assert_eq!(expected_count(&catalog, &wednesday), 2);
        assert_eq!(expected_count(&Vec::<Exercise>::new(), &wednesday), 0);
    }
}

//! Adherence statistics over a range of calendar days.
//!
//! Everything here is a pure function of its inputs. The caller decides what
//! "today" is, nothing reads the clock, so the same catalog and logs always
//! produce the same numbers.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    model::{DailyLog, Exercise},
    schedule::{expected_count, DAYS_PER_WEEK},
    types::Uuid,
};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateRangeError {
    #[error("Range ends on {end} before it starts on {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("Looking back {days} days from {end} leaves the calendar")]
    OutOfCalendar { end: NaiveDate, days: u32 },
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if end < start {
            return Err(DateRangeError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// `[end - days, end]`, so `days + 1` calendar days
    pub fn looking_back(end: NaiveDate, days: u32) -> Result<Self, DateRangeError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or(DateRangeError::OutOfCalendar { end, days })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between the first and last day
    pub fn span_days(&self) -> u32 {
        (self.end - self.start).num_days() as u32
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    /// Every day in the range, oldest first
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub completion_rate: u32,
    pub completed: u32,
    pub expected: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStat {
    pub id: Uuid,
    pub name: String,
    pub completed: u32,
    pub expected: u32,
    pub rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceStats {
    pub daily_series: Vec<DailyStat>,
    pub current_streak: u32,
    pub overall_rate: u32,
    pub total_completed: u32,
    pub total_expected: u32,
    pub per_exercise: Vec<ExerciseStat>,
}

/// `round(100 * completed / expected)` rounding halves up, 0 when nothing was
/// expected
pub fn percentage(completed: u32, expected: u32) -> u32 {
    if expected == 0 {
        return 0;
    }
    (f64::from(completed) * 100.0 / f64::from(expected)).round() as u32
}

/// Sessions expected of one exercise over `span_days`,
/// `ceil(span_days / 7 * frequency)`
pub fn expected_sessions(span_days: u32, frequency_per_week: u32) -> u32 {
    let sessions = u64::from(span_days) * u64::from(frequency_per_week);
    sessions.div_ceil(u64::from(DAYS_PER_WEEK)) as u32
}

/// Consecutive fully completed days ending at `today`, scanning backwards.
/// Days after `today` are ignored. An unfinished `today` doesn't count but
/// doesn't end the streak either, any earlier day that isn't fully complete
/// does.
pub fn current_streak(daily_series: &[DailyStat], today: &NaiveDate) -> u32 {
    let mut streak = 0;
    for day in daily_series.iter().rev() {
        if day.date > *today {
            continue;
        }
        if day.expected > 0 && day.completed == day.expected {
            streak += 1;
        } else if day.date < *today {
            break;
        }
    }
    streak
}

/// Builds the adherence report for `range`. Logs outside the range are
/// ignored, the order of both slices doesn't matter.
pub fn aggregate(
    range: &DateRange,
    today: &NaiveDate,
    exercises: &[Exercise],
    logs: &[DailyLog],
) -> AdherenceStats {
    let completed_logs = logs
        .iter()
        .filter(|l| l.completed && range.contains(&l.date))
        .collect::<Vec<_>>();

    let mut completed_by_date: HashMap<NaiveDate, u32> = HashMap::new();
    let mut completed_by_exercise: HashMap<Uuid, u32> = HashMap::new();
    for log in &completed_logs {
        *completed_by_date.entry(log.date).or_default() += 1;
        *completed_by_exercise.entry(log.exercise_id).or_default() += 1;
    }

    let daily_series = range
        .days()
        .map(|date| {
            let expected = expected_count(exercises, &date);
            let completed = completed_by_date.get(&date).copied().unwrap_or(0);
            DailyStat { date, completion_rate: percentage(completed, expected), completed, expected }
        })
        .collect::<Vec<_>>();

    let total_completed = completed_logs.len() as u32;
    let total_expected = daily_series.iter().map(|d| d.expected).sum();

    let span_days = range.span_days();
    let per_exercise = exercises
        .iter()
        .map(|e| {
            let completed = completed_by_exercise.get(&e.id).copied().unwrap_or(0);
            let expected = expected_sessions(span_days, e.frequency_per_week);
            ExerciseStat {
                id: e.id,
                name: e.name.clone(),
                completed,
                expected,
                rate: percentage(completed, expected),
            }
        })
        .collect();

    AdherenceStats {
        current_streak: current_streak(&daily_series, today),
        overall_rate: percentage(total_completed, total_expected),
        total_completed,
        total_expected,
        per_exercise,
        daily_series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        crate::parse_calendar_date(s).unwrap()
    }

    fn done(exercise: &Exercise, day: &str) -> DailyLog {
        DailyLog::record(exercise, date(day), exercise.sets)
    }

    fn partial(exercise: &Exercise, day: &str) -> DailyLog {
        DailyLog::record(exercise, date(day), exercise.sets - 1)
    }

    #[test]
    fn rejects_backwards_range() {
        assert_eq!(
            DateRange::new(date("2024-03-05"), date("2024-03-04")),
            Err(DateRangeError::EndBeforeStart { start: date("2024-03-05"), end: date("2024-03-04") })
        );
        let single = DateRange::new(date("2024-03-05"), date("2024-03-05")).unwrap();
        assert_eq!(single.days().count(), 1);
        assert_eq!(single.span_days(), 0);
    }

    #[test]
    fn looking_back_includes_both_ends() {
        let range = DateRange::looking_back(date("2024-03-10"), 3).unwrap();
        assert_eq!(range.start(), date("2024-03-07"));
        assert_eq!(
            range.days().collect::<Vec<_>>(),
            vec![date("2024-03-07"), date("2024-03-08"), date("2024-03-09"), date("2024-03-10")]
        );
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn expected_sessions_rounds_up() {
        assert_eq!(expected_sessions(30, 3), 13);
        assert_eq!(expected_sessions(30, 7), 30);
        assert_eq!(expected_sessions(14, 2), 4);
        assert_eq!(expected_sessions(1, 1), 1);
        assert_eq!(expected_sessions(0, 5), 0);
    }

    #[test]
    fn three_complete_days_make_a_streak_of_three() {
        let daily = Exercise::for_test("Bridges", 3, 10, 7);
        let range = DateRange::new(date("2024-03-04"), date("2024-03-06")).unwrap();
        let logs = ["2024-03-04", "2024-03-05", "2024-03-06"]
            .into_iter()
            .map(|d| done(&daily, d))
            .collect::<Vec<_>>();

        let stats = aggregate(&range, &date("2024-03-06"), &[daily], &logs);
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.overall_rate, 100);
        assert_eq!(stats.total_completed, 3);
        assert_eq!(stats.total_expected, 3);
        assert!(stats.daily_series.iter().all(|d| d.completion_rate == 100));
    }

    #[test]
    fn unfinished_today_keeps_the_streak() {
        let daily = Exercise::for_test("Bridges", 3, 10, 7);
        let range = DateRange::new(date("2024-03-04"), date("2024-03-06")).unwrap();
        let logs = vec![
            done(&daily, "2024-03-04"),
            done(&daily, "2024-03-05"),
            partial(&daily, "2024-03-06"),
        ];

        let stats = aggregate(&range, &date("2024-03-06"), &[daily], &logs);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_completed, 2);
        assert_eq!(stats.overall_rate, 67);
        assert_eq!(stats.daily_series[2].completion_rate, 0);
    }

    #[test]
    fn missed_past_day_ends_the_streak() {
        let daily = Exercise::for_test("Bridges", 3, 10, 7);
        let range = DateRange::new(date("2024-03-03"), date("2024-03-06")).unwrap();
        let logs = vec![done(&daily, "2024-03-03"), done(&daily, "2024-03-05"), done(&daily, "2024-03-06")];

        let stats = aggregate(&range, &date("2024-03-06"), &[daily], &logs);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn future_days_are_skipped() {
        let daily = Exercise::for_test("Bridges", 3, 10, 7);
        let range = DateRange::new(date("2024-03-04"), date("2024-03-08")).unwrap();
        let logs = vec![done(&daily, "2024-03-04"), done(&daily, "2024-03-05")];

        let stats = aggregate(&range, &date("2024-03-05"), &[daily], &logs);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn rest_day_is_never_counted() {
        // Once a week lands on Sunday, so Monday 2024-03-04 has nothing due
        let weekly = Exercise::for_test("Stretch", 1, 1, 1);
        let range = DateRange::new(date("2024-03-03"), date("2024-03-04")).unwrap();
        let logs = vec![done(&weekly, "2024-03-03")];

        let stats = aggregate(&range, &date("2024-03-04"), &[weekly.clone()], &logs);
        let monday = &stats.daily_series[1];
        assert_eq!(monday.expected, 0);
        assert_eq!(monday.completion_rate, 0);
        // Rest day today neither counts nor breaks, Sunday still does
        assert_eq!(stats.current_streak, 1);

        // A rest day in the past stops the scan
        let range = DateRange::new(date("2024-03-03"), date("2024-03-05")).unwrap();
        let stats = aggregate(&range, &date("2024-03-05"), &[weekly], &logs);
        assert_eq!(stats.current_streak, 0);
    }

    #[test]
    fn logs_outside_range_are_ignored() {
        let daily = Exercise::for_test("Bridges", 3, 10, 7);
        let range = DateRange::new(date("2024-03-04"), date("2024-03-05")).unwrap();
        let logs = vec![done(&daily, "2024-03-01"), done(&daily, "2024-03-05"), done(&daily, "2024-03-09")];

        let stats = aggregate(&range, &date("2024-03-05"), &[daily], &logs);
        assert_eq!(stats.total_completed, 1);
        assert_eq!(stats.per_exercise[0].completed, 1);
    }

    #[test]
    fn per_exercise_uses_span() {
        let thrice = Exercise::for_test("Clamshells", 2, 15, 3);
        let today = date("2024-03-31");
        let range = DateRange::looking_back(today, 30).unwrap();
        let logs = vec![done(&thrice, "2024-03-03"), done(&thrice, "2024-03-06"), partial(&thrice, "2024-03-08")];

        let stats = aggregate(&range, &today, &[thrice.clone()], &logs);
        assert_eq!(stats.daily_series.len(), 31);
        assert_eq!(
            stats.per_exercise,
            vec![ExerciseStat { id: thrice.id, name: "Clamshells".to_owned(), completed: 2, expected: 13, rate: 15 }]
        );
    }

    #[test]
    fn empty_inputs_are_zero() {
        let range = DateRange::new(date("2024-03-04"), date("2024-03-10")).unwrap();
        let stats = aggregate(&range, &date("2024-03-10"), &[], &[]);
        assert_eq!(stats.daily_series.len(), 7);
        assert!(stats.daily_series.iter().all(|d| d.expected == 0 && d.completion_rate == 0));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.overall_rate, 0);
        assert_eq!(stats.total_expected, 0);
        assert!(stats.per_exercise.is_empty());
    }

    #[test]
    fn aggregate_is_idempotent() {
        let exercises = vec![Exercise::for_test("Bridges", 3, 10, 7), Exercise::for_test("Clamshells", 2, 15, 3)];
        let logs = vec![done(&exercises[0], "2024-03-04"), done(&exercises[1], "2024-03-04")];
        let range = DateRange::new(date("2024-03-01"), date("2024-03-07")).unwrap();

        let a = aggregate(&range, &date("2024-03-07"), &exercises, &logs);
        let b = aggregate(&range, &date("2024-03-07"), &exercises, &logs);
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_camel_case() {
        let range = DateRange::new(date("2024-03-04"), date("2024-03-04")).unwrap();
        let json = serde_json::to_value(aggregate(&range, &date("2024-03-04"), &[], &[])).unwrap();
        assert!(json.get("dailySeries").is_some());
        assert!(json.get("currentStreak").is_some());
        assert!(json.get("perExercise").is_some());
        assert_eq!(json["dailySeries"][0]["completionRate"], 0);
        assert_eq!(json["dailySeries"][0]["date"], "2024-03-04");
    }
}

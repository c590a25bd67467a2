//! Deciding whether a reminder should go out and what it should list

use chrono::{DateTime, Utc};
use deadpool_sqlite::Object;
use shared::{
    api::{error::ServerError, payloads::CronSkipReason},
    model::{Exercise, ExerciseOrder, ReminderSettings, ReminderSettingsError},
    schedule::due_exercises,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ReminderDecision<'a> {
    Skip(CronSkipReason),
    Send { to: &'a str, exercises: Vec<&'a Exercise> },
}

/// Works out what to do at `now`. The send window is only checked when
/// `enforce_window` is set, manual sends ignore it. Due exercises are resolved
/// against the calendar date in the reminder's own timezone
pub fn decide_reminder<'a>(
    settings: &'a ReminderSettings,
    exercises: &'a [Exercise],
    now: DateTime<Utc>,
    enforce_window: bool,
) -> Result<ReminderDecision<'a>, ReminderSettingsError> {
    if !settings.is_configured() {
        return Ok(ReminderDecision::Skip(CronSkipReason::NotConfigured));
    }
    if enforce_window && !settings.is_within_send_window(now)? {
        return Ok(ReminderDecision::Skip(CronSkipReason::NotTime));
    }

    let today = settings.local_today(now)?;
    let due = due_exercises(exercises, &today);
    if due.is_empty() {
        return Ok(ReminderDecision::Skip(CronSkipReason::NoExercises));
    }

    Ok(ReminderDecision::Send { to: &settings.email, exercises: due })
}

/// Loads the settings and the whole catalog, in name order
pub async fn reminder_inputs<T>(
    conn: &Object,
) -> Result<(ReminderSettings, Vec<Exercise>), ServerError<T>>
where
    T: Send + 'static,
{
    conn.interact(|conn| {
        let settings = ReminderSettings::fetch::<T>(conn)?;
        let exercises = Exercise::fetch_all::<T>(conn, ExerciseOrder::Name)?;
        Ok::<_, ServerError<T>>((settings, exercises))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use shared::model::NewExercise;

    use super::*;

    fn exercise(name: &str, frequency_per_week: u32) -> Exercise {
        Exercise::new(NewExercise { name: name.to_owned(), sets: 3, reps: 10, frequency_per_week }).unwrap()
    }

    fn settings() -> ReminderSettings {
        ReminderSettings {
            email: "me@example.com".to_owned(),
            time: "08:30".to_owned(),
            enabled: true,
            timezone: "America/Los_Angeles".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn skips_when_not_configured() {
        let mut s = settings();
        s.enabled = false;
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 16, 30, 0).unwrap();
        assert_eq!(
            decide_reminder(&s, &[], now, true).unwrap(),
            ReminderDecision::Skip(CronSkipReason::NotConfigured)
        );
    }

    #[test]
    fn skips_outside_window_unless_manual() {
        let exercises = vec![exercise("Bridges", 7)];
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 20, 0, 0).unwrap();
        assert_eq!(
            decide_reminder(&settings(), &exercises, now, true).unwrap(),
            ReminderDecision::Skip(CronSkipReason::NotTime)
        );
        assert!(matches!(
            decide_reminder(&settings(), &exercises, now, false).unwrap(),
            ReminderDecision::Send { .. }
        ));
    }

    #[test]
    fn uses_local_date_for_schedule() {
        // Once a week means Sundays. 2024-03-04 02:00 UTC is still Sunday
        // evening in Los Angeles
        let weekly = vec![exercise("Long stretch", 1)];
        let sunday_evening = Utc.with_ymd_and_hms(2024, 3, 4, 2, 0, 0).unwrap();
        let reminder_settings = settings();
        let decision = decide_reminder(&reminder_settings, &weekly, sunday_evening, false).unwrap();
        assert_eq!(
            decision,
            ReminderDecision::Send { to: "me@example.com", exercises: vec![&weekly[0]] }
        );

        let monday_morning = Utc.with_ymd_and_hms(2024, 3, 4, 16, 30, 0).unwrap();
        assert_eq!(
            decide_reminder(&settings(), &weekly, monday_morning, true).unwrap(),
            ReminderDecision::Skip(CronSkipReason::NoExercises)
        );
    }
}

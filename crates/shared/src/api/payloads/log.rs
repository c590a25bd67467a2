use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LenientCount;
use crate::{
    api::error::ValidationError,
    model::{DailyLog, Exercise},
    parse_calendar_date,
    types::Uuid,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogQuery {
    pub date: Option<String>,
}

impl LogQuery {
    pub fn date(&self) -> Result<NaiveDate, ValidationError> {
        parse_required_date("date", self.date.as_deref())
    }
}

pub(crate) fn parse_required_date(field: &str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::new(format!("{field} is required")))?;
    parse_calendar_date(value)
        .map_err(|_| ValidationError::new(format!("{field} must be a YYYY-MM-DD date, got {value:?}")))
}

/// A due exercise together with the day's progress on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub exercise_id: Uuid,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub sets_completed: u32,
    pub completed: bool,
}

impl LogEntry {
    pub fn new(exercise: &Exercise, log: Option<&DailyLog>) -> Self {
        Self {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
            sets: exercise.sets,
            reps: exercise.reps,
            sets_completed: log.map_or(0, |l| l.sets_completed),
            completed: log.map_or(false, |l| l.completed),
        }
    }
}

/// Any `completed` flag the client sends is ignored, the server works it out
/// from the sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogRequest {
    pub date: Option<String>,
    pub exercise_id: Option<Uuid>,
    pub sets_completed: Option<LenientCount>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogUpdate {
    pub date: NaiveDate,
    pub exercise_id: Uuid,
    pub sets_completed: u32,
}

impl TryFrom<UpdateLogRequest> for LogUpdate {
    type Error = ValidationError;

    fn try_from(request: UpdateLogRequest) -> Result<Self, Self::Error> {
        let exercise_id = request
            .exercise_id
            .ok_or_else(|| ValidationError::new("exerciseId is required"))?;
        Ok(Self {
            date: parse_required_date("date", request.date.as_deref())?,
            exercise_id,
            sets_completed: request.sets_completed.map_or(0, LenientCount::to_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_requires_a_plain_date() {
        assert!(LogQuery::default().date().is_err());
        assert!(LogQuery { date: Some("03/05/2024".to_owned()) }.date().is_err());
        assert_eq!(
            LogQuery { date: Some("2024-03-05".to_owned()) }.date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn entry_defaults_without_log() {
        let exercise = Exercise::for_test("Bridges", 3, 10, 7);
        let entry = LogEntry::new(&exercise, None);
        assert_eq!(entry.sets_completed, 0);
        assert!(!entry.completed);

        let log = DailyLog::record(&exercise, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 3);
        let entry = LogEntry::new(&exercise, Some(&log));
        assert_eq!(entry.sets_completed, 3);
        assert!(entry.completed);
    }

    #[test]
    fn update_ignores_client_completed_flag() {
        let id = Uuid::new_v4();
        let request: UpdateLogRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-03-05",
            "exerciseId": id.to_string(),
            "setsCompleted": 2,
            "completed": true,
        }))
        .unwrap();
        let update = LogUpdate::try_from(request).unwrap();
        assert_eq!(update.exercise_id, id);
        assert_eq!(update.sets_completed, 2);
    }

    #[test]
    fn update_requires_date_and_exercise() {
        let request = UpdateLogRequest { date: Some("2024-03-05".to_owned()), ..Default::default() };
        assert!(LogUpdate::try_from(request).is_err());

        let request = UpdateLogRequest { exercise_id: Some(Uuid::new_v4()), ..Default::default() };
        assert!(LogUpdate::try_from(request).is_err());
    }
}

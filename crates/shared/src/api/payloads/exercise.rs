use serde::{Deserialize, Serialize};

use super::LenientCount;
use crate::{
    api::error::ValidationError,
    model::{ExerciseUpdate, NewExercise},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    pub name: Option<String>,
    pub sets: Option<LenientCount>,
    pub reps: Option<LenientCount>,
    pub frequency_per_week: Option<LenientCount>,
}

impl TryFrom<CreateExerciseRequest> for NewExercise {
    type Error = ValidationError;

    /// Fails only on missing fields, value checks happen when the exercise is
    /// built
    fn try_from(request: CreateExerciseRequest) -> Result<Self, Self::Error> {
        let missing = [
            ("name", request.name.is_none()),
            ("sets", request.sets.is_none()),
            ("reps", request.reps.is_none()),
            ("frequencyPerWeek", request.frequency_per_week.is_none()),
        ]
        .into_iter()
        .filter(|(_, missing)| *missing)
        .map(|(field, _)| format!("{field} is required"))
        .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ValidationError { error_messages: missing });
        }

        Ok(NewExercise {
            name: request.name.unwrap_or_default(),
            sets: request.sets.map_or(0, LenientCount::to_count),
            reps: request.reps.map_or(0, LenientCount::to_count),
            frequency_per_week: request.frequency_per_week.map_or(0, LenientCount::to_count),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExerciseRequest {
    pub name: Option<String>,
    pub sets: Option<LenientCount>,
    pub reps: Option<LenientCount>,
    pub frequency_per_week: Option<LenientCount>,
}

impl From<UpdateExerciseRequest> for ExerciseUpdate {
    fn from(request: UpdateExerciseRequest) -> Self {
        Self {
            name: request.name,
            sets: request.sets.map(LenientCount::to_count),
            reps: request.reps.map(LenientCount::to_count),
            frequency_per_week: request.frequency_per_week.map(LenientCount::to_count),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaQuery {
    /// `true` throws away the cache and searches again
    pub refresh: Option<String>,
}

impl MediaQuery {
    pub fn refresh(&self) -> bool {
        self.refresh.as_deref().map(str::trim) == Some("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_string_numbers() {
        let request: CreateExerciseRequest = serde_json::from_str(
            r#"{"name": "Heel raises", "sets": "3", "reps": 12, "frequencyPerWeek": "4"}"#,
        )
        .unwrap();
        let new_exercise = NewExercise::try_from(request).unwrap();
        assert_eq!(
            new_exercise,
            NewExercise { name: "Heel raises".to_owned(), sets: 3, reps: 12, frequency_per_week: 4 }
        );
    }

    #[test]
    fn create_lists_missing_fields() {
        let request: CreateExerciseRequest = serde_json::from_str(r#"{"name": "Heel raises"}"#).unwrap();
        let err = NewExercise::try_from(request).unwrap_err();
        assert_eq!(
            err.error_messages,
            vec!["sets is required", "reps is required", "frequencyPerWeek is required"]
        );
    }

    #[test]
    fn update_keeps_absent_fields_absent() {
        let request: UpdateExerciseRequest = serde_json::from_str(r#"{"frequencyPerWeek": 0}"#).unwrap();
        let update = ExerciseUpdate::from(request);
        assert_eq!(update, ExerciseUpdate { frequency_per_week: Some(0), ..Default::default() });
    }

    #[test]
    fn refresh_only_when_true() {
        assert!(MediaQuery { refresh: Some("true".to_owned()) }.refresh());
        assert!(!MediaQuery { refresh: Some("1".to_owned()) }.refresh());
        assert!(!MediaQuery::default().refresh());
    }
}

use std::collections::HashMap;

use axum::{extract::Query, Json};
use shared::{
    api::{
        error::ServerError,
        payloads::{LogEntry, LogQuery, LogUpdate, UpdateLogRequest},
        response_errors::{FetchError, LogError},
    },
    model::{DailyLog, Exercise, ExerciseOrder},
    schedule::due_exercises,
};
use tracing::{debug, instrument};

use crate::{db::DatabaseConnection, extract::JsonBody, Authenticated};

/// The day's checklist: every exercise due on `date` in name order, with
/// whatever progress has been logged against it
#[instrument(skip_all, fields(date = ?query.date))]
pub async fn list_logs(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<LogEntry>>, ServerError<FetchError>> {
    let date = query.date()?;

    let entries = conn
        .interact(move |conn| {
            let exercises = Exercise::fetch_all::<FetchError>(conn, ExerciseOrder::Name)?;
            let logs = DailyLog::fetch_for_date::<FetchError>(conn, &date)?
                .into_iter()
                .map(|l| (l.exercise_id, l))
                .collect::<HashMap<_, _>>();

            let entries = due_exercises(&exercises, &date)
                .into_iter()
                .map(|e| LogEntry::new(e, logs.get(&e.id)))
                .collect::<Vec<_>>();
            Ok::<_, ServerError<FetchError>>(entries)
        })
        .await??;
    debug!(due = entries.len());

    Ok(Json(entries))
}

/// Records progress on one exercise for one day. `completed` is worked out
/// against the exercise's sets as they are right now
#[instrument(skip_all)]
pub async fn update_log(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    JsonBody(request): JsonBody<UpdateLogRequest>,
) -> Result<Json<DailyLog>, ServerError<LogError>> {
    let LogUpdate { date, exercise_id, sets_completed } = LogUpdate::try_from(request)?;

    let log = conn
        .interact(move |conn| {
            let Some(exercise) = Exercise::fetch_maybe::<LogError>(conn, &exercise_id)? else {
                return Err(LogError::UnknownExercise { exercise_id }.into());
            };
            let log = DailyLog::upsert::<LogError>(conn, &exercise, date, sets_completed)?;
            Ok::<_, ServerError<LogError>>(log)
        })
        .await??;
    debug!(%date, %exercise_id, sets_completed, completed = log.completed, "Logged sets");

    Ok(Json(log))
}

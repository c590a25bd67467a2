use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "backend")]
use {
    crate::api::error::ServerError,
    exemplar::Model,
    rusqlite::{Connection, OptionalExtension},
    sea_query::{enum_def, Expr, OnConflict, Order, Query, SelectStatement, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

use super::Exercise;
use crate::types::Uuid;

/// Progress on one exercise for one calendar day. There is at most one log
/// per (date, exercise) pair.
///
/// `completed` is decided when the log is written, from the exercise's set
/// target at that moment. Editing the exercise later doesn't rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("daily_log"))]
#[cfg_attr(feature = "backend", check("../../../server/migrations/02-daily_log/up.sql"))]
#[cfg_attr(feature = "backend", enum_def)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: Uuid,
    pub date: NaiveDate,
    pub exercise_id: Uuid,
    pub sets_completed: u32,
    pub completed: bool,
    pub creation_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

impl DailyLog {
    /// Builds the log for `sets_completed` sets of `exercise` on `date`
    pub fn record(exercise: &Exercise, date: NaiveDate, sets_completed: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            date,
            exercise_id: exercise.id,
            sets_completed,
            completed: sets_completed >= exercise.sets,
            creation_date: now,
            last_updated_date: now,
        }
    }
}

#[cfg(feature = "backend")]
impl DailyLog {
    fn select() -> SelectStatement {
        Query::select()
            .columns([
                DailyLogIden::Id,
                DailyLogIden::Date,
                DailyLogIden::ExerciseId,
                DailyLogIden::SetsCompleted,
                DailyLogIden::Completed,
                DailyLogIden::CreationDate,
                DailyLogIden::LastUpdatedDate,
            ])
            .from(DailyLogIden::Table)
            .to_owned()
    }

    fn query_all<T>(conn: &Connection, query: &SelectStatement) -> Result<Vec<DailyLog>, ServerError<T>> {
        let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), DailyLog::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch<T>(
        conn: &Connection,
        date: &NaiveDate,
        exercise_id: &Uuid,
    ) -> Result<Option<DailyLog>, ServerError<T>> {
        let (sql, values) = Self::select()
            .and_where(Expr::col(DailyLogIden::Date).eq(*date))
            .and_where(Expr::col(DailyLogIden::ExerciseId).eq(exercise_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), DailyLog::from_row).optional()?;
        Ok(res)
    }

    /// All logs written for `date`
    pub fn fetch_for_date<T>(conn: &Connection, date: &NaiveDate) -> Result<Vec<DailyLog>, ServerError<T>> {
        let query = Self::select()
            .and_where(Expr::col(DailyLogIden::Date).eq(*date))
            .to_owned();
        Self::query_all(conn, &query)
    }

    /// All logs with `start <= date <= end`, oldest first
    pub fn fetch_between<T>(
        conn: &Connection,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<DailyLog>, ServerError<T>> {
        let query = Self::select()
            .and_where(Expr::col(DailyLogIden::Date).between(*start, *end))
            .order_by(DailyLogIden::Date, Order::Asc)
            .to_owned();
        Self::query_all(conn, &query)
    }

    /// Inserts or replaces the log for (`date`, `exercise`). The unique index
    /// on the pair resolves concurrent writers, the last one wins
    pub fn upsert<T>(
        conn: &mut Connection,
        exercise: &Exercise,
        date: NaiveDate,
        sets_completed: u32,
    ) -> Result<DailyLog, ServerError<T>> {
        let log = DailyLog::record(exercise, date, sets_completed);

        let (sql, values) = Query::insert()
            .into_table(DailyLogIden::Table)
            .columns([
                DailyLogIden::Id,
                DailyLogIden::Date,
                DailyLogIden::ExerciseId,
                DailyLogIden::SetsCompleted,
                DailyLogIden::Completed,
                DailyLogIden::CreationDate,
                DailyLogIden::LastUpdatedDate,
            ])
            .values([
                log.id.into(),
                log.date.into(),
                log.exercise_id.into(),
                log.sets_completed.into(),
                log.completed.into(),
                log.creation_date.into(),
                log.last_updated_date.into(),
            ])?
            .on_conflict(
                OnConflict::columns([DailyLogIden::Date, DailyLogIden::ExerciseId])
                    .update_columns([
                        DailyLogIden::SetsCompleted,
                        DailyLogIden::Completed,
                        DailyLogIden::LastUpdatedDate,
                    ])
                    .to_owned(),
            )
            .build_rusqlite(SqliteQueryBuilder);

        let tx = conn.transaction()?;
        let log = {
            let mut stmt = tx.prepare_cached(&sql)?;
            stmt.execute(&*values.as_params())?;
            drop(stmt);

            DailyLog::fetch::<T>(&tx, &log.date, &log.exercise_id)?.ok_or_else(|| {
                crate::other_error!("Log for {} on {} vanished after upsert", log.exercise_id, log.date)
            })?
        };
        tx.commit()?;

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_when_target_sets_reached() {
        let exercise = Exercise::for_test("Wall sit", 3, 1, 7);
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

        assert!(!DailyLog::record(&exercise, date, 0).completed);
        assert!(!DailyLog::record(&exercise, date, 2).completed);
        assert!(DailyLog::record(&exercise, date, 3).completed);
        assert!(DailyLog::record(&exercise, date, 4).completed);
    }

    #[test]
    fn serializes_plain_date() {
        let exercise = Exercise::for_test("Wall sit", 3, 1, 7);
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let json = serde_json::to_value(DailyLog::record(&exercise, date, 1)).unwrap();
        assert_eq!(json["date"], "2024-03-04");
        assert_eq!(json["setsCompleted"], 1);
        assert_eq!(json["exerciseId"], exercise.id.to_string());
    }
}

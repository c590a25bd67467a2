use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "backend")]
use {
    crate::api::error::ServerError,
    exemplar::Model,
    rusqlite::{Connection, OptionalExtension},
    sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

use super::{ValidateModel, Validator};
use crate::{api::error::ValidationError, types::Uuid};

pub const MAX_EXERCISE_NAME_LEN: usize = 200;

/// A prescribed exercise: how many sets of how many reps, how many times a
/// week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("exercise"))]
#[cfg_attr(feature = "backend", check("../../../server/migrations/01-exercise/up.sql"))]
#[cfg_attr(feature = "backend", enum_def)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// 1 to 7. Anything at or above 7 means every day
    pub frequency_per_week: u32,
    pub creation_date: DateTime<Utc>,
    pub last_updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub frequency_per_week: u32,
}

/// Partial update, absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub frequency_per_week: Option<u32>,
}

fn check_name(v: &mut Validator, name: &str) {
    let name = name.trim();
    v.check(!name.is_empty(), "name must not be empty");
    v.check(
        name.chars().count() <= MAX_EXERCISE_NAME_LEN,
        format!("name must be at most {MAX_EXERCISE_NAME_LEN} characters"),
    );
}

impl ValidateModel for NewExercise {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::default();
        check_name(&mut v, &self.name);
        v.check(self.sets >= 1, "sets must be at least 1")
            .check(self.reps >= 1, "reps must be at least 1")
            .check(self.frequency_per_week >= 1, "frequencyPerWeek must be at least 1")
            .finish()
    }
}

impl ValidateModel for ExerciseUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::default();
        if let Some(name) = &self.name {
            check_name(&mut v, name);
        }
        v.check(self.sets.map_or(true, |s| s >= 1), "sets must be at least 1")
            .check(self.reps.map_or(true, |r| r >= 1), "reps must be at least 1")
            .check(
                self.frequency_per_week.map_or(true, |f| f >= 1),
                "frequencyPerWeek must be at least 1",
            )
            .finish()
    }
}

impl Exercise {
    pub fn new(new_exercise: NewExercise) -> Result<Self, ValidationError> {
        new_exercise.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: new_exercise.name.trim().to_owned(),
            sets: new_exercise.sets,
            reps: new_exercise.reps,
            frequency_per_week: new_exercise.frequency_per_week,
            creation_date: now,
            last_updated_date: now,
        })
    }

    /// Applies a validated partial update. Returns true if anything changed
    pub fn apply(&mut self, update: ExerciseUpdate) -> Result<bool, ValidationError> {
        update.validate()?;

        let before = self.clone();
        if let Some(name) = update.name {
            self.name = name.trim().to_owned();
        }
        if let Some(sets) = update.sets {
            self.sets = sets;
        }
        if let Some(reps) = update.reps {
            self.reps = reps;
        }
        if let Some(frequency_per_week) = update.frequency_per_week {
            self.frequency_per_week = frequency_per_week;
        }

        let dirty = *self != before;
        if dirty {
            self.last_updated_date = Utc::now();
        }
        Ok(dirty)
    }

    #[cfg(test)]
    pub(crate) fn for_test(name: &str, sets: u32, reps: u32, frequency_per_week: u32) -> Self {
        Self::new(NewExercise { name: name.to_owned(), sets, reps, frequency_per_week })
            .expect("valid test exercise")
    }
}

/// Ordering for catalog listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseOrder {
    NewestFirst,
    Name,
}

#[cfg(feature = "backend")]
impl Exercise {
    fn select() -> SelectStatement {
        Query::select()
            .columns([
                ExerciseIden::Id,
                ExerciseIden::Name,
                ExerciseIden::Sets,
                ExerciseIden::Reps,
                ExerciseIden::FrequencyPerWeek,
                ExerciseIden::CreationDate,
                ExerciseIden::LastUpdatedDate,
            ])
            .from(ExerciseIden::Table)
            .to_owned()
    }

    pub fn fetch_by_id<T>(conn: &Connection, id: &Uuid) -> Result<Exercise, ServerError<T>> {
        Self::fetch_maybe::<T>(conn, id)?
            .ok_or_else(|| crate::not_found_error!("Exercise {id} doesn't exist"))
    }

    pub fn fetch_maybe<T>(conn: &Connection, id: &Uuid) -> Result<Option<Exercise>, ServerError<T>> {
        let (sql, values) = Self::select()
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), Exercise::from_row).optional()?;
        Ok(res)
    }

    pub fn fetch_all<T>(
        conn: &Connection,
        order: ExerciseOrder,
    ) -> Result<Vec<Exercise>, ServerError<T>> {
        let mut query = Self::select();
        match order {
            ExerciseOrder::NewestFirst => query.order_by(ExerciseIden::CreationDate, Order::Desc),
            ExerciseOrder::Name => query.order_by(ExerciseIden::Name, Order::Asc),
        };
        let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Exercise::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn create<T>(
        conn: &mut Connection,
        new_exercise: NewExercise,
    ) -> Result<Exercise, ServerError<T>> {
        let exercise = Exercise::new(new_exercise)?;

        let tx = conn.transaction()?;
        let exercise = {
            exercise.insert(&tx)?;
            Exercise::fetch_by_id::<T>(&tx, &exercise.id)?
        };
        tx.commit()?;

        Ok(exercise)
    }

    pub fn update<T>(&self, conn: &Connection) -> Result<(), ServerError<T>> {
        let (sql, values) = Query::update()
            .table(ExerciseIden::Table)
            .values([
                (ExerciseIden::Name, self.name.clone().into()),
                (ExerciseIden::Sets, self.sets.into()),
                (ExerciseIden::Reps, self.reps.into()),
                (ExerciseIden::FrequencyPerWeek, self.frequency_per_week.into()),
                (ExerciseIden::LastUpdatedDate, self.last_updated_date.into()),
            ])
            .and_where(Expr::col(ExerciseIden::Id).eq(&self.id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let changed = stmt.execute(&*values.as_params())?;
        if changed == 0 {
            return Err(crate::not_found_error!("Exercise {} doesn't exist", self.id));
        }

        Ok(())
    }

    /// Deletes the exercise. Its logs and cached media go with it via the
    /// foreign key cascade
    pub fn delete<T>(conn: &Connection, id: &Uuid) -> Result<(), ServerError<T>> {
        let (sql, values) = Query::delete()
            .from_table(ExerciseIden::Table)
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let changed = stmt.execute(&*values.as_params())?;
        if changed == 0 {
            return Err(crate::not_found_error!("Exercise {id} doesn't exist"));
        }

        Ok(())
    }
}

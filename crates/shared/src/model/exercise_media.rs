use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "backend")]
use {
    crate::api::error::ServerError,
    exemplar::Model,
    rusqlite::{
        types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
        Connection, ToSql,
    },
    sea_query::{enum_def, Expr, Order, Query, SqliteQueryBuilder},
    sea_query_rusqlite::RusqliteBinder,
};

use super::Exercise;
use crate::types::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Image,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Image => "image",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "backend")]
impl ToSql for MediaType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

#[cfg(feature = "backend")]
impl FromSql for MediaType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "video" => Ok(MediaType::Video),
            "image" => Ok(MediaType::Image),
            other => Err(FromSqlError::Other(format!("Unknown media type {other:?}").into())),
        }
    }
}

#[cfg(feature = "backend")]
impl From<MediaType> for sea_query::Value {
    fn from(value: MediaType) -> Self {
        value.as_str().into()
    }
}

/// A search result found for an exercise, before it is cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExerciseMedia {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub title: String,
}

/// Cached demonstration video or image for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "backend", derive(Model))]
#[cfg_attr(feature = "backend", table("exercise_media"))]
#[cfg_attr(feature = "backend", check("../../../server/migrations/04-exercise_media/up.sql"))]
#[cfg_attr(feature = "backend", enum_def)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMedia {
    pub id: Uuid,
    pub exercise_id: Uuid,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub title: String,
    pub is_alternative: bool,
    /// Order the provider returned it in, videos before images
    pub position: u32,
    pub cached_at: DateTime<Utc>,
}

impl ExerciseMedia {
    pub fn new(exercise_id: Uuid, position: u32, media: NewExerciseMedia) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id,
            media_type: media.media_type,
            url: media.url,
            thumbnail_url: media.thumbnail_url,
            title: media.title,
            is_alternative: false,
            position,
            cached_at: Utc::now(),
        }
    }
}

/// Exercise detail with whatever media is already cached for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseWithMedia {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub media: Vec<ExerciseMedia>,
}

#[cfg(feature = "backend")]
impl ExerciseMedia {
    pub fn fetch_for_exercise<T>(
        conn: &Connection,
        exercise_id: &Uuid,
    ) -> Result<Vec<ExerciseMedia>, ServerError<T>> {
        let (sql, values) = Query::select()
            .columns([
                ExerciseMediaIden::Id,
                ExerciseMediaIden::ExerciseId,
                ExerciseMediaIden::MediaType,
                ExerciseMediaIden::Url,
                ExerciseMediaIden::ThumbnailUrl,
                ExerciseMediaIden::Title,
                ExerciseMediaIden::IsAlternative,
                ExerciseMediaIden::Position,
                ExerciseMediaIden::CachedAt,
            ])
            .from(ExerciseMediaIden::Table)
            .and_where(Expr::col(ExerciseMediaIden::ExerciseId).eq(exercise_id))
            .order_by(ExerciseMediaIden::Position, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), ExerciseMedia::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Swaps the cached media for an exercise with `media` in one transaction
    pub fn replace_for_exercise<T>(
        conn: &mut Connection,
        exercise_id: &Uuid,
        media: Vec<NewExerciseMedia>,
    ) -> Result<Vec<ExerciseMedia>, ServerError<T>> {
        let (sql, values) = Query::delete()
            .from_table(ExerciseMediaIden::Table)
            .and_where(Expr::col(ExerciseMediaIden::ExerciseId).eq(exercise_id))
            .build_rusqlite(SqliteQueryBuilder);

        let tx = conn.transaction()?;
        let cached = {
            let mut stmt = tx.prepare_cached(&sql)?;
            let removed = stmt.execute(&*values.as_params())?;
            drop(stmt);
            tracing::debug!(%exercise_id, removed, added = media.len(), "Replacing cached media");

            for (position, m) in (0u32..).zip(media) {
                ExerciseMedia::new(*exercise_id, position, m).insert(&tx)?;
            }

            ExerciseMedia::fetch_for_exercise::<T>(&tx, exercise_id)?
        };
        tx.commit()?;

        Ok(cached)
    }
}

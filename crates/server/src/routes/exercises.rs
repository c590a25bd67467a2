use axum::{
    extract::Query,
    http::StatusCode,
    Json,
};
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateExerciseRequest, MediaQuery, SuccessResponse, UpdateExerciseRequest},
        response_errors::{ExerciseError, FetchError, MediaError},
    },
    model::{Exercise, ExerciseMedia, ExerciseOrder, ExerciseUpdate, ExerciseWithMedia, NewExercise},
};
use tracing::{debug, info, instrument};

use crate::{
    db::DatabaseConnection, extract::{IdPath, JsonBody}, integrations::search_media, state::Args,
    Authenticated, HttpClient,
};

#[instrument(skip_all)]
pub async fn list_exercises(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<Vec<Exercise>>, ServerError<FetchError>> {
    let exercises = conn
        .interact(|conn| {
            let exercises = Exercise::fetch_all::<FetchError>(conn, ExerciseOrder::NewestFirst)?;
            Ok::<_, ServerError<FetchError>>(exercises)
        })
        .await??;

    Ok(Json(exercises))
}

#[instrument(skip_all)]
pub async fn create_exercise(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    JsonBody(request): JsonBody<CreateExerciseRequest>,
) -> Result<(StatusCode, Json<Exercise>), ServerError<ExerciseError>> {
    let new_exercise = NewExercise::try_from(request)?;

    let exercise = conn
        .interact(move |conn| {
            let exercise = Exercise::create::<ExerciseError>(conn, new_exercise)?;
            Ok::<_, ServerError<ExerciseError>>(exercise)
        })
        .await??;
    info!(id = %exercise.id, name = %exercise.name, "Created exercise");

    Ok((StatusCode::CREATED, Json(exercise)))
}

#[instrument(skip_all, fields(%id))]
pub async fn fetch_exercise(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    IdPath(id): IdPath,
) -> Result<Json<ExerciseWithMedia>, ServerError<FetchError>> {
    let detail = conn
        .interact(move |conn| {
            let exercise = Exercise::fetch_by_id::<FetchError>(conn, &id)?;
            let media = ExerciseMedia::fetch_for_exercise::<FetchError>(conn, &id)?;
            Ok::<_, ServerError<FetchError>>(ExerciseWithMedia { exercise, media })
        })
        .await??;

    Ok(Json(detail))
}

#[instrument(skip_all, fields(%id))]
pub async fn update_exercise(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    IdPath(id): IdPath,
    JsonBody(request): JsonBody<UpdateExerciseRequest>,
) -> Result<Json<Exercise>, ServerError<ExerciseError>> {
    let update = ExerciseUpdate::from(request);

    let exercise = conn
        .interact(move |conn| {
            let mut exercise = Exercise::fetch_by_id::<ExerciseError>(conn, &id)?;
            if exercise.apply(update)? {
                exercise.update::<ExerciseError>(conn)?;
            } else {
                debug!("Update changed nothing");
            }
            Ok::<_, ServerError<ExerciseError>>(exercise)
        })
        .await??;

    Ok(Json(exercise))
}

#[instrument(skip_all, fields(%id))]
pub async fn delete_exercise(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    IdPath(id): IdPath,
) -> Result<Json<SuccessResponse>, ServerError<ExerciseError>> {
    conn.interact(move |conn| {
        Exercise::delete::<ExerciseError>(conn, &id)?;
        Ok::<_, ServerError<ExerciseError>>(())
    })
    .await??;
    info!(%id, "Deleted exercise");

    Ok(Json(SuccessResponse::OK))
}

/// Cached media for an exercise. Searches the providers when nothing is
/// cached yet or the caller asks for a refresh
#[instrument(skip_all, fields(%id, refresh = query.refresh()))]
pub async fn exercise_media(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    args: Args,
    http_client: HttpClient,
    IdPath(id): IdPath,
    Query(query): Query<MediaQuery>,
) -> Result<Json<Vec<ExerciseMedia>>, ServerError<MediaError>> {
    let (exercise, cached) = conn
        .interact(move |conn| {
            let exercise = Exercise::fetch_by_id::<MediaError>(conn, &id)?;
            let cached = ExerciseMedia::fetch_for_exercise::<MediaError>(conn, &id)?;
            Ok::<_, ServerError<MediaError>>((exercise, cached))
        })
        .await??;

    if !cached.is_empty() && !query.refresh() {
        debug!(count = cached.len(), "Serving cached media");
        return Ok(Json(cached));
    }

    // Nothing is written until both searches succeed, a failed refresh leaves the cache alone
    let found = search_media(&http_client, &args, &exercise.name).await?;

    let media = conn
        .interact(move |conn| {
            let media = ExerciseMedia::replace_for_exercise::<MediaError>(conn, &id, found)?;
            Ok::<_, ServerError<MediaError>>(media)
        })
        .await??;
    info!(count = media.len(), "Cached media");

    Ok(Json(media))
}

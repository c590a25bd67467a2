use axum::{
    routing::{get, post},
    Router,
};
use shared::api::Object;
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

mod ping;
pub use ping::*;

mod auth;
pub use auth::*;

mod exercises;
pub use exercises::*;

mod logs;
pub use logs::*;

mod stats;
pub use stats::*;

mod reminders;
pub use reminders::*;

mod cron;
pub use cron::*;

/// Every request body the api accepts is a small JSON object
const API_BODY_MAX_BYTES: usize = 16 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(Object::Ping.path(), get(ping))
        .route(Object::Auth.path(), post(login).delete(logout))
        .route(Object::Exercises.path(), get(list_exercises).post(create_exercise))
        .route(
            Object::ExerciseId.path(),
            get(fetch_exercise).put(update_exercise).delete(delete_exercise),
        )
        .route(Object::ExerciseMedia.path(), get(exercise_media))
        .route(Object::Logs.path(), get(list_logs).post(update_log))
        .route(Object::Stats.path(), get(fetch_stats))
        .route(Object::Reminders.path(), get(fetch_reminder_settings).put(update_reminder_settings))
        .route(Object::SendReminder.path(), post(send_reminder))
        .route(Object::Cron.path(), post(run_cron).get(cron_status))
        .layer(RequestBodyLimitLayer::new(API_BODY_MAX_BYTES))
}

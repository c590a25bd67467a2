use axum::{http::HeaderMap, Json};
use chrono::Utc;
use shared::api::{
    error::ServerError,
    payloads::{CronResponse, CronStatus},
    response_errors::CronError,
    CRON_AUTH_HEADER,
};
use tracing::{info, instrument, warn};

use crate::{
    db::DatabaseConnection,
    integrations::Mailer,
    reminders::{decide_reminder, reminder_inputs, ReminderDecision},
    state::Args,
    HttpClient,
};

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CRON_AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Called by an external scheduler every few minutes. Sends the reminder
/// when the configured time in the configured timezone comes round
#[instrument(skip_all)]
pub async fn run_cron(
    args: Args,
    headers: HeaderMap,
    http_client: HttpClient,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<CronResponse>, ServerError<CronError>> {
    let Some(secret) = args.cron_secret.as_deref().filter(|s| !s.is_empty()) else {
        return Err(CronError::SecretNotConfigured.into());
    };
    if bearer_token(&headers) != Some(secret) {
        warn!("Cron called without the right secret");
        return Err(CronError::InvalidSecret.into());
    }

    let (settings, exercises) = reminder_inputs::<CronError>(&conn).await?;

    match decide_reminder(&settings, &exercises, Utc::now(), true)? {
        ReminderDecision::Skip(reason) => Ok(Json(CronResponse::skipped(reason))),
        ReminderDecision::Send { to, exercises } => {
            Mailer::new((*http_client).clone(), &args)
                .send_reminder(to, &exercises)
                .await?;
            info!(count = exercises.len(), "Cron sent reminder");
            Ok(Json(CronResponse::sent()))
        },
    }
}

pub async fn cron_status() -> Json<CronStatus> {
    Json(CronStatus { status: "ok".to_owned() })
}

use axum::Json;
use chrono::Utc;
use shared::{
    api::{
        error::ServerError,
        payloads::{CronSkipReason, SendReminderResponse, UpdateReminderSettingsRequest},
        response_errors::{FetchError, ReminderError},
    },
    model::ReminderSettings,
};
use tracing::{debug, info, instrument};

use crate::{
    db::DatabaseConnection,
    extract::JsonBody,
    integrations::Mailer,
    reminders::{decide_reminder, reminder_inputs, ReminderDecision},
    state::Args,
    Authenticated, HttpClient,
};

#[instrument(skip_all)]
pub async fn fetch_reminder_settings(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<ReminderSettings>, ServerError<FetchError>> {
    let settings = conn
        .interact(|conn| {
            let settings = ReminderSettings::fetch::<FetchError>(conn)?;
            Ok::<_, ServerError<FetchError>>(settings)
        })
        .await??;

    Ok(Json(settings))
}

#[instrument(skip_all)]
pub async fn update_reminder_settings(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    JsonBody(update): JsonBody<UpdateReminderSettingsRequest>,
) -> Result<Json<ReminderSettings>, ServerError<ReminderError>> {
    let settings = conn
        .interact(move |conn| {
            let mut settings = ReminderSettings::fetch::<ReminderError>(conn)?;
            if settings.apply(update)? {
                settings.update::<ReminderError>(conn)?;
                info!(
                    enabled = settings.enabled,
                    time = %settings.time,
                    timezone = %settings.timezone,
                    "Reminder settings updated"
                );
            }
            Ok::<_, ServerError<ReminderError>>(settings)
        })
        .await??;

    Ok(Json(settings))
}

fn skip_message(reason: CronSkipReason) -> &'static str {
    match reason {
        CronSkipReason::NotConfigured => "Reminders disabled or email not set",
        CronSkipReason::NotTime => "Not time to send the reminder yet",
        CronSkipReason::NoExercises => "No exercises scheduled for today",
    }
}

/// Sends today's reminder straight away, whatever the configured time is
#[instrument(skip_all)]
pub async fn send_reminder(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    args: Args,
    http_client: HttpClient,
) -> Result<Json<SendReminderResponse>, ServerError<ReminderError>> {
    let (settings, exercises) = reminder_inputs::<ReminderError>(&conn).await?;

    match decide_reminder(&settings, &exercises, Utc::now(), false)? {
        ReminderDecision::Skip(reason) => {
            debug!(?reason, "Not sending reminder");
            Ok(Json(SendReminderResponse {
                sent: false,
                message: skip_message(reason).to_owned(),
            }))
        },
        ReminderDecision::Send { to, exercises } => {
            Mailer::new((*http_client).clone(), &args)
                .send_reminder(to, &exercises)
                .await?;
            Ok(Json(SendReminderResponse {
                sent: true,
                message: "Reminder sent successfully".to_owned(),
            }))
        },
    }
}

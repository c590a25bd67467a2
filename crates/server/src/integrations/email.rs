use serde::Serialize;
use shared::model::Exercise;
use tracing::{info, instrument};

use super::{check_status, IntegrationError};
use crate::cli::Cli;

const SERVICE: &str = "resend";
pub const RESEND_API_URL: &str = "https://api.resend.com/emails";
pub const REMINDER_SUBJECT: &str = "Daily Physical Therapy Reminder";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Builds the reminder listing what's due today
pub fn reminder_email(from: &str, to: &str, exercises: &[&Exercise]) -> OutgoingEmail {
    let intro = "Hi! Don't forget to complete your physical therapy exercises today:";
    let outro = "Stay consistent for the best results!";

    let text_list = exercises
        .iter()
        .map(|e| format!("- {}: {} sets x {} reps", e.name, e.sets, e.reps))
        .collect::<Vec<_>>()
        .join("\n");

    let html_list = exercises
        .iter()
        .map(|e| {
            format!(
                "<li><strong>{}</strong>: {} sets x {} reps</li>",
                html_escape::encode_text(&e.name),
                e.sets,
                e.reps
            )
        })
        .collect::<String>();

    let html = format!(
        r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb;">Daily PT Reminder</h2>
  <p>{intro}</p>
  <ul style="line-height: 1.8;">{html_list}</ul>
  <p style="margin-top: 20px;">{outro}</p>
  <hr style="margin-top: 30px; border: none; border-top: 1px solid #e5e7eb;" />
  <p style="font-size: 12px; color: #6b7280;">Sent from PT Tracker</p>
</div>"#
    );

    OutgoingEmail {
        from: from.to_owned(),
        to: vec![to.to_owned()],
        subject: REMINDER_SUBJECT.to_owned(),
        text: format!("{intro}\n\n{text_list}\n\n{outro}"),
        html,
    }
}

/// Sends mail through the Resend HTTP API
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    endpoint: String,
}

impl Mailer {
    pub fn new(client: reqwest::Client, args: &Cli) -> Self {
        Self {
            client,
            api_key: args.resend_api_key.clone().filter(|k| !k.is_empty()),
            from: args.reminder_from_address.clone(),
            endpoint: args.resend_api_url.clone(),
        }
    }

    #[instrument(skip_all, fields(to = ?email.to))]
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), IntegrationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(IntegrationError::NotConfigured { service: SERVICE })?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await
            .map_err(IntegrationError::request(SERVICE))?;
        check_status(SERVICE, response).await?;

        info!("Reminder email sent");
        Ok(())
    }

    /// Sends today's reminder for `exercises` to `to`
    pub async fn send_reminder(&self, to: &str, exercises: &[&Exercise]) -> Result<(), IntegrationError> {
        self.send(&reminder_email(&self.from, to, exercises)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use shared::types::Uuid;

    use super::*;

    fn exercise(name: &str, sets: u32, reps: u32) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            sets,
            reps,
            frequency_per_week: 7,
            creation_date: Utc::now(),
            last_updated_date: Utc::now(),
        }
    }

    #[test]
    fn lists_exercises_in_text_and_html() {
        let bridges = exercise("Bridges", 3, 10);
        let tricky = exercise("Step-ups <low box>", 2, 8);
        let email = reminder_email("PT <pt@example.com>", "me@example.com", &[&bridges, &tricky]);

        assert_eq!(email.subject, "Daily Physical Therapy Reminder");
        assert_eq!(email.to, vec!["me@example.com".to_owned()]);
        assert!(email.text.contains("- Bridges: 3 sets x 10 reps\n- Step-ups <low box>: 2 sets x 8 reps"));
        assert!(email.html.contains("<li><strong>Bridges</strong>: 3 sets x 10 reps</li>"));
        assert!(email.html.contains("Step-ups &lt;low box&gt;"));
        assert!(!email.html.contains("<low box>"));
    }

    #[tokio::test]
    async fn sending_without_key_fails() {
        let mut args = Cli::for_test();
        args.resend_api_key = None;
        let mailer = Mailer::new(reqwest::Client::new(), &args);

        let err = mailer.send_reminder("me@example.com", &[]).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured { service: "resend" }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let args = Cli {
            resend_api_key: Some("re_test".to_owned()),
            resend_api_url: "http://127.0.0.1:1/emails".to_owned(),
            ..Cli::for_test()
        };
        let mailer = Mailer::new(reqwest::Client::new(), &args);

        let err = mailer.send_reminder("me@example.com", &[]).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Request { service: "resend", .. }));
    }
}

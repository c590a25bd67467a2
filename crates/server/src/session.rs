use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    api::error::{Nothing, ServerError},
    other_error, unauthorized_error,
};
use tower_sessions::Session;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct SessionData {
    authenticated_at: Option<DateTime<Utc>>,
}

/// The caller's session and what we've stored in it
#[derive(Debug, Clone)]
pub struct SessionValue {
    session: Session,
    data: SessionData,
}

impl SessionValue {
    const SESSION_DATA_KEY: &'static str = "session.data";

    pub fn is_authenticated(&self) -> bool {
        self.data.authenticated_at.is_some()
    }

    /// Marks the session as logged in under a fresh id
    pub async fn login(&mut self) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await?;
        self.data.authenticated_at = Some(Utc::now());
        self.session.insert(Self::SESSION_DATA_KEY, self.data.clone()).await
    }

    /// Drops everything in the session and expires its cookie
    pub async fn logout(&mut self) -> Result<(), tower_sessions::session::Error> {
        self.data = SessionData::default();
        self.session.flush().await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionValue
where
    S: Send + Sync,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(req, state)
            .await
            .map_err(|(code, message)| other_error!("Session layer missing ({code}): {message}"))?;

        let data: SessionData = session
            .get(Self::SESSION_DATA_KEY)
            .await
            .map_err(|e| other_error!("Reading session: {e}"))?
            .unwrap_or_default();

        Ok(Self { session, data })
    }
}

/// Guard for routes that need a logged in caller. Rejects with 401 otherwise
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionValue::from_request_parts(req, state).await?;
        if session.is_authenticated() {
            Ok(Authenticated)
        } else {
            Err(unauthorized_error!("Log in first"))
        }
    }
}

//! Clients for the third party services the tracker talks to

use reqwest::{Response, StatusCode};
use shared::{api::error::ServerError, other_error, upstream_error};
use thiserror::Error;

mod email;
pub use email::*;

mod youtube;
pub use youtube::*;

mod unsplash;
pub use unsplash::*;

mod media;
pub use media::*;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("{service} isn't configured")]
    NotConfigured { service: &'static str },
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },
}

impl IntegrationError {
    pub fn service(&self) -> &'static str {
        match self {
            IntegrationError::NotConfigured { service }
            | IntegrationError::Request { service, .. }
            | IntegrationError::Status { service, .. } => service,
        }
    }

    fn request(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| IntegrationError::Request { service, source }
    }
}

/// Missing credentials are our problem (500), anything the service does wrong
/// is a bad gateway
impl<T> From<IntegrationError> for ServerError<T> {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::NotConfigured { .. } => other_error!("{err}"),
            other => upstream_error!(other.service(), "{other}"),
        }
    }
}

/// Passes successful responses through, turns anything else into an error
/// carrying the body for the logs
async fn check_status(service: &'static str, response: Response) -> Result<Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(service, %status, %body, "Request failed");
    Err(IntegrationError::Status { service, status, body })
}

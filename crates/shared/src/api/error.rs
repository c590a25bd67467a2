use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Placeholder for routes that have no error cases of their own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Nothing {}

impl fmt::Display for Nothing {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for Nothing {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub error_messages: Vec<String>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { error_messages: vec![message.into()] }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error_messages.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Error returned by every route. `T` carries the errors specific to a route,
/// everything else is shared
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerError<T> {
    Inner {
        #[serde(with = "http_serde::status_code")]
        code: StatusCode,
        inner: T,
    },
    Validation {
        inner: ValidationError,
    },
    BadRequest {
        message: String,
    },
    NotFound {
        message: String,
    },
    Unauthorized {
        message: String,
    },
    /// A third party service (email, media search) failed or returned garbage
    Upstream {
        service: String,
        message: String,
    },
    Database {
        message: String,
    },
    Json {
        message: String,
    },
    Other {
        message: String,
    },
}

impl<T> ServerError<T> {
    pub fn status_code(&self) -> StatusCode {
        use ServerError::*;
        match self {
            Inner { code, .. } => *code,
            Validation { .. } | BadRequest { .. } => StatusCode::BAD_REQUEST,
            NotFound { .. } => StatusCode::NOT_FOUND,
            Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Upstream { .. } => StatusCode::BAD_GATEWAY,
            Database { .. } | Json { .. } | Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T: fmt::Debug> fmt::Display for ServerError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ServerError::*;
        match self {
            Inner { inner, .. } => write!(f, "{inner:?}"),
            Validation { inner } => write!(f, "Validation failed: {inner}"),
            BadRequest { message } => write!(f, "Bad request: {message}"),
            NotFound { message } => write!(f, "Not found: {message}"),
            Unauthorized { message } => write!(f, "Unauthorized: {message}"),
            Upstream { service, message } => write!(f, "{service} error: {message}"),
            Database { message } => write!(f, "Database error: {message}"),
            Json { message } => write!(f, "Json error: {message}"),
            Other { message } => write!(f, "{message}"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for ServerError<T> {}

impl<T> From<ValidationError> for ServerError<T> {
    fn from(inner: ValidationError) -> Self {
        Self::Validation { inner }
    }
}

impl<T> From<serde_json::Error> for ServerError<T> {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { message: err.to_string() }
    }
}

impl<T> From<Nothing> for ServerError<T> {
    fn from(inner: Nothing) -> Self {
        match inner {}
    }
}

#[cfg(feature = "backend")]
mod backend {
    use axum::{
        response::{IntoResponse, Response},
        Json,
    };
    use serde::Serialize;
    use std::fmt;

    use super::ServerError;

    impl<T> From<rusqlite::Error> for ServerError<T> {
        fn from(err: rusqlite::Error) -> Self {
            match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    Self::NotFound { message: "No matching record".to_string() }
                },
                other => Self::Database { message: other.to_string() },
            }
        }
    }

    impl<T> From<sea_query::error::Error> for ServerError<T> {
        fn from(err: sea_query::error::Error) -> Self {
            Self::Database { message: format!("Query builder: {err}") }
        }
    }

    impl<T> From<deadpool_sqlite::InteractError> for ServerError<T> {
        fn from(err: deadpool_sqlite::InteractError) -> Self {
            Self::Database { message: format!("Interact: {err}") }
        }
    }

    impl<T> From<deadpool_sqlite::PoolError> for ServerError<T> {
        fn from(err: deadpool_sqlite::PoolError) -> Self {
            Self::Database { message: format!("Pool: {err}") }
        }
    }

    #[derive(Serialize)]
    struct ErrorBody<'a, T> {
        error: String,
        details: &'a ServerError<T>,
    }

    impl<T: Serialize + fmt::Debug> IntoResponse for ServerError<T> {
        fn into_response(self) -> Response {
            let code = self.status_code();
            if code.is_server_error() {
                tracing::error!(%code, error = %self, "Request failed");
            } else {
                tracing::debug!(%code, error = %self, "Request rejected");
            }

            let body = ErrorBody { error: self.to_string(), details: &self };
            (code, Json(body)).into_response()
        }
    }
}

#[macro_export]
macro_rules! other_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::Other { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! bad_request {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::BadRequest { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::NotFound { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! unauthorized_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::Unauthorized { message: format!($($arg)*) }
    };
}

#[macro_export]
macro_rules! upstream_error {
    ($service:expr, $($arg:tt)*) => {
        $crate::api::error::ServerError::Upstream {
            service: ($service).to_string(),
            message: format!($($arg)*),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let e: ServerError<Nothing> = crate::not_found_error!("exercise {}", 1);
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(e.to_string(), "Not found: exercise 1");

        let e: ServerError<Nothing> = crate::upstream_error!("resend", "timeout");
        assert_eq!(e.status_code(), StatusCode::BAD_GATEWAY);

        let e: ServerError<Nothing> = ValidationError::new("sets must be at least 1").into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn serializes_with_type_tag() {
        let e: ServerError<Nothing> = crate::bad_request!("date required");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "BadRequest");
        assert_eq!(json["message"], "date required");
    }
}

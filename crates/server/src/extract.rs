use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use shared::{
    api::error::{Nothing, ServerError},
    bad_request, not_found_error,
    types::Uuid,
};

/// `Json` that rejects unreadable bodies with a 400 in the same shape as every
/// other error
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| bad_request!("{}", rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// Record id taken from the path. An id that isn't a uuid can't name any
/// record, so it's a 404 rather than a 400
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| bad_request!("{}", rejection.body_text()))?;
        let id = Uuid::parse(&raw).map_err(|_| not_found_error!("No record with id {raw:?}"))?;
        Ok(IdPath(id))
    }
}

use axum::Json;
use shared::{
    api::{
        error::ServerError,
        payloads::{LoginRequest, SuccessResponse},
        response_errors::AuthError,
    },
    other_error,
};
use tracing::{info, instrument, warn};

use crate::{extract::JsonBody, state::Args, SessionValue};

#[instrument(skip_all)]
pub async fn login(
    args: Args,
    mut session: SessionValue,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<SuccessResponse>, ServerError<AuthError>> {
    let Some(password) = args.app_password.as_deref().filter(|p| !p.is_empty()) else {
        return Err(AuthError::PasswordNotConfigured.into());
    };

    if request.password != password {
        warn!("Rejected login with wrong password");
        return Err(AuthError::InvalidPassword.into());
    }

    session
        .login()
        .await
        .map_err(|e| other_error!("Saving session: {e}"))?;
    info!("Logged in");

    Ok(Json(SuccessResponse::OK))
}

#[instrument(skip_all)]
pub async fn logout(mut session: SessionValue) -> Result<Json<SuccessResponse>, ServerError<AuthError>> {
    session
        .logout()
        .await
        .map_err(|e| other_error!("Clearing session: {e}"))?;

    Ok(Json(SuccessResponse::OK))
}

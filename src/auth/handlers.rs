use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    accounts::PublicAccount,
    auth::{
        dto::{LoginRequest, LoginResponse, LogoutResponse},
        services::authenticate,
        session::SessionKeys,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/api/logout", post(logout))
}

fn set_cookie_header(cookie: String) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie
            .parse()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?,
    );
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let account = authenticate(&state.db, &payload.email, &payload.password).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(account.id)?;
    let headers = set_cookie_header(keys.issue_cookie(&token))?;

    info!(user_id = %account.id, email = %account.email, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            user: PublicAccount::from(account),
        }),
    ))
}

/// Clears the session cookie. Idempotent: with no active session it still
/// answers 200 and sets the expired cookie.
#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Json<LogoutResponse>), ApiError> {
    let keys = SessionKeys::from_ref(&state);
    let headers = set_cookie_header(keys.clear_cookie())?;

    info!("user logged out");
    Ok((headers, Json(LogoutResponse { success: true })))
}

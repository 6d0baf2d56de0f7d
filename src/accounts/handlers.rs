use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            CreateUserRequest, CreatedUserResponse, DeactivateAccountRequest,
            DeactivateAccountResponse, PublicAccount, UpdateAccountRequest,
        },
        repo_types::{Account, Role},
    },
    auth::{
        password::hash_password,
        services::is_valid_email,
        session::SessionUser,
    },
    error::ApiError,
    state::AppState,
};

pub fn create_routes() -> Router<AppState> {
    Router::new().route("/api/create-user", post(create_user))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/api/me", get(get_me).patch(update_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/accounts/deactivate", post(deactivate_account))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<Json<CreatedUserResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("invalid email".into()));
    }

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("password too short".into()));
    }

    // Ensure email is not taken
    if Account::find_by_email(&state.db, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let account = Account::create(&state.db, &payload.email, payload.name.trim(), &hash).await?;

    info!(user_id = %account.id, email = %account.email, "account created");
    Ok(Json(CreatedUserResponse {
        success: true,
        user: PublicAccount::from(account),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<PublicAccount>, ApiError> {
    let account = Account::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(Json(PublicAccount::from(account)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(mut payload): Json<UpdateAccountRequest>,
) -> Result<Json<PublicAccount>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            return Err(ApiError::Validation("invalid email".into()));
        }
    }

    // Write, then answer from the re-read canonical row.
    let account = Account::update_partial(&state.db, user_id, &payload)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = %account.id, "account updated");
    Ok(Json(PublicAccount::from(account)))
}

/// Administrative deactivation. Accounts are never hard-deleted; a
/// deactivated account can no longer log in.
#[instrument(skip(state, payload))]
pub async fn deactivate_account(
    State(state): State<AppState>,
    SessionUser(admin_id): SessionUser,
    Json(payload): Json<DeactivateAccountRequest>,
) -> Result<Json<DeactivateAccountResponse>, ApiError> {
    let admin = Account::find_by_id(&state.db, admin_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if admin.role != Role::Admin {
        warn!(user_id = %admin.id, "non-admin attempted account deactivation");
        return Err(ApiError::Forbidden);
    }

    Account::deactivate(&state.db, payload.user_id).await?;

    info!(admin_id = %admin.id, user_id = %payload.user_id, "account deactivated");
    Ok(Json(DeactivateAccountResponse { success: true }))
}

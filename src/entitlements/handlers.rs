use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    accounts::{Account, Role},
    auth::session::SessionUser,
    entitlements::{
        dto::{PaymentWebhookRequest, RevokeKeyRequest, RevokeKeyResponse},
        repo_types::{AccessKey, NewAccessKey},
        services::{current_entitlement, generate_key, EntitlementState},
    },
    error::ApiError,
    state::AppState,
};

pub fn entitlement_routes() -> Router<AppState> {
    Router::new().route("/api/entitlements/me", get(entitlement_me))
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhook/payments", post(payment_webhook))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/access-keys/revoke", post(revoke_key))
}

/// Plan validity for the session account. Features call this to pick a
/// degraded state; the request gate never does.
#[instrument(skip(state))]
pub async fn entitlement_me(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<EntitlementState>, ApiError> {
    let entitlement = current_entitlement(&state.db, user_id).await?;
    Ok(Json(entitlement))
}

/// Creates an access key on payment confirmation. A renewal of a recurring
/// plan is just another delivery creating a fresh key.
#[instrument(skip(state, payload))]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhookRequest>,
) -> Result<Json<AccessKey>, ApiError> {
    let email = payload.user_email.trim().to_lowercase();

    let account = match Account::find_by_email(&state.db, &email).await? {
        Some(a) => a,
        None => {
            warn!(email = %email, "payment webhook for unknown account");
            return Err(ApiError::Validation("unknown account".into()));
        }
    };

    let now = OffsetDateTime::now_utc();

    // Lazy sweep: flip this account's lapsed keys before issuing the new one.
    let swept = AccessKey::expire_lapsed(&state.db, account.id, now).await?;
    if swept > 0 {
        info!(user_id = %account.id, count = swept, "expired lapsed access keys");
    }

    let new = NewAccessKey {
        key: generate_key(),
        user_id: account.id,
        user_email: account.email.clone(),
        user_name: account.name.clone(),
        payment_id: payload.payment_id,
        payment_method: payload.payment_method,
        plan: payload.plan,
        expires_at: now + payload.plan.duration(),
        is_recurring: payload.is_recurring,
        subscription_id: payload.subscription_id,
    };
    let key = AccessKey::create(&state.db, &new).await?;

    info!(user_id = %account.id, key_id = %key.id, plan = ?key.plan, "access key issued");
    Ok(Json(key))
}

/// Administrative revocation: active → revoked, irreversible.
#[instrument(skip(state, payload))]
pub async fn revoke_key(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(payload): Json<RevokeKeyRequest>,
) -> Result<Json<RevokeKeyResponse>, ApiError> {
    let account = Account::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if account.role != Role::Admin {
        warn!(user_id = %account.id, "non-admin attempted key revocation");
        return Err(ApiError::Forbidden);
    }

    if !AccessKey::revoke_by_key(&state.db, &payload.key).await? {
        return Err(ApiError::Validation("unknown access key".into()));
    }

    info!(admin_id = %account.id, "access key revoked");
    Ok(Json(RevokeKeyResponse { success: true }))
}

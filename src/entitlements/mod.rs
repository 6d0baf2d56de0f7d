use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{AccessKey, KeyStatus, Plan};
pub use services::{current_entitlement, EntitlementState};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::entitlement_routes())
        .merge(handlers::webhook_routes())
        .merge(handlers::admin_routes())
}

use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

pub use dto::{PublicAccount, UpdateAccountRequest};
pub use repo_types::{Account, Role};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::create_routes())
        .merge(handlers::me_routes())
        .merge(handlers::admin_routes())
}

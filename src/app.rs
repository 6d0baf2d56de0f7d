use std::net::SocketAddr;

use axum::{
    http::StatusCode, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{accounts, auth, entitlements};

/// Stand-in for page paths owned by the UI layer. By the time this answers,
/// the request gate has already decided pass-through.
async fn page_fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "not found" })),
    )
}

pub fn build_app(state: AppState) -> Router {
    // Everything in here sits behind the request gate, unrouted page paths
    // included via the fallback. /health is mounted outside the gate so
    // probes never get redirected.
    let gated = Router::new()
        .merge(auth::router())
        .merge(accounts::router())
        .merge(entitlements::router())
        .fallback(page_fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::gate::gate,
        ));

    Router::new()
        .merge(gated)
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

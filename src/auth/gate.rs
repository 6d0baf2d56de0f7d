//! Per-request gate.
//!
//! Evaluated fresh on every inbound request from three inputs: the requested
//! path, the session cookie, and the static allowlist of public path
//! prefixes. The gate only establishes identity presence — plan validity is
//! a per-feature concern handled by the entitlement evaluator, so accounts
//! with a lapsed plan still reach pages and see degraded feature states.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{auth::session::SessionKeys, state::AppState};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/cronograma";

/// Routes reachable without a session. Root matches exactly, the rest by
/// prefix.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/redefinir-senha",
    "/api/create-user",
    "/suporte-ativacao",
    "/admin",
    "/webhook",
];

/// Fixed exclusions never evaluated against the decision table.
const ASSET_PREFIXES: &[&str] = &["/static/", "/assets/"];
const ASSET_EXACT: &[&str] = &["/favicon.ico", "/robots.txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    RedirectToLogin,
    RedirectToHome,
}

pub fn is_asset_path(path: &str) -> bool {
    ASSET_EXACT.contains(&path) || ASSET_PREFIXES.iter().any(|p| path.starts_with(p))
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| {
        if *p == "/" {
            path == "/"
        } else {
            path.starts_with(p)
        }
    })
}

/// The decision table. `has_session` means the cookie is present and its
/// token verifies; anything else counts as no session.
pub fn decide(path: &str, has_session: bool) -> GateDecision {
    if is_asset_path(path) {
        return GateDecision::Pass;
    }

    if is_public_path(path) {
        if has_session && path.starts_with(LOGIN_PATH) {
            return GateDecision::RedirectToHome;
        }
        return GateDecision::Pass;
    }

    if has_session {
        GateDecision::Pass
    } else {
        GateDecision::RedirectToLogin
    }
}

/// Middleware layered over every route. Never fails a request: an
/// unreadable cookie is treated exactly like an absent one.
pub async fn gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let has_session = keys.session_from_headers(request.headers()).is_some();
    let path = request.uri().path();

    match decide(path, has_session) {
        GateDecision::Pass => next.run(request).await,
        GateDecision::RedirectToLogin => {
            debug!(path = %path, "gate: no session, redirecting to login");
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        GateDecision::RedirectToHome => {
            debug!(path = %path, "gate: already authenticated, redirecting home");
            Redirect::temporary(HOME_PATH).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_matches_exactly() {
        assert!(is_public_path("/"));
        assert!(!is_public_path("/cronograma"));
    }

    #[test]
    fn allowlist_entries_match_by_prefix() {
        assert!(is_public_path("/login"));
        assert!(is_public_path("/redefinir-senha"));
        assert!(is_public_path("/redefinir-senha/token123"));
        assert!(is_public_path("/api/create-user"));
        assert!(is_public_path("/suporte-ativacao"));
        assert!(is_public_path("/admin"));
        assert!(is_public_path("/admin/access-keys"));
        assert!(is_public_path("/webhook"));
        assert!(is_public_path("/webhook/payments"));
    }

    #[test]
    fn protected_paths_are_not_public() {
        assert!(!is_public_path("/cronograma"));
        assert!(!is_public_path("/api/me"));
        assert!(!is_public_path("/api/logout"));
        assert!(!is_public_path("/simulados/1"));
    }

    #[test]
    fn assets_bypass_the_table() {
        assert_eq!(decide("/static/app.css", false), GateDecision::Pass);
        assert_eq!(decide("/assets/logo.svg", true), GateDecision::Pass);
        assert_eq!(decide("/favicon.ico", false), GateDecision::Pass);
        assert_eq!(decide("/robots.txt", false), GateDecision::Pass);
    }

    #[test]
    fn public_paths_pass_regardless_of_session() {
        assert_eq!(decide("/", false), GateDecision::Pass);
        assert_eq!(decide("/", true), GateDecision::Pass);
        assert_eq!(decide("/redefinir-senha", true), GateDecision::Pass);
        assert_eq!(decide("/api/create-user", false), GateDecision::Pass);
        assert_eq!(decide("/webhook/payments", false), GateDecision::Pass);
    }

    #[test]
    fn login_with_session_redirects_home() {
        assert_eq!(decide("/login", true), GateDecision::RedirectToHome);
        assert_eq!(decide("/login", false), GateDecision::Pass);
    }

    #[test]
    fn protected_paths_require_a_session() {
        assert_eq!(decide("/cronograma", true), GateDecision::Pass);
        assert_eq!(decide("/cronograma", false), GateDecision::RedirectToLogin);
        assert_eq!(decide("/api/me", false), GateDecision::RedirectToLogin);
    }
}

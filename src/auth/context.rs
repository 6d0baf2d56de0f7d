//! Client-facing identity cache.
//!
//! Mirrors what the UI shell knows about "who am I": not yet known
//! (`is_loading`), known absent, or a concrete account. Resolution goes
//! through the same primitives the authenticator uses.

use axum::extract::FromRef;
use uuid::Uuid;

use crate::{
    accounts::{Account, PublicAccount, UpdateAccountRequest},
    auth::{
        gate::{HOME_PATH, LOGIN_PATH},
        services::authenticate,
        session::SessionKeys,
    },
    error::ApiError,
    state::AppState,
};

pub struct SessionContext {
    state: AppState,
    user: Option<PublicAccount>,
    loading: bool,
}

/// Outcome of a successful login: the identity to cache, the cookie to set
/// and where to navigate next.
pub struct LoginOutcome {
    pub user: PublicAccount,
    pub set_cookie: String,
    pub navigate_to: &'static str,
}

pub struct LogoutOutcome {
    pub set_cookie: String,
    pub navigate_to: &'static str,
}

impl SessionContext {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            user: None,
            loading: true,
        }
    }

    /// `None` while loading means "not yet known", afterwards "known absent".
    pub fn current_user(&self) -> Option<&PublicAccount> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-sync the cache from a session cookie value. An absent or
    /// unverifiable token resolves to "known absent" without touching the
    /// store.
    pub async fn resolve(&mut self, cookie_value: Option<&str>) -> Result<(), ApiError> {
        self.loading = false;

        let keys = SessionKeys::from_ref(&self.state);
        let account_id = match cookie_value.and_then(|token| keys.verify(token).ok()) {
            Some(claims) => claims.sub,
            None => {
                self.user = None;
                return Ok(());
            }
        };

        self.user = Account::find_by_id(&self.state.db, account_id)
            .await?
            .map(PublicAccount::from);
        Ok(())
    }

    /// Delegates to the authenticator. On failure the error is returned
    /// unchanged and the cached identity is untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let account = authenticate(&self.state.db, email, password).await?;

        let keys = SessionKeys::from_ref(&self.state);
        let token = keys.sign(account.id)?;
        let user = PublicAccount::from(account);

        self.user = Some(user.clone());
        self.loading = false;

        Ok(LoginOutcome {
            user,
            set_cookie: keys.issue_cookie(&token),
            navigate_to: HOME_PATH,
        })
    }

    /// Write, then re-fetch the canonical record. The partial input is
    /// never trusted as the new cache state.
    pub async fn update_account(
        &mut self,
        id: Uuid,
        update: &UpdateAccountRequest,
    ) -> Result<Option<&PublicAccount>, ApiError> {
        let canonical = Account::update_partial(&self.state.db, id, update).await?;
        self.user = canonical.map(PublicAccount::from);
        Ok(self.user.as_ref())
    }

    /// Clears the cached identity and the cookie. Idempotent: with no
    /// active session the only effect is the navigation target.
    pub fn logout(&mut self) -> LogoutOutcome {
        self.user = None;
        self.loading = false;

        let keys = SessionKeys::from_ref(&self.state);
        LogoutOutcome {
            set_cookie: keys.clear_cookie(),
            navigate_to: LOGIN_PATH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_loading_with_no_identity() {
        let ctx = SessionContext::new(AppState::fake());
        assert!(ctx.is_loading());
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn resolve_without_cookie_is_known_absent() {
        let mut ctx = SessionContext::new(AppState::fake());
        ctx.resolve(None).await.unwrap();
        assert!(!ctx.is_loading());
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn resolve_with_forged_token_never_reaches_the_store() {
        // The fake state's pool has no live connection; a store read would
        // fail loudly instead of returning Ok.
        let mut ctx = SessionContext::new(AppState::fake());
        ctx.resolve(Some("forged-token")).await.unwrap();
        assert!(!ctx.is_loading());
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let mut ctx = SessionContext::new(AppState::fake());

        let first = ctx.logout();
        assert_eq!(first.navigate_to, LOGIN_PATH);
        assert!(first.set_cookie.contains("Max-Age=0"));
        assert!(ctx.current_user().is_none());

        let second = ctx.logout();
        assert_eq!(second.navigate_to, LOGIN_PATH);
        assert_eq!(second.set_cookie, first.set_cookie);
    }
}

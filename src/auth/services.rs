use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    accounts::repo_types::Account,
    auth::password::verify_password,
    error::ApiError,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Verify email and password against the account store.
///
/// Empty fields fail before any store lookup. An unknown email, a wrong
/// password and a deactivated account all collapse into the same
/// `Credentials` failure so the response never reveals which emails are
/// registered. Timing differences between those paths are not masked.
///
/// On success returns the account; issuing the session cookie is the
/// caller's job — this function performs no writes.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<Account, ApiError> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("email and password are required".into()));
    }

    // Case-sensitive exact match; no normalization at login.
    let account = match Account::find_by_email(db, email).await? {
        Some(a) => a,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Credentials);
        }
    };

    if !verify_password(password, &account.password_hash)? {
        warn!(user_id = %account.id, "login invalid password");
        return Err(ApiError::Credentials);
    }

    if !account.is_active {
        warn!(user_id = %account.id, "login deactivated account");
        return Err(ApiError::Credentials);
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("user.name@sub.example.org"));
    }

    #[test]
    fn email_regex_rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[tokio::test]
    async fn empty_fields_fail_before_any_lookup() {
        // The lazy pool has no live connection; reaching the store would error
        // with a connect failure rather than a validation result.
        let state = crate::state::AppState::fake();

        let err = authenticate(&state.db, "", "secret1").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = authenticate(&state.db, "a@b.com", "").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}

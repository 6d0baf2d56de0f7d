use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entitlements::repo_types::{AccessKey, KeyStatus};

/// Current entitlement state of an account, derived from the stored keys
/// and the wall clock. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EntitlementState {
    None,
    Active {
        #[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
        expires_at: OffsetDateTime,
    },
    Expired {
        #[serde(rename = "expiresAt", with = "time::serde::rfc3339")]
        expires_at: OffsetDateTime,
    },
}

/// Pick the current entitlement: among non-revoked keys the one with the
/// latest expiry, compared against `now`. O(keys-for-user).
pub fn pick_current(keys: &[AccessKey], now: OffsetDateTime) -> EntitlementState {
    let current = keys
        .iter()
        .filter(|k| k.status != KeyStatus::Revoked)
        .max_by_key(|k| k.expires_at);

    match current {
        Option::None => EntitlementState::None,
        Some(k) if now >= k.expires_at => EntitlementState::Expired {
            expires_at: k.expires_at,
        },
        Some(k) => EntitlementState::Active {
            expires_at: k.expires_at,
        },
    }
}

/// Evaluate the account's entitlement against the store and the clock.
/// Pure read — no caching, no mutation — so it is safe to call on every
/// request that needs plan validity.
pub async fn current_entitlement(db: &PgPool, user_id: Uuid) -> anyhow::Result<EntitlementState> {
    let keys = AccessKey::list_for_user(db, user_id).await?;
    Ok(pick_current(&keys, OffsetDateTime::now_utc()))
}

/// Generate an opaque, globally unique access key token.
pub fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::repo_types::Plan;
    use time::Duration;

    fn key_with(status: KeyStatus, expires_at: OffsetDateTime) -> AccessKey {
        AccessKey {
            id: Uuid::new_v4(),
            key: generate_key(),
            user_id: Uuid::new_v4(),
            user_email: "a@b.com".into(),
            user_name: "Ana".into(),
            payment_id: None,
            payment_method: None,
            plan: Plan::Monthly,
            status,
            created_at: expires_at - Duration::days(30),
            expires_at,
            is_recurring: false,
            subscription_id: None,
        }
    }

    #[test]
    fn no_keys_means_none() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(pick_current(&[], now), EntitlementState::None);
    }

    #[test]
    fn revoked_only_means_none() {
        let now = OffsetDateTime::now_utc();
        let keys = vec![key_with(KeyStatus::Revoked, now + Duration::days(10))];
        assert_eq!(pick_current(&keys, now), EntitlementState::None);
    }

    #[test]
    fn future_expiry_is_active() {
        let now = OffsetDateTime::now_utc();
        let expires_at = now + Duration::days(10);
        let keys = vec![key_with(KeyStatus::Active, expires_at)];
        assert_eq!(
            pick_current(&keys, now),
            EntitlementState::Active { expires_at }
        );
    }

    #[test]
    fn past_expiry_is_expired() {
        let now = OffsetDateTime::now_utc();
        let expires_at = now - Duration::days(1);
        let keys = vec![key_with(KeyStatus::Active, expires_at)];
        assert_eq!(
            pick_current(&keys, now),
            EntitlementState::Expired { expires_at }
        );
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let now = OffsetDateTime::now_utc();
        let keys = vec![key_with(KeyStatus::Active, now)];
        assert_eq!(
            pick_current(&keys, now),
            EntitlementState::Expired { expires_at: now }
        );
    }

    #[test]
    fn latest_expiry_wins_across_keys() {
        let now = OffsetDateTime::now_utc();
        let newest = now + Duration::days(200);
        let keys = vec![
            key_with(KeyStatus::Expired, now - Duration::days(40)),
            key_with(KeyStatus::Active, newest),
            key_with(KeyStatus::Active, now + Duration::days(5)),
        ];
        assert_eq!(
            pick_current(&keys, now),
            EntitlementState::Active { expires_at: newest }
        );
    }

    #[test]
    fn revoked_keys_never_shadow_active_ones() {
        let now = OffsetDateTime::now_utc();
        let active_expiry = now + Duration::days(5);
        let keys = vec![
            key_with(KeyStatus::Revoked, now + Duration::days(300)),
            key_with(KeyStatus::Active, active_expiry),
        ];
        assert_eq!(
            pick_current(&keys, now),
            EntitlementState::Active {
                expires_at: active_expiry
            }
        );
    }

    #[test]
    fn generated_keys_are_opaque_and_distinct() {
        let a = generate_key();
        let b = generate_key();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn state_serializes_tagged_and_camel_cased() {
        let now = OffsetDateTime::now_utc();
        let json = serde_json::to_string(&EntitlementState::Active { expires_at: now }).unwrap();
        assert!(json.contains("\"state\":\"active\""));
        assert!(json.contains("\"expiresAt\""));

        let json = serde_json::to_string(&EntitlementState::None).unwrap();
        assert!(json.contains("\"state\":\"none\""));
    }
}

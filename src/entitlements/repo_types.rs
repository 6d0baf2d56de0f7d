use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Subscription plan attached to an access key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Semiannual,
    Annual,
}

impl Plan {
    /// Validity window granted by a payment for this plan.
    pub fn duration(&self) -> Duration {
        match self {
            Plan::Monthly => Duration::days(30),
            Plan::Semiannual => Duration::days(180),
            Plan::Annual => Duration::days(365),
        }
    }
}

/// Access key status. Stored `expired` is only ever written lazily by
/// write paths; validity is derived from the clock at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Expired,
    Revoked,
}

/// Access key record — the persisted entitlement shape shared with the
/// payment provider, camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    pub id: Uuid,
    pub key: String, // opaque token, globally unique
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub plan: Plan,
    pub status: KeyStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime, // always after created_at
    pub is_recurring: bool,
    pub subscription_id: Option<String>,
}

/// Insert payload for a freshly paid access key.
#[derive(Debug, Clone)]
pub struct NewAccessKey {
    pub key: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub plan: Plan,
    pub expires_at: OffsetDateTime,
    pub is_recurring: bool,
    pub subscription_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_durations_are_ordered() {
        assert!(Plan::Monthly.duration() < Plan::Semiannual.duration());
        assert!(Plan::Semiannual.duration() < Plan::Annual.duration());
        assert_eq!(Plan::Monthly.duration(), Duration::days(30));
    }

    #[test]
    fn record_serializes_with_the_provider_field_names() {
        let now = OffsetDateTime::now_utc();
        let key = AccessKey {
            id: Uuid::new_v4(),
            key: "k-123".into(),
            user_id: Uuid::new_v4(),
            user_email: "a@b.com".into(),
            user_name: "Ana".into(),
            payment_id: Some("pay_1".into()),
            payment_method: Some("pix".into()),
            plan: Plan::Monthly,
            status: KeyStatus::Active,
            created_at: now,
            expires_at: now + Duration::days(30),
            is_recurring: false,
            subscription_id: None,
        };

        let json = serde_json::to_string(&key).unwrap();
        for field in [
            "\"userId\"",
            "\"userEmail\"",
            "\"userName\"",
            "\"paymentId\"",
            "\"paymentMethod\"",
            "\"createdAt\"",
            "\"expiresAt\"",
            "\"isRecurring\"",
            "\"subscriptionId\"",
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }
        assert!(json.contains("\"status\":\"active\""));
        assert!(json.contains("\"plan\":\"monthly\""));
    }
}

use crate::entitlements::repo_types::{AccessKey, KeyStatus, NewAccessKey};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

impl AccessKey {
    /// All non-revoked keys for an account.
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<AccessKey>> {
        let keys = sqlx::query_as::<_, AccessKey>(
            r#"
            SELECT id, key, user_id, user_email, user_name, payment_id, payment_method,
                   plan, status, created_at, expires_at, is_recurring, subscription_id
            FROM access_keys
            WHERE user_id = $1 AND status <> 'revoked'
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(keys)
    }

    /// Insert a freshly paid key.
    pub async fn create(db: &PgPool, new: &NewAccessKey) -> anyhow::Result<AccessKey> {
        let key = sqlx::query_as::<_, AccessKey>(
            r#"
            INSERT INTO access_keys
                (key, user_id, user_email, user_name, payment_id, payment_method,
                 plan, expires_at, is_recurring, subscription_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, key, user_id, user_email, user_name, payment_id, payment_method,
                      plan, status, created_at, expires_at, is_recurring, subscription_id
            "#,
        )
        .bind(&new.key)
        .bind(new.user_id)
        .bind(&new.user_email)
        .bind(&new.user_name)
        .bind(new.payment_id.as_deref())
        .bind(new.payment_method.as_deref())
        .bind(new.plan)
        .bind(new.expires_at)
        .bind(new.is_recurring)
        .bind(new.subscription_id.as_deref())
        .fetch_one(db)
        .await?;
        Ok(key)
    }

    /// Administrative revocation. Returns false when no matching key exists.
    pub async fn revoke_by_key(db: &PgPool, key: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE access_keys
            SET status = $2
            WHERE key = $1 AND status <> $2
            "#,
        )
        .bind(key)
        .bind(KeyStatus::Revoked)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lazy status sweep scoped to one account, invoked from write paths
    /// only. The evaluator itself never mutates.
    pub async fn expire_lapsed(
        db: &PgPool,
        user_id: Uuid,
        now: OffsetDateTime,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE access_keys
            SET status = $3
            WHERE user_id = $1 AND status = $2 AND expires_at <= $4
            "#,
        )
        .bind(user_id)
        .bind(KeyStatus::Active)
        .bind(KeyStatus::Expired)
        .bind(now)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }
}

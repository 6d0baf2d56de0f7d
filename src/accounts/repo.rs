use crate::accounts::dto::UpdateAccountRequest;
use crate::accounts::repo_types::Account;
use sqlx::PgPool;
use uuid::Uuid;

impl Account {
    /// Find an account by email. Case-sensitive exact match.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, name, password_hash, role, is_active, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    /// Find an account by id.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, name, password_hash, role, is_active, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(account)
    }

    /// Create a new account with hashed password. Role defaults to `user`.
    pub async fn create(
        db: &PgPool,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Account> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, role, is_active, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(account)
    }

    /// Apply a partial update, then re-read the canonical row. The partial
    /// input is never returned as the new state.
    pub async fn update_partial(
        db: &PgPool,
        id: Uuid,
        update: &UpdateAccountRequest,
    ) -> anyhow::Result<Option<Account>> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET email = COALESCE($2, email),
                name = COALESCE($3, name),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.email.as_deref())
        .bind(update.name.as_deref())
        .execute(db)
        .await?;

        Account::find_by_id(db, id).await
    }

    /// Deactivate an account. Accounts are never hard-deleted.
    pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET is_active = false, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }
}

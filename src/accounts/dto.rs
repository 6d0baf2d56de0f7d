use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::repo_types::{Account, Role};

/// Request body for account creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Partial account update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Public part of the account returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            is_active: account.is_active,
        }
    }
}

/// Response returned after account creation.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub success: bool,
    pub user: PublicAccount,
}

/// Request body for administrative deactivation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateAccountRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeactivateAccountResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_account_strips_the_verifier() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            name: "Ana".into(),
            password_hash: "$argon2id$v=19$m=19456".into(),
            role: Role::User,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let public = PublicAccount::from(account);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }
}

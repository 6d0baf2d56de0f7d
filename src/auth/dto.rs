use serde::{Deserialize, Serialize};

use crate::accounts::PublicAccount;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicAccount,
}

/// Response returned after logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

use serde::{Deserialize, Serialize};

use crate::entitlements::repo_types::Plan;

/// Payment confirmation posted by the payment provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookRequest {
    pub user_email: String,
    pub plan: Plan,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub subscription_id: Option<String>,
}

/// Request body for administrative key revocation.
#[derive(Debug, Deserialize)]
pub struct RevokeKeyRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct RevokeKeyResponse {
    pub success: bool,
}

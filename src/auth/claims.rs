use serde::{Deserialize, Serialize};

/// JWT claims carried by session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at (Unix timestamp) - optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Issuer - optional
    #[serde(default)]
    pub iss: Option<String>,

    /// User email - optional
    #[serde(default)]
    pub email: Option<String>,

    /// Display name - optional
    #[serde(default)]
    pub name: Option<String>,
}

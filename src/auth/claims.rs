use serde::{Deserialize, Serialize};

use crate::store::Role;

/// JWT payload. Integrity-protected, not encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub iat: usize,     // issued at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>, // only present when a ttl is configured
}

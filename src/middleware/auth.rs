// Access-token claims and the authenticated-user extension type.
// Token issuance, refresh, and revocation live in the auth service; this
// backend only validates bearer tokens it is handed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token from the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    pub aud: String,
    pub iss: String,
    pub exp: u64,
    pub iat: u64,
}

/// Authenticated user information extracted from a validated token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

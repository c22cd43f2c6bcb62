// Authentication middleware for protected routes.
// Validates bearer tokens and injects AuthenticatedUser into request
// extensions.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::json;
use uuid::Uuid;

use crate::{
    app::AppState,
    middleware::auth::{AccessTokenClaims, AuthenticatedUser},
};

/// Middleware function that validates bearer tokens and adds
/// AuthenticatedUser to extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Missing or invalid authorization header"
                })),
            )
                .into_response();
        },
    };

    match validate_access_token(
        token,
        &app_state.config.jwt_access_secret,
        &app_state.config.jwt_audience,
        &app_state.config.jwt_issuer,
    ) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        },
        Err(e) => {
            tracing::warn!("Token validation failed: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Invalid or expired token"
                })),
            )
                .into_response()
        },
    }
}

/// Validate an HS256 access token against the configured secret, audience,
/// and issuer.
pub fn validate_access_token(
    token: &str,
    secret: &str,
    audience: &str,
    issuer: &str,
) -> Result<AuthenticatedUser, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);

    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| e.to_string())?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| "token subject is not a user id".to_string())?;

    Ok(AuthenticatedUser {
        user_id,
        email: data.claims.email,
    })
}

/// Extractor for AuthenticatedUser from request extensions
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "success": false,
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(secret: &str, aud: &str, iss: &str, sub: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            email: "viewer@example.com".to_string(),
            aud: aud.to_string(),
            iss: iss.to_string(),
            exp: (now + exp_offset) as u64,
            iat: now as u64,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_accepted() {
        let sub = Uuid::new_v4().to_string();
        let token = make_token("s3cret", "placebook.app", "placebook-auth", &sub, 3600);
        let user =
            validate_access_token(&token, "s3cret", "placebook.app", "placebook-auth").unwrap();
        assert_eq!(user.user_id.to_string(), sub);
        assert_eq!(user.email, "viewer@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sub = Uuid::new_v4().to_string();
        let token = make_token("s3cret", "placebook.app", "placebook-auth", &sub, 3600);
        assert!(
            validate_access_token(&token, "other", "placebook.app", "placebook-auth").is_err()
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let sub = Uuid::new_v4().to_string();
        let token = make_token("s3cret", "placebook.app", "placebook-auth", &sub, -3600);
        assert!(
            validate_access_token(&token, "s3cret", "placebook.app", "placebook-auth").is_err()
        );
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let token = make_token("s3cret", "placebook.app", "placebook-auth", "bob", 3600);
        assert!(
            validate_access_token(&token, "s3cret", "placebook.app", "placebook-auth").is_err()
        );
    }
}

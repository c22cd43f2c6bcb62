// HTTP surface tests: routing, auth enforcement, and response shapes.
// Skips when DATABASE_URL is not configured.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use serial_test::serial;
use std::net::SocketAddr;
use tower::util::ServiceExt;
use uuid::Uuid;

use placebook_backend::middleware::auth::AccessTokenClaims;
use placebook_backend::{health_check, share_routes, AppConfig, AppState};

const JWT_SECRET: &str = "api-test-jwt-secret-0123456789abcdef";
const JWT_AUDIENCE: &str = "placebook-app";
const JWT_ISSUER: &str = "placebook-api";

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        rust_log: "debug".to_string(),
        database_url,
        database_max_connections: 5,
        database_min_connections: 1,
        database_connect_timeout: 10,
        database_idle_timeout: 300,
        database_max_lifetime: 1800,
        share_token_secret: common::TEST_SECRET.to_string(),
        share_base_url: common::TEST_BASE_URL.to_string(),
        asset_base_url: common::TEST_ASSET_BASE_URL.to_string(),
        share_link_ttl_days: common::TEST_TTL_DAYS,
        jwt_access_secret: JWT_SECRET.to_string(),
        jwt_audience: JWT_AUDIENCE.to_string(),
        jwt_issuer: JWT_ISSUER.to_string(),
        disable_embedded_migrations: true,
    }
}

async fn test_app() -> Option<(Router, AppState)> {
    let pool = common::test_pool().await?;
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let state = AppState::new(test_config(database_url), pool);
    let app = Router::new()
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1/share", share_routes(state.clone()))
        .with_state(state.clone());

    Some((app, state))
}

fn bearer_token(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        email: format!("{}@test.placebook", user_id.simple()),
        aud: JWT_AUDIENCE.to_string(),
        iss: JWT_ISSUER.to_string(),
        exp: (now + Duration::minutes(15)).timestamp() as u64,
        iat: now.timestamp() as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encode")
}

fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let mut request = builder
        .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
        .expect("request");
    // Simulate a client connection for handlers that read the peer address
    request.extensions_mut().insert(axum::extract::ConnectInfo(
        "127.0.0.1:4000".parse::<SocketAddr>().expect("addr"),
    ));
    request
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
#[serial]
async fn health_endpoint_reports_healthy_database() {
    let Some((app, _state)) = test_app().await else {
        eprintln!("Skipping: DATABASE_URL not set");
        return;
    };

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"]["postgresql"]["status"], "healthy");
}

#[tokio::test]
#[serial]
async fn protected_routes_require_a_bearer_token() {
    let Some((app, _state)) = test_app().await else {
        eprintln!("Skipping: DATABASE_URL not set");
        return;
    };

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share",
            None,
            json!({ "place_id": Uuid::new_v4() }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/share/my-stats")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn share_create_resolve_and_stats_over_http() {
    let Some((app, state)) = test_app().await else {
        eprintln!("Skipping: DATABASE_URL not set");
        return;
    };

    let sharer = common::seed_user(&state.diesel_pool, "api_sharer").await;
    let place = common::seed_place(&state.diesel_pool, sharer, "Nyhavn Canal").await;
    let token = bearer_token(sharer);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share",
            Some(&token),
            json!({ "place_id": place }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let public_code = created["public_code"].as_str().expect("code").to_string();
    let ref_token = created["token"].as_str().expect("token").to_string();

    // Anyone can resolve the public view without credentials
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/share/place/{}", public_code))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let place_view = body_json(response).await;
    assert_eq!(place_view["name"], "Nyhavn Canal");
    assert_eq!(place_view["view_count"], 1);

    // Anonymous tracking always reports success
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share/track-view",
            None,
            json!({
                "public_code": public_code,
                "token": ref_token,
                "session_id": format!("sess-{}", Uuid::new_v4().simple())
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/share/my-stats")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    let stat = stats
        .as_array()
        .expect("array")
        .iter()
        .find(|s| s["public_code"] == public_code.as_str())
        .expect("stat row")
        .clone();
    assert_eq!(stat["view_count"], 1);
    assert_eq!(stat["tracking_count"], 1);

    common::cleanup_users(&state.diesel_pool, &[sharer]).await;
}

#[tokio::test]
#[serial]
async fn connect_friend_reports_refusals_in_the_body() {
    let Some((app, state)) = test_app().await else {
        eprintln!("Skipping: DATABASE_URL not set");
        return;
    };

    let sharer = common::seed_user(&state.diesel_pool, "api_sharer").await;
    let place = common::seed_place(&state.diesel_pool, sharer, "Harbor Bath").await;
    let sharer_token = bearer_token(sharer);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share",
            Some(&sharer_token),
            json!({ "place_id": place }),
        ))
        .await
        .expect("response");
    let ref_token = body_json(response).await["token"]
        .as_str()
        .expect("token")
        .to_string();

    // A sharer following their own link gets a refusal, not an error status
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share/connect-friend",
            Some(&sharer_token),
            json!({ "token": ref_token }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // A new user connects successfully, then gets the already-connected refusal
    let recipient = common::seed_user(&state.diesel_pool, "api_recipient").await;
    let recipient_token = bearer_token(recipient);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share/connect-friend",
            Some(&recipient_token),
            json!({ "token": ref_token }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/share/connect-friend",
            Some(&recipient_token),
            json!({ "token": ref_token }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], false);

    // Undecodable tokens are a client error
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/share/connect-friend",
            Some(&recipient_token),
            json!({ "token": "zz-not-a-token" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    common::cleanup_users(&state.diesel_pool, &[sharer, recipient]).await;
}

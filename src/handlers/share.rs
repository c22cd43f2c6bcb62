// Share link API endpoints: create/reuse, public resolution, anonymous view
// tracking, friend connect, and sharer stats.

use axum::{
    extract::{ConnectInfo, Extension, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::warn;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::share_link::{
        ConnectFriendRequest, ConnectFriendResponse, CreateShareRequest, PublicPlaceView,
        ShareLinkResponse, ShareStat, TrackViewRequest,
    },
    utils::share_errors::ShareError,
};

// =============================================================================
// SHARE HANDLERS
// =============================================================================

/// Create a share link for one of the caller's places, or return the
/// existing active one.
/// POST /api/v1/share
#[utoipa::path(
    post,
    path = "/v1/share",
    tag = "Share",
    operation_id = "createShareLink",
    request_body = CreateShareRequest,
    responses(
        (status = 201, description = "Share link created or reused", body = ShareLinkResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - caller does not own the place"),
        (status = 404, description = "Place not found")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn create_share(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateShareRequest>,
) -> impl IntoResponse {
    match state
        .share_link_service
        .create_or_reuse(auth_user.user_id, request.place_id)
        .await
    {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Public, unauthenticated view of a shared place.
/// GET /api/v1/share/place/{code}
#[utoipa::path(
    get,
    path = "/v1/share/place/{code}",
    tag = "Share",
    operation_id = "getSharedPlace",
    params(
        ("code" = String, Path, description = "Public share code", example = "aZ3kX9mQp2L")
    ),
    responses(
        (status = 200, description = "Public place view", body = PublicPlaceView),
        (status = 404, description = "Unknown, inactive, or expired share code")
    )
)]
pub async fn public_place(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match state.share_link_service.resolve_public(&code).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record an anonymous view. Always answers success: tracking is telemetry
/// and must never fail the public render.
/// POST /api/v1/share/track-view
#[utoipa::path(
    post,
    path = "/v1/share/track-view",
    tag = "Share",
    operation_id = "trackShareView",
    request_body = TrackViewRequest,
    responses(
        (status = 200, description = "Always succeeds")
    )
)]
pub async fn track_view(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<TrackViewRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        warn!("Dropping malformed track-view request: {}", e);
        return Json(json!({ "success": true }));
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    state
        .view_tracking_service
        .track_view(
            &request.public_code,
            &request.token,
            &request.session_id,
            Some(addr.ip().to_string()),
            user_agent,
        )
        .await;

    Json(json!({ "success": true }))
}

/// Attribute the caller's sign-up to the sharer in the token and connect
/// them as friends.
/// POST /api/v1/share/connect-friend
#[utoipa::path(
    post,
    path = "/v1/share/connect-friend",
    tag = "Share",
    operation_id = "connectFriend",
    request_body = ConnectFriendRequest,
    responses(
        (status = 200, description = "Connect outcome with reason", body = ConnectFriendResponse),
        (status = 400, description = "Bad request - undecodable referral token"),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn connect_friend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<ConnectFriendRequest>,
) -> impl IntoResponse {
    if let Err(e) = request.validate() {
        return ShareError::from(e).into_response();
    }

    let result = state
        .friend_link_service
        .connect_friend(
            &request.token,
            auth_user.user_id,
            request.session_id.as_deref(),
        )
        .await;

    match result {
        Ok(()) => Json(ConnectFriendResponse {
            success: true,
            message: "Friend added successfully".to_string(),
        })
        .into_response(),
        // Declined outcomes are answers, not failures: the caller gets a
        // human-readable reason with success=false
        Err(
            e @ (ShareError::SelfReferral
            | ShareError::AlreadyConnected
            | ShareError::AlreadyPending),
        ) => Json(ConnectFriendResponse {
            success: false,
            message: e.to_string(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Per-link view and conversion stats for the caller's active share links.
/// GET /api/v1/share/my-stats
#[utoipa::path(
    get,
    path = "/v1/share/my-stats",
    tag = "Share",
    operation_id = "getMyShareStats",
    responses(
        (status = 200, description = "Share statistics", body = Vec<ShareStat>),
        (status = 401, description = "Unauthorized - invalid or missing token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn my_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    match state.share_link_service.stats_for(auth_user.user_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => e.into_response(),
    }
}

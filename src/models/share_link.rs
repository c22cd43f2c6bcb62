// Share link model and request/response DTOs for the sharing API.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::share_links;

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Share link representing one public exposure of a place by one sharer
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema)]
#[diesel(table_name = share_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[schema(example = json!({
    "id": "123e4567-e89b-12d3-a456-426614174000",
    "place_id": "123e4567-e89b-12d3-a456-426614174001",
    "user_id": "123e4567-e89b-12d3-a456-426614174002",
    "public_code": "aZ3kX9mQp2L",
    "view_count": 42,
    "expires_at": "2026-09-30T12:00:00Z",
    "is_active": true,
    "created_at": "2026-08-31T12:00:00Z"
}))]
pub struct ShareLink {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub public_code: String,
    pub view_count: i32,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// New share link for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = share_links)]
pub struct NewShareLink {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub public_code: String,
    pub view_count: i32,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Newest active link for a (place, sharer) pair, expired or not.
    /// Expiry is the caller's concern; duplicates from the creation race are
    /// resolved by taking the newest row.
    pub async fn find_active_for_owner(
        conn: &mut AsyncPgConnection,
        place: Uuid,
        sharer: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::share_links::dsl::*;

        share_links
            .filter(place_id.eq(place).and(user_id.eq(sharer)).and(is_active.eq(true)))
            .order(created_at.desc())
            .first::<ShareLink>(conn)
            .await
            .optional()
    }

    /// Active link by its externally visible code.
    pub async fn find_active_by_code(
        conn: &mut AsyncPgConnection,
        code: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::share_links::dsl::*;

        share_links
            .filter(public_code.eq(code).and(is_active.eq(true)))
            .first::<ShareLink>(conn)
            .await
            .optional()
    }

    /// Increment the view counter by one. A lost increment under a rare
    /// concurrent race is acceptable; the SQL-side addition keeps single
    /// requests atomic.
    pub async fn increment_view_count(
        conn: &mut AsyncPgConnection,
        link_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::share_links::dsl::*;

        diesel::update(share_links.filter(id.eq(link_id)))
            .set(view_count.eq(view_count + 1))
            .execute(conn)
            .await
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

/// Request to create (or reuse) a share link for a place
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "place_id": "123e4567-e89b-12d3-a456-426614174001"
}))]
pub struct CreateShareRequest {
    pub place_id: Uuid,
}

/// Share link response returned on creation or reuse
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "public_code": "aZ3kX9mQp2L",
    "url": "https://placebook.app/share/place/aZ3kX9mQp2L?ref=6a1f...",
    "token": "6a1f0d3e9c..."
}))]
pub struct ShareLinkResponse {
    pub public_code: String,
    pub url: String,
    pub token: String,
}

/// Anonymous view tracking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "public_code": "aZ3kX9mQp2L",
    "token": "6a1f0d3e9c...",
    "session_id": "sess-5f2c1b"
}))]
pub struct TrackViewRequest {
    #[validate(length(min = 1, max = 20, message = "Invalid public code"))]
    pub public_code: String,

    #[validate(length(min = 1, max = 512, message = "Invalid token"))]
    pub token: String,

    #[validate(length(min = 1, max = 128, message = "Invalid session id"))]
    pub session_id: String,
}

/// Friend connect request submitted after the viewer authenticates.
/// `session_id` is optional but recommended: resubmitting the session the
/// browser tracked with pins attribution to the exact view event.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "token": "6a1f0d3e9c...",
    "session_id": "sess-5f2c1b"
}))]
pub struct ConnectFriendRequest {
    #[validate(length(min = 1, max = 512, message = "Invalid token"))]
    pub token: String,

    #[validate(length(max = 128, message = "Invalid session id"))]
    pub session_id: Option<String>,
}

/// Friend connect outcome with a human-readable reason
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "message": "Friend added successfully"
}))]
pub struct ConnectFriendResponse {
    pub success: bool,
    pub message: String,
}

/// Who shared the place, shown on the public page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SharerInfo {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// Privacy-reduced public projection of a shared place.
/// The creation timestamp is deliberately coarsened to month/year.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "name": "Trattoria da Enzo",
    "photos": ["https://cdn.placebook.app/photos/abc.jpg"],
    "location": "Rome, Italy",
    "rating": 5,
    "notes": "Get the cacio e pepe",
    "price": "$$",
    "category": "restaurant",
    "saved": "March 2026",
    "shared_by": { "display_name": "Ada", "avatar_url": null },
    "view_count": 43
}))]
pub struct PublicPlaceView {
    pub name: String,
    pub photos: Vec<String>,
    pub location: Option<String>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub saved: String,
    pub shared_by: SharerInfo,
    pub view_count: i32,
}

/// Per-link statistics for the sharer dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "public_code": "aZ3kX9mQp2L",
    "place_name": "Trattoria da Enzo",
    "view_count": 42,
    "tracking_count": 17,
    "conversions": 3,
    "created_at": "2026-08-31T12:00:00Z"
}))]
pub struct ShareStat {
    pub public_code: String,
    pub place_name: String,
    pub view_count: i32,
    pub tracking_count: i64,
    pub conversions: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Compose the distributable share URL from the configured base.
pub fn share_url(base_url: &str, public_code: &str, token: &str) -> String {
    format!(
        "{}/share/place/{}?ref={}",
        base_url.trim_end_matches('/'),
        public_code,
        token
    )
}

/// Human-formatted month/year, e.g. "March 2026".
pub fn format_month_year(ts: DateTime<Utc>) -> String {
    ts.format("%B %Y").to_string()
}

/// Rewrite a stored photo path into an absolute URL. Paths that are already
/// absolute pass through unchanged.
pub fn absolute_photo_url(asset_base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            asset_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

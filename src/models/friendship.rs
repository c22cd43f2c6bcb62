// Friendship edge model.
// The request/accept workflow for ordinary friendships lives in the social
// service; this subsystem only checks for existing edges and inserts the
// two accepted rows a referral conversion produces.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::friendships;

/// Friendship status stored as a lowercase string column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Declined => "declined",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "declined" => Ok(FriendshipStatus::Declined),
            _ => Err(format!("Invalid friendship status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: String,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = friendships)]
pub struct NewFriendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub status: String,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewFriendship {
    /// One directed accepted edge, as created by the referral auto-linker.
    pub fn accepted(from: Uuid, to: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: from,
            friend_id: to,
            status: FriendshipStatus::Accepted.as_str().to_string(),
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Friendship {
    /// All edges between two users, both directions. The external workflow
    /// can leave asymmetric rows (one direction accepted, the other
    /// declined), so callers must inspect every edge rather than the first
    /// row the store happens to return.
    pub async fn edges_between(
        conn: &mut AsyncPgConnection,
        a: Uuid,
        b: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::friendships::dsl::*;

        friendships
            .filter(
                user_id
                    .eq(a)
                    .and(friend_id.eq(b))
                    .or(user_id.eq(b).and(friend_id.eq(a))),
            )
            .load::<Friendship>(conn)
            .await
    }
}

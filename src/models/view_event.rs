// Share view event model.
// One row per (link, session): created on first anonymous view, touched on
// repeat views, stamped once on conversion and once more when a friendship
// results. Rows are never deleted by this subsystem.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::share_view_events;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = share_view_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ViewEvent {
    pub id: Uuid,
    pub share_link_id: Uuid,
    pub sharer_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub viewed_at: DateTime<Utc>,
    pub converted_at: Option<DateTime<Utc>>,
    pub friend_link_created: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = share_view_events)]
pub struct NewViewEvent {
    pub id: Uuid,
    pub share_link_id: Uuid,
    pub sharer_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub viewed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ViewEvent {
    /// Existing event for a (link, session) pair. Racy duplicates are
    /// possible; the newest row wins, matching the tracking update path.
    pub async fn find_by_link_and_session(
        conn: &mut AsyncPgConnection,
        link_id: Uuid,
        session: &str,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::share_view_events::dsl::*;

        share_view_events
            .filter(share_link_id.eq(link_id).and(session_id.eq(session)))
            .order(created_at.desc())
            .first::<ViewEvent>(conn)
            .await
            .optional()
    }

    /// Newest unattributed event for a sharer, optionally pinned to the
    /// session the converting client originally browsed with.
    pub async fn find_attribution_candidate(
        conn: &mut AsyncPgConnection,
        sharer: Uuid,
        session: Option<&str>,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::share_view_events::dsl::*;

        if let Some(session) = session {
            let exact = share_view_events
                .filter(
                    sharer_id
                        .eq(sharer)
                        .and(recipient_id.is_null())
                        .and(session_id.eq(session)),
                )
                .order(created_at.desc())
                .first::<ViewEvent>(conn)
                .await
                .optional()?;

            if exact.is_some() {
                return Ok(exact);
            }
        }

        share_view_events
            .filter(sharer_id.eq(sharer).and(recipient_id.is_null()))
            .order(created_at.desc())
            .first::<ViewEvent>(conn)
            .await
            .optional()
    }

    /// Touch `viewed_at` on a repeat view from the same session. The sharer
    /// recorded at first view is preserved, not recomputed.
    pub async fn touch(
        conn: &mut AsyncPgConnection,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::share_view_events::dsl::*;

        diesel::update(share_view_events.filter(id.eq(event_id)))
            .set(viewed_at.eq(now))
            .execute(conn)
            .await
    }

    /// Stamp the conversion fields. `converted_at` is set once.
    pub async fn mark_converted(
        conn: &mut AsyncPgConnection,
        event_id: Uuid,
        recipient: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::share_view_events::dsl::*;

        diesel::update(share_view_events.filter(id.eq(event_id)))
            .set((recipient_id.eq(recipient), converted_at.eq(now)))
            .execute(conn)
            .await
    }

    /// Record that the conversion produced a friendship.
    pub async fn mark_friend_linked(
        conn: &mut AsyncPgConnection,
        event_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::share_view_events::dsl::*;

        diesel::update(share_view_events.filter(id.eq(event_id)))
            .set(friend_link_created.eq(true))
            .execute(conn)
            .await
    }
}

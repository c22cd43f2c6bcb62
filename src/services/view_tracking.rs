// Anonymous view tracking.
//
// This is best-effort, side-channel telemetry: nothing here may ever block
// or fail the public page render. Failures go through tracing with enough
// structure to stay operable, then vanish from the caller's perspective.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    db::DieselPool,
    models::{
        share_link::ShareLink,
        view_event::{NewViewEvent, ViewEvent},
    },
    services::referral_token::ReferralTokenCipher,
    utils::share_errors::{ShareError, ShareResult},
};

pub struct ViewTrackingService {
    pool: DieselPool,
    cipher: ReferralTokenCipher,
}

impl ViewTrackingService {
    pub fn new(pool: DieselPool, cipher: ReferralTokenCipher) -> Self {
        Self { pool, cipher }
    }

    /// Record (or touch) the anonymous view event for this link and session.
    /// Never returns an error: the no-fail contract of the tracking endpoint
    /// lives here, not in swallowed handler code.
    pub async fn track_view(
        &self,
        public_code: &str,
        token: &str,
        session_id: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) {
        // Forged and stale tokens are expected traffic on an open endpoint
        let sharer = match self.cipher.decode(token) {
            Ok(id) => id,
            Err(e) => {
                warn!(public_code, error = %e, "Dropping view event with undecodable token");
                return;
            },
        };

        if let Err(e) = self
            .record(public_code, sharer, session_id, ip_address, user_agent)
            .await
        {
            warn!(public_code, error = %e, "Failed to record view event");
        }
    }

    async fn record(
        &self,
        public_code: &str,
        sharer: Uuid,
        session_id: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> ShareResult<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ShareError::DatabaseError(e.to_string()))?;

        // Events key on the link's internal id, resolved here once, so the
        // stats join and the tracking path agree on identity.
        let link = match ShareLink::find_active_by_code(&mut conn, public_code).await? {
            Some(link) => link,
            None => {
                debug!(public_code, "View event for unknown or inactive code, dropping");
                return Ok(());
            },
        };

        let now = Utc::now();

        // Repeat view from a known session touches viewed_at and keeps the
        // sharer recorded at first view.
        if let Some(existing) =
            ViewEvent::find_by_link_and_session(&mut conn, link.id, session_id).await?
        {
            ViewEvent::touch(&mut conn, existing.id, now).await?;
            return Ok(());
        }

        // The lookup-then-create above can race with a second first view
        // from the same session; a rare duplicate row is tolerated.
        let event = NewViewEvent {
            id: Uuid::new_v4(),
            share_link_id: link.id,
            sharer_id: sharer,
            recipient_id: None,
            session_id: session_id.to_string(),
            ip_address,
            user_agent,
            viewed_at: now,
            created_at: now,
        };

        {
            use crate::schema::share_view_events::dsl::share_view_events;
            use diesel_async::RunQueryDsl;

            diesel::insert_into(share_view_events)
                .values(&event)
                .execute(&mut conn)
                .await?;
        }

        Ok(())
    }
}

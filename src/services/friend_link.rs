// Conversion attribution and friendship auto-linking.
//
// Referral-originated connections skip the normal request/accept handshake:
// the sharer consented by sharing and the recipient by following the link
// and signing up, so both directed edges are created accepted.

use chrono::Utc;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DieselPool,
    models::{
        friendship::{Friendship, FriendshipStatus, NewFriendship},
        view_event::ViewEvent,
    },
    services::referral_token::ReferralTokenCipher,
    utils::share_errors::{ShareError, ShareResult},
};

pub struct FriendLinkService {
    pool: DieselPool,
    cipher: ReferralTokenCipher,
}

impl FriendLinkService {
    pub fn new(pool: DieselPool, cipher: ReferralTokenCipher) -> Self {
        Self { pool, cipher }
    }

    /// Attribute the recipient's sign-up to the sharer encoded in the token
    /// and connect the two.
    ///
    /// The attribute-then-link sequence is deliberately not transactional:
    /// a failure between steps can leave an attributed event without edges.
    /// Retrying is safe only because the existing-friendship check refuses
    /// duplicate edges; a retry may attribute a different, newer view event.
    #[instrument(skip(self, token))]
    pub async fn connect_friend(
        &self,
        token: &str,
        recipient: Uuid,
        session_id: Option<&str>,
    ) -> ShareResult<()> {
        // User-initiated path: decode failure is reported, unlike tracking
        let sharer = self.cipher.decode(token)?;

        if sharer == recipient {
            return Err(ShareError::SelfReferral);
        }

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ShareError::DatabaseError(e.to_string()))?;

        // Best-match heuristic: the exact session's event when the client
        // resubmitted its session id, otherwise the sharer's newest
        // unattributed event.
        let now = Utc::now();
        let candidate =
            ViewEvent::find_attribution_candidate(&mut conn, sharer, session_id).await?;

        let attributed_event = match candidate {
            Some(event) => {
                ViewEvent::mark_converted(&mut conn, event.id, recipient, now).await?;
                info!(event_id = %event.id, "Attributed conversion to view event");
                Some(event.id)
            },
            None => {
                warn!(%sharer, "No unattributed view event found for conversion");
                None
            },
        };

        // Any accepted edge in either direction means the two are already
        // connected, even when the opposite direction was declined. Declined
        // edges alone do not block a referral connection.
        let edges = Friendship::edges_between(&mut conn, sharer, recipient).await?;
        let mut pending = false;
        for edge in &edges {
            match FriendshipStatus::from_string(&edge.status) {
                Ok(FriendshipStatus::Accepted) => return Err(ShareError::AlreadyConnected),
                Ok(FriendshipStatus::Pending) => pending = true,
                _ => {},
            }
        }
        if pending {
            return Err(ShareError::AlreadyPending);
        }

        self.link(&mut conn, sharer, recipient).await?;
        self.finish(&mut conn, attributed_event).await
    }

    /// Create both directed accepted edges in one batch write.
    async fn link(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        sharer: Uuid,
        recipient: Uuid,
    ) -> ShareResult<()> {
        use crate::schema::friendships::dsl::friendships;

        let now = Utc::now();
        let edges = vec![
            NewFriendship::accepted(sharer, recipient, now),
            NewFriendship::accepted(recipient, sharer, now),
        ];

        diesel::insert_into(friendships)
            .values(&edges)
            .execute(conn)
            .await?;

        info!(%sharer, %recipient, "Created bidirectional friendship from referral");
        Ok(())
    }

    async fn finish(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        attributed_event: Option<Uuid>,
    ) -> ShareResult<()> {
        if let Some(event_id) = attributed_event {
            ViewEvent::mark_friend_linked(conn, event_id).await?;
        }
        Ok(())
    }
}

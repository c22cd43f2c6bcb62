// Share link business logic: create-or-reuse, public resolution with view
// counting, and per-sharer stats.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DieselPool,
    models::{
        place::Place,
        share_link::{
            absolute_photo_url, format_month_year, share_url, NewShareLink, PublicPlaceView,
            ShareLink, ShareLinkResponse, ShareStat, SharerInfo,
        },
        user::User,
    },
    services::{
        public_code::{generate_public_code, MAX_CODE_ATTEMPTS},
        referral_token::ReferralTokenCipher,
    },
    utils::share_errors::{ShareError, ShareResult},
};

pub struct ShareLinkService {
    pool: DieselPool,
    cipher: ReferralTokenCipher,
    base_url: String,
    asset_base_url: String,
    link_ttl: Duration,
}

impl ShareLinkService {
    pub fn new(
        pool: DieselPool,
        cipher: ReferralTokenCipher,
        base_url: String,
        asset_base_url: String,
        link_ttl_days: i64,
    ) -> Self {
        Self {
            pool,
            cipher,
            base_url,
            asset_base_url,
            link_ttl: Duration::days(link_ttl_days),
        }
    }

    /// Create a share link for (place, sharer), or hand back the existing
    /// active one.
    ///
    /// The lookup-then-insert here is a known check-then-act window: two
    /// concurrent first shares can both miss the lookup and insert two
    /// active links. Stale duplicates coexist harmlessly and the lookup
    /// always prefers the newest, so the race is tolerated rather than
    /// locked away.
    #[instrument(skip(self))]
    pub async fn create_or_reuse(
        &self,
        sharer: Uuid,
        place_id: Uuid,
    ) -> ShareResult<ShareLinkResponse> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ShareError::DatabaseError(e.to_string()))?;

        let place = Place::find_by_id(&mut conn, place_id)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ShareError::NotFound,
                other => ShareError::from(other),
            })?;
        if place.user_id != sharer {
            return Err(ShareError::NotAuthorized);
        }

        let now = Utc::now();
        let link = match ShareLink::find_active_for_owner(&mut conn, place_id, sharer).await? {
            Some(existing) if !existing.is_expired(now) => {
                info!(public_code = %existing.public_code, "Reusing existing share link");
                existing
            },
            _ => self.insert_with_fresh_code(&mut conn, place_id, sharer).await?,
        };

        let token = self.cipher.encode(&sharer);
        Ok(ShareLinkResponse {
            url: share_url(&self.base_url, &link.public_code, &token),
            public_code: link.public_code,
            token,
        })
    }

    /// Insert a new link, retrying with a fresh code if the unique index on
    /// public_code reports a collision.
    async fn insert_with_fresh_code(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        place: Uuid,
        sharer: Uuid,
    ) -> ShareResult<ShareLink> {
        use crate::schema::share_links::dsl::share_links;

        let now = Utc::now();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let new_link = NewShareLink {
                id: Uuid::new_v4(),
                place_id: place,
                user_id: sharer,
                public_code: generate_public_code(),
                view_count: 0,
                expires_at: now + self.link_ttl,
                is_active: true,
                created_at: now,
            };

            match diesel::insert_into(share_links)
                .values(&new_link)
                .get_result::<ShareLink>(conn)
                .await
            {
                Ok(link) => {
                    info!(public_code = %link.public_code, "Created share link");
                    return Ok(link);
                },
                Err(diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                )) => {
                    warn!(attempt, "Public code collision, regenerating");
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShareError::InternalError)
    }

    /// Resolve a public code into the privacy-reduced view, counting the
    /// view. Expired links surface as Expired (404 externally).
    #[instrument(skip(self))]
    pub async fn resolve_public(&self, code: &str) -> ShareResult<PublicPlaceView> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ShareError::DatabaseError(e.to_string()))?;

        let link = ShareLink::find_active_by_code(&mut conn, code)
            .await?
            .ok_or(ShareError::NotFound)?;

        let now = Utc::now();
        if link.is_expired(now) {
            return Err(ShareError::Expired);
        }

        ShareLink::increment_view_count(&mut conn, link.id).await?;

        let place = Place::find_by_id(&mut conn, link.place_id).await?;
        let owner = User::find_by_id(&mut conn, link.user_id).await?;

        Ok(PublicPlaceView {
            name: place.name.clone(),
            photos: place
                .photo_paths()
                .iter()
                .map(|p| absolute_photo_url(&self.asset_base_url, p))
                .collect(),
            location: place.location.clone(),
            rating: place.rating,
            notes: place.notes.clone(),
            price: place.price.clone(),
            category: place.category.clone(),
            saved: format_month_year(place.created_at),
            shared_by: SharerInfo {
                display_name: owner.display_name,
                avatar_url: owner.avatar_url,
            },
            view_count: link.view_count + 1,
        })
    }

    /// Per-link stats for a sharer's dashboard. Read-only.
    ///
    /// Three queries total regardless of how many links the sharer owns:
    /// links joined with place names, then grouped event counts.
    pub async fn stats_for(&self, sharer: Uuid) -> ShareResult<Vec<ShareStat>> {
        use crate::schema::places;
        use crate::schema::share_links::dsl as links;
        use crate::schema::share_view_events::dsl as events;
        use std::collections::HashMap;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ShareError::DatabaseError(e.to_string()))?;

        let owned: Vec<(ShareLink, String)> = links::share_links
            .inner_join(places::table)
            .filter(links::user_id.eq(sharer).and(links::is_active.eq(true)))
            .order(links::created_at.desc())
            .select((ShareLink::as_select(), places::name))
            .load::<(ShareLink, String)>(&mut conn)
            .await?;

        let link_ids: Vec<Uuid> = owned.iter().map(|(link, _)| link.id).collect();

        let tracking_counts: HashMap<Uuid, i64> = events::share_view_events
            .filter(events::share_link_id.eq_any(&link_ids))
            .group_by(events::share_link_id)
            .select((events::share_link_id, diesel::dsl::count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        let conversion_counts: HashMap<Uuid, i64> = events::share_view_events
            .filter(
                events::share_link_id
                    .eq_any(&link_ids)
                    .and(events::converted_at.is_not_null()),
            )
            .group_by(events::share_link_id)
            .select((events::share_link_id, diesel::dsl::count_star()))
            .load::<(Uuid, i64)>(&mut conn)
            .await?
            .into_iter()
            .collect();

        Ok(owned
            .into_iter()
            .map(|(link, place_name)| ShareStat {
                tracking_count: tracking_counts.get(&link.id).copied().unwrap_or(0),
                conversions: conversion_counts.get(&link.id).copied().unwrap_or(0),
                public_code: link.public_code,
                place_name,
                view_count: link.view_count,
                created_at: link.created_at,
            })
            .collect())
    }
}

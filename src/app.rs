// Shared application state handed to every handler.

use std::sync::Arc;

use crate::app_config::AppConfig;
use crate::db::diesel_pool::DieselPool;
use crate::services::{
    friend_link::FriendLinkService, referral_token::ReferralTokenCipher,
    share_link::ShareLinkService, view_tracking::ViewTrackingService,
};

/// Application state shared across all request handlers.
///
/// Everything in here is either an `Arc` or internally pooled, so cloning
/// the state per-request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub share_link_service: Arc<ShareLinkService>,
    pub view_tracking_service: Arc<ViewTrackingService>,
    pub friend_link_service: Arc<FriendLinkService>,
}

impl AppState {
    /// Wire the services against an already-created connection pool.
    pub fn new(config: AppConfig, diesel_pool: DieselPool) -> Self {
        let cipher = ReferralTokenCipher::new(&config.share_token_secret);

        let share_link_service = Arc::new(ShareLinkService::new(
            diesel_pool.clone(),
            cipher.clone(),
            config.share_base_url.clone(),
            config.asset_base_url.clone(),
            config.share_link_ttl_days,
        ));
        let view_tracking_service = Arc::new(ViewTrackingService::new(
            diesel_pool.clone(),
            cipher.clone(),
        ));
        let friend_link_service =
            Arc::new(FriendLinkService::new(diesel_pool.clone(), cipher));

        Self {
            config: Arc::new(config),
            diesel_pool,
            share_link_service,
            view_tracking_service,
            friend_link_service,
        }
    }
}

pub mod share;

pub use share::{connect_friend, create_share, my_stats, public_place, track_view};

use crate::app::AppState;
use crate::middleware;

/// Route builder for the share subsystem.
///
/// Creation, friend connect, and stats sit behind bearer auth; the public
/// place view and anonymous tracking do not.
pub fn share_routes(state: AppState) -> axum::Router<AppState> {
    use axum::routing::{get, post};

    let protected = axum::Router::new()
        .route("/", post(share::create_share))
        .route("/connect-friend", post(share::connect_friend))
        .route("/my-stats", get(share::my_stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    let public = axum::Router::new()
        .route("/place/{code}", get(share::public_place))
        .route("/track-view", post(share::track_view));

    protected.merge(public)
}

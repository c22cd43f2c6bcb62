// Library exports for the placebook backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, ConfigError};
pub use db::{check_diesel_health, create_diesel_pool, DieselDatabaseConfig, DieselPool};
pub use middleware::auth_middleware;
pub use middleware::AuthenticatedUser;
pub use services::referral_token::{ReferralTokenCipher, ReferralTokenError};
pub use utils::share_errors::{ShareError, ShareResult};

// Re-export handler route builders
pub use handlers::share_routes;

// Re-export individual handlers for direct use
pub use handlers::share::{connect_friend, create_share, my_stats, public_place, track_view};

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let timestamp = chrono::Utc::now().to_rfc3339();

    // Check PostgreSQL
    let (overall_healthy, postgres_health) =
        match db::check_diesel_health(&state.diesel_pool).await {
            Ok(_) => (
                true,
                serde_json::json!({
                    "status": "healthy",
                    "max_connections": state.config.database_max_connections,
                    "error": null
                }),
            ),
            Err(e) => (
                false,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": format!("Database connection failed: {}", e)
                }),
            ),
        };

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "placebook-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

// Library initialization function for external consumers
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    // Config errors are fatal on purpose: refusing to boot beats signing
    // referral tokens with a placeholder secret
    let config = AppConfig::from_env()?;

    info!("Initializing database pool...");
    let db_config = DieselDatabaseConfig::from_app_config(&config);
    let diesel_pool = create_diesel_pool(db_config).await?;

    if !config.disable_embedded_migrations {
        info!("Running embedded migrations...");
        let applied = db::run_migrations(&config.database_url)
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
        info!("Applied {} pending migrations", applied);
    }

    Ok(AppState::new(config, diesel_pool))
}

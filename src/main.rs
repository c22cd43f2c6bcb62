use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use placebook_backend::{
    app_config::AppConfig,
    db::{self, mask_connection_string},
    health_check, share_routes, AppState,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placebook_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    println!("=== STARTING PLACEBOOK BACKEND API ===");

    // Refuse to boot on a missing or placeholder share token secret
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("✗ Configuration error: {}", e);
            error!("Configuration error: {}", e);
            return Err(std::io::Error::other(format!(
                "Configuration failed: {}",
                e
            )));
        }
    };

    let bind_address = config.bind_address.clone();
    info!("Starting placebook backend API on {}", bind_address);

    // Initialize database pool
    println!("Initializing database pool...");
    println!(
        "Database URL: {}",
        mask_connection_string(&config.database_url)
    );

    let db_config = db::DieselDatabaseConfig::from_app_config(&config);
    let diesel_pool = match db::create_diesel_pool(db_config).await {
        Ok(pool) => {
            println!("✓ Database connection pool initialized successfully");
            info!("Database connection pool initialized successfully");
            pool
        }
        Err(e) => {
            println!("✗ Failed to initialize database pool: {}", e);
            error!("Failed to initialize database pool: {}", e);
            return Err(std::io::Error::other(format!(
                "Database initialization failed: {}",
                e
            )));
        }
    };

    // Run embedded migrations unless explicitly disabled
    if !config.disable_embedded_migrations {
        println!("Running embedded migrations...");
        match db::run_migrations(&config.database_url).await {
            Ok(applied) => {
                println!("✓ Applied {} pending migrations", applied);
                info!("Applied {} pending migrations", applied);
            }
            Err(e) => {
                println!("✗ Migration failed: {}", e);
                error!("Migration failed: {}", e);
                return Err(std::io::Error::other(format!("Migration failed: {}", e)));
            }
        }
    }

    let state = AppState::new(config, diesel_pool);

    let app = Router::new()
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1/share", share_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    println!("✓ Placebook backend API listening on {}", bind_address);
    info!("Placebook backend API listening on {}", bind_address);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

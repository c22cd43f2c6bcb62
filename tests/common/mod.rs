// Common test utilities shared across integration test files.
// Tests needing a database skip themselves when DATABASE_URL is unset.

#![allow(dead_code)]

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use placebook_backend::db::{create_diesel_pool, run_migrations, DieselDatabaseConfig, DieselPool};
use placebook_backend::services::{
    FriendLinkService, ReferralTokenCipher, ShareLinkService, ViewTrackingService,
};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789";
pub const TEST_BASE_URL: &str = "https://placebook.test";
pub const TEST_ASSET_BASE_URL: &str = "https://cdn.placebook.test";
pub const TEST_TTL_DAYS: i64 = 30;

/// Build a small pool against DATABASE_URL, running migrations first.
/// Returns None when no database is configured so tests can skip.
pub async fn test_pool() -> Option<DieselPool> {
    dotenv::dotenv().ok();
    dotenv::from_filename(".env.test").ok();

    let database_url = std::env::var("DATABASE_URL").ok()?;

    run_migrations(&database_url)
        .await
        .expect("migrations should apply cleanly");

    let config = DieselDatabaseConfig {
        url: database_url,
        max_connections: 5,
        min_connections: 1,
        ..DieselDatabaseConfig::default()
    };

    Some(
        create_diesel_pool(config)
            .await
            .expect("test pool should initialize"),
    )
}

pub fn test_cipher() -> ReferralTokenCipher {
    ReferralTokenCipher::new(TEST_SECRET)
}

pub fn share_link_service(pool: DieselPool) -> ShareLinkService {
    ShareLinkService::new(
        pool,
        test_cipher(),
        TEST_BASE_URL.to_string(),
        TEST_ASSET_BASE_URL.to_string(),
        TEST_TTL_DAYS,
    )
}

pub fn view_tracking_service(pool: DieselPool) -> ViewTrackingService {
    ViewTrackingService::new(pool, test_cipher())
}

pub fn friend_link_service(pool: DieselPool) -> FriendLinkService {
    FriendLinkService::new(pool, test_cipher())
}

/// Insert a user with a unique email and return its id.
pub async fn seed_user(pool: &DieselPool, label: &str) -> Uuid {
    use placebook_backend::schema::users;

    let mut conn = pool.get().await.expect("pool checkout");
    let email = format!("{}_{}@test.placebook", label, Uuid::new_v4().simple());

    diesel::insert_into(users::table)
        .values((
            users::email.eq(email),
            users::display_name.eq(format!("Test {}", label)),
        ))
        .returning(users::id)
        .get_result(&mut conn)
        .await
        .expect("user insert")
}

/// Insert a place owned by `owner` and return its id.
pub async fn seed_place(pool: &DieselPool, owner: Uuid, name: &str) -> Uuid {
    use placebook_backend::schema::places;

    let mut conn = pool.get().await.expect("pool checkout");

    diesel::insert_into(places::table)
        .values((
            places::user_id.eq(owner),
            places::name.eq(name),
            places::photos.eq(vec![Some("photos/cafe-front.jpg".to_string())]),
            places::location.eq(Some("Lisbon, Portugal")),
            places::rating.eq(Some(5)),
            places::category.eq(Some("cafe")),
        ))
        .returning(places::id)
        .get_result(&mut conn)
        .await
        .expect("place insert")
}

/// Delete seeded users; dependent rows cascade.
pub async fn cleanup_users(pool: &DieselPool, ids: &[Uuid]) {
    use placebook_backend::schema::users;

    let mut conn = pool.get().await.expect("pool checkout");
    diesel::delete(users::table.filter(users::id.eq_any(ids)))
        .execute(&mut conn)
        .await
        .expect("cleanup");
}

pub mod diesel_pool;
pub mod migrations;

pub use diesel_pool::{
    check_diesel_health, create_diesel_pool, mask_connection_string, DieselDatabaseConfig,
    DieselPool,
};
pub use migrations::run_migrations;

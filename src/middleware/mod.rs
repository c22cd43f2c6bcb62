// Middleware modules for the placebook backend

pub mod auth;
pub mod auth_middleware;

// Re-export auth types
pub use auth::AuthenticatedUser;
pub use auth_middleware::auth_middleware;

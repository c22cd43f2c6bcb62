// Utility modules for the placebook backend

pub mod share_errors;

pub use share_errors::{ShareError, ShareErrorResponse, ShareResult};

//! API layer - HTTP entry points.

pub mod auth;
pub mod http;
mod views;

pub use auth::CurrentUser;
pub use http::ApiError;

//! HTTP surface for the transito planner and vehicle simulator

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod ticker;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

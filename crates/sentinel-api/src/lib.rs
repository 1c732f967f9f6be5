//! Sentinel API
//!
//! JSON-over-HTTP front end for the scam detector: single and batch
//! detection, health, analytics, live statistics, and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{CorsConfig, InputLimits, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{init_detector, AppState, DetectorHandle};

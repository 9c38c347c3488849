//! HTTP API handlers

pub mod health;
pub mod observations;
pub mod risk;

pub use health::health_routes;
pub use observations::observation_routes;
pub use risk::risk_routes;

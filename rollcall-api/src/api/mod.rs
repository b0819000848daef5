//! HTTP API handlers for rollcall-api

pub mod health;
pub mod people;

pub use health::health_routes;
pub use people::people_routes;

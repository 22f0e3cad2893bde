//! LiftLog API server library.
//!
//! A request dispatcher for the LiftLog fitness-tracking API: a declarative
//! route table, a bearer-token auth gate, and the session token service.

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ApiConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

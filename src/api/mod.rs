//! Operation handlers.
//!
//! # Data Flow
//! ```text
//! Dispatcher (route resolved, gate passed for private routes)
//!     → Endpoints::call(operation)
//!         → session.rs   (Login, RefreshSession, Logout)
//!         → health.rs    (Health)
//!         → resources.rs (every resource family operation)
//! ```

pub mod health;
pub mod resources;
pub mod session;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::routing::{Operation, RequestContext};

pub use resources::{ResourceOperations, UnimplementedResources};
pub use session::SessionEndpoints;

/// Operation table: maps an [`Operation`] to the code that serves it.
#[derive(Clone)]
pub struct Endpoints {
    session: SessionEndpoints,
    resources: Arc<dyn ResourceOperations>,
}

impl Endpoints {
    pub fn new(session: SessionEndpoints, resources: Arc<dyn ResourceOperations>) -> Self {
        Self { session, resources }
    }

    /// Invoke the handler for `operation` exactly once.
    pub async fn call(
        &self,
        operation: Operation,
        ctx: RequestContext,
        request: Request<Body>,
    ) -> Response {
        match operation {
            Operation::Login => self.session.login(ctx, request).await,
            Operation::RefreshSession => self.session.refresh(ctx, request).await,
            Operation::Logout => self.session.logout(ctx, request).await,
            Operation::Health => health::health().await,
            other => self.resources.call(other, ctx, request).await,
        }
    }
}

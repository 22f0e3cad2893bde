//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the service graph (token service, auth gate, endpoints, router)
//! - Wire up middleware (request ID, tracing, timeout, limits, headers)
//! - Send every request to the dispatcher
//! - Run the expired-session sweeper alongside the server
//! - Drain in-flight requests on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api::{Endpoints, ResourceOperations, SessionEndpoints, UnimplementedResources};
use crate::auth::{
    AccountDirectory, AuthGate, IdentityOracle, InMemoryAccountDirectory, InMemorySessionStore,
    JwtAssertionOracle, SessionStore, TokenService,
};
use crate::config::ApiConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::Shutdown;
use crate::observability::tracing::make_request_span;
use crate::routing::{Dispatcher, RouteTableError, Router as ApiRouter};

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// Pluggable collaborators. Defaults are the in-process implementations.
pub struct Components {
    pub sessions: Arc<dyn SessionStore>,
    pub oracle: Arc<dyn IdentityOracle>,
    pub accounts: Arc<dyn AccountDirectory>,
    pub resources: Arc<dyn ResourceOperations>,
}

impl Components {
    pub fn in_memory(config: &ApiConfig) -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            oracle: Arc::new(JwtAssertionOracle::new(&config.identity)),
            accounts: Arc::new(InMemoryAccountDirectory::new()),
            resources: Arc::new(UnimplementedResources),
        }
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceOperations>) -> Self {
        self.resources = resources;
        self
    }
}

/// HTTP server for the API.
pub struct HttpServer {
    app: Router,
    config: ApiConfig,
    tokens: Arc<TokenService>,
}

impl HttpServer {
    /// Server with in-process stores and no resource backend.
    pub fn new(config: ApiConfig) -> Result<Self, RouteTableError> {
        let components = Components::in_memory(&config);
        Self::with_components(config, components)
    }

    pub fn with_components(
        config: ApiConfig,
        components: Components,
    ) -> Result<Self, RouteTableError> {
        let router = Arc::new(ApiRouter::declared()?);
        tracing::info!(
            exact_routes = router.table().exact().len(),
            families = router.table().families().len(),
            "Route table compiled"
        );

        let tokens = Arc::new(TokenService::new(&config.auth, components.sessions));
        let session = SessionEndpoints::new(tokens.clone(), components.oracle, components.accounts);
        let endpoints = Endpoints::new(session, components.resources);
        let dispatcher = Dispatcher::new(router, AuthGate::new(tokens.clone()), endpoints);

        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };
        let app = Self::build_router(&config, state);

        Ok(Self {
            app,
            config,
            tokens,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ApiConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered application, for in-process testing.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Token service shared by the gate and the session endpoints.
    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = spawn_session_sweeper(
            self.tokens.clone(),
            Duration::from_secs(self.config.auth.session_sweep_interval_secs),
            shutdown.subscribe(),
        );

        let mut stop = shutdown.subscribe();
        let result = axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.dispatch(request).await
}

/// Periodically purge expired refresh sessions. A zero period disables it.
fn spawn_session_sweeper(
    tokens: Arc<TokenService>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> Option<JoinHandle<()>> {
    if period.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => match tokens.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
                    Err(e) => tracing::warn!(error = %e, "Session sweep failed"),
                },
                _ = shutdown.recv() => {
                    tracing::debug!("Session sweeper stopping");
                    break;
                }
            }
        }
    }))
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use liftlog_api::auth::TokenService;
use liftlog_api::config::ApiConfig;
use liftlog_api::http::{Components, HttpServer};
use liftlog_api::Shutdown;

pub const SIGNING_SECRET: &str = "integration-signing-secret-0123456789-abcdef";
pub const IDENTITY_SECRET: &str = "integration-identity-secret-0123456789-abcdef";
pub const ISSUER: &str = "https://id.test";
pub const AUDIENCE: &str = "liftlog-api";

pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.auth.signing_secret = SIGNING_SECRET.to_string();
    config.identity.issuer = ISSUER.to_string();
    config.identity.audience = AUDIENCE.to_string();
    config.identity.shared_secret = IDENTITY_SECRET.to_string();
    config
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub base: String,
    pub tokens: Arc<TokenService>,
    pub shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

pub async fn spawn_server(config: ApiConfig) -> TestServer {
    let components = Components::in_memory(&config);
    spawn_with(config, components).await
}

pub async fn spawn_with(config: ApiConfig, components: Components) -> TestServer {
    let server = HttpServer::with_components(config, components).unwrap();
    let tokens = server.tokens();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, &server_shutdown).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        tokens,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    sub: &'a str,
    exp: u64,
}

/// An identity assertion the configured oracle accepts.
pub fn assertion(sub: &str) -> String {
    sign_assertion(sub, IDENTITY_SECRET)
}

pub fn sign_assertion(sub: &str, secret: &str) -> String {
    let claims = AssertionClaims {
        iss: ISSUER,
        aud: AUDIENCE,
        sub,
        exp: liftlog_api::auth::token::unix_now() + 300,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

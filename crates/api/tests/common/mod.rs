//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use booknet_api::auth::activation::ActivationConfig;
use booknet_api::auth::jwt::{generate_access_token, JwtConfig};
use booknet_api::auth::provider::{AuthenticatedPrincipal, CredentialSource, UserCredentials};
use booknet_api::config::{default_public_paths, ServerConfig};
use booknet_api::router::build_app_router;
use booknet_api::state::AppState;
use booknet_core::authority::granted_authorities;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Ids of the users known to [`build_offline_app`].
pub const ACTIVE_USER: i64 = 7;
pub const LOCKED_USER: i64 = 8;
pub const ADMIN_USER: i64 = 9;
pub const DISABLED_USER: i64 = 10;

/// Build a test `ServerConfig` with safe defaults and no SMTP.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        public_paths: default_public_paths(),
        token_purge_interval_secs: 3600,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        activation: ActivationConfig::default(),
        email: None,
    }
}

/// Build the production router around `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// In-memory credential source for requests that never reach the database.
pub struct FixedCredentials(Vec<UserCredentials>);

#[async_trait]
impl CredentialSource for FixedCredentials {
    async fn load_by_email(&self, email: &str) -> Result<Option<UserCredentials>, sqlx::Error> {
        Ok(self.0.iter().find(|u| u.email == email).cloned())
    }

    async fn load_by_id(&self, user_id: i64) -> Result<Option<UserCredentials>, sqlx::Error> {
        Ok(self.0.iter().find(|u| u.user_id == user_id).cloned())
    }
}

fn fixture(user_id: i64, role: &str, enabled: bool, account_locked: bool) -> UserCredentials {
    UserCredentials {
        user_id,
        email: format!("user{user_id}@test.com"),
        full_name: "Test User".to_string(),
        password_hash: String::new(),
        enabled,
        account_locked,
        role_names: vec![role.to_string()],
    }
}

/// Router whose pool never connects. Only usable for requests that are
/// answered before any handler touches the database. Identities come from a
/// fixed set: [`ACTIVE_USER`] and [`LOCKED_USER`] hold `USER`, [`ADMIN_USER`]
/// holds `ADMIN`, [`DISABLED_USER`] was never activated.
pub fn build_offline_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://offline@127.0.0.1:1/offline")
        .expect("lazy pool should parse its URL");
    let source = Arc::new(FixedCredentials(vec![
        fixture(ACTIVE_USER, "USER", true, false),
        fixture(LOCKED_USER, "USER", true, true),
        fixture(ADMIN_USER, "ADMIN", true, false),
        fixture(DISABLED_USER, "USER", false, false),
    ]));
    let config = test_config();
    build_app_router(AppState::with_credential_source(pool, config.clone(), source), &config)
}

/// Sign an access token for a synthetic principal.
pub fn token_for(user_id: i64, roles: &[&str]) -> String {
    let principal = AuthenticatedPrincipal {
        user_id,
        email: format!("user{user_id}@test.com"),
        full_name: "Test User".to_string(),
        authorities: granted_authorities(roles.iter().copied()),
    };
    generate_access_token(&principal, &test_config().jwt).expect("token generation should succeed")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

fn json_request(
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

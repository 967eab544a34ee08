use std::sync::Arc;

use booknet_core::access::AccessPolicy;

use crate::auth::provider::{AuthenticationProvider, DbCredentialSource, SharedCredentialSource};
use crate::config::ServerConfig;
use crate::mail::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Holds no per-caller data: identity is re-established on every request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: booknet_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Public path allow-list consulted by the request gate.
    pub access_policy: Arc<AccessPolicy>,
    /// Email + password authenticator; also resolves access-token identities.
    pub authenticator: Arc<AuthenticationProvider<SharedCredentialSource>>,
    /// Activation email sender; `None` when SMTP is not configured.
    pub mailer: Option<Arc<Mailer>>,
}

impl AppState {
    /// Wire every collaborator from the pool and configuration.
    pub fn new(pool: booknet_db::DbPool, config: ServerConfig) -> Self {
        let source = Arc::new(DbCredentialSource::new(pool.clone()));
        Self::with_credential_source(pool, config, source)
    }

    /// Like [`AppState::new`] with an explicit credential source.
    pub fn with_credential_source(
        pool: booknet_db::DbPool,
        config: ServerConfig,
        source: SharedCredentialSource,
    ) -> Self {
        let access_policy = AccessPolicy::new(&config.public_paths);
        let mailer = config.email.clone().map(|c| Arc::new(Mailer::new(c)));

        Self {
            pool,
            config: Arc::new(config),
            access_policy: Arc::new(access_policy),
            authenticator: Arc::new(AuthenticationProvider::new(source)),
            mailer,
        }
    }
}

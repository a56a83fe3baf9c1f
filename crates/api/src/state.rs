//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use tamarind_core::CredentialCodec;

use crate::config::ApiConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    codec: CredentialCodec,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The credential codec takes its signing secret from the configuration.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let codec = CredentialCodec::new(config.auth_secret.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                codec,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the credential token codec.
    #[must_use]
    pub fn codec(&self) -> &CredentialCodec {
        &self.inner.codec
    }
}

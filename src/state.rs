use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::store::{CredentialStore, PgStore};

/// Shared, explicitly constructed services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    /// Connects to Postgres, applies migrations and builds the state.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        let store = Arc::new(PgStore::new(db)) as Arc<dyn CredentialStore>;
        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn CredentialStore>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            store,
            config,
            keys,
        }
    }
}

//! Shared application state handed to every handler.

use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    auth::AuthManager,
    db::{self, CatalogRepository, CustomerRepository, PostgresMarketplaceStore, ReviewRepository},
    rate_limit::RateLimiter,
    services::{CustomerService, ProfileService, ReviewService, SearchService},
    Config,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: PgPool,
    pub search: SearchService,
    pub profiles: ProfileService<PostgresMarketplaceStore>,
    pub reviews: ReviewService,
    pub customers: CustomerService,
    pub catalog: CatalogRepository,
    pub auth: AuthManager,
    pub rate_limiter: Arc<RateLimiter>,
}

#[derive(Debug, Clone, Copy)]
pub struct AppStateOptions {
    pub run_migrations: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
        }
    }
}

impl AppState {
    /// Connect to the database and wire up services from `config`.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let options = AppStateOptions {
            run_migrations: config.database.run_migrations,
        };
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> anyhow::Result<Self> {
        let db_pool = db::create_pool(&config.database)
            .await
            .context("Failed to connect to database")?;

        if options.run_migrations {
            tracing::info!("Running database migrations");
            db::run_migrations(&db_pool)
                .await
                .context("Failed to run database migrations")?;
        }

        Ok(Self::from_pool(config, db_pool))
    }

    /// Build the state over an existing pool. Migrations are the caller's
    /// concern.
    pub fn from_pool(config: Config, db_pool: PgPool) -> Self {
        let store = Arc::new(PostgresMarketplaceStore::new(db_pool.clone()));
        let review_repo = ReviewRepository::new(db_pool.clone());

        Self {
            search: SearchService::new(store.clone()),
            profiles: ProfileService::new(store),
            reviews: ReviewService::new(review_repo.clone()),
            customers: CustomerService::new(
                CustomerRepository::new(db_pool.clone()),
                review_repo,
            ),
            catalog: CatalogRepository::new(db_pool.clone()),
            auth: AuthManager::new(&config.auth),
            rate_limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            config: Arc::new(config),
            db_pool,
        }
    }
}

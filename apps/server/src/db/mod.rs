//! Database layer - repositories and data access

pub mod catalog;
pub mod customers;
pub mod reviews;
pub mod search;
pub mod store;
pub mod traits;
pub mod transaction;

pub use catalog::CatalogRepository;
pub use customers::CustomerRepository;
pub use reviews::ReviewRepository;
pub use store::PostgresMarketplaceStore;
pub use traits::{InstallerStore, ProfileStore, ProfileTransaction};
pub use transaction::PostgresProfileTransaction;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool};

use crate::config::DatabaseConfig;
use crate::{Error, Result};
use search::query_builder::{bind_query_as, bind_scalar};
use search::{PageRequest, PagedQuery};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open a connection pool with per-session timeouts applied.
pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let mut options: PgConnectOptions = config.url.parse()?;

    let mut session_settings = Vec::new();
    if let Some(secs) = config.statement_timeout_seconds {
        session_settings.push(("statement_timeout", format!("{}s", secs)));
    }
    if let Some(secs) = config.lock_timeout_seconds {
        session_settings.push(("lock_timeout", format!("{}s", secs)));
    }
    options = options.options(session_settings);

    let pool = PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Name of the foreign key constraint `err` violated, if that is what failed.
pub(crate) fn violated_foreign_key(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
            db.constraint()
        }
        _ => None,
    }
}

/// Run the COUNT and the page SELECT of `query` and return both.
pub(crate) async fn fetch_page<T>(
    pool: &PgPool,
    query: &PagedQuery,
    page: &PageRequest,
) -> Result<(Vec<T>, i64)>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let (count_sql, count_binds) = query.build_count_sql();
    let total = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), count_binds)
        .fetch_one(pool)
        .await
        .map_err(Error::Database)?;

    if total == 0 {
        return Ok((Vec::new(), 0));
    }

    let (page_sql, page_binds) = query.build_page_sql(page);
    let rows = bind_query_as(sqlx::query_as::<_, T>(&page_sql), page_binds)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)?;

    Ok((rows, total))
}

use anyhow::Context as _;
use marketplace::Config;
use std::sync::Arc;
use tokio::sync::OnceCell;

static SHARED: OnceCell<Arc<SharedTestResources>> = OnceCell::const_new();

pub struct SharedTestResources {
    pub base_config: Config,
}

/// Test database: `database.test_database_url`, then `TEST_DATABASE_URL`,
/// then the regular `database.url`. An unreachable database fails the test.
pub async fn shared() -> anyhow::Result<Arc<SharedTestResources>> {
    SHARED
        .get_or_try_init(|| async {
            init_tracing();

            let mut config = Config::load().context("load Config for tests")?;
            if let Some(url) = config
                .database
                .test_database_url
                .clone()
                .or_else(|| std::env::var("TEST_DATABASE_URL").ok())
                .filter(|url| !url.trim().is_empty())
            {
                config.database.url = url;
            }

            config.auth.jwt_secret = super::TEST_JWT_SECRET.to_string();
            config.auth.issuer = None;
            config.rate_limit.max_requests = 1_000;

            config.database.pool_min_size = 0;
            config.database.pool_max_size = 5;
            config.database.pool_timeout_seconds = 30;

            Ok(Arc::new(SharedTestResources {
                base_config: config,
            }))
        })
        .await
        .cloned()
}

fn init_tracing() {
    use std::sync::OnceLock;
    use tracing_subscriber::prelude::*;
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "marketplace=info,sqlx=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

pub mod assertions;
pub mod fixtures;
pub mod shared;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use futures::FutureExt as _;
use jsonwebtoken::{encode, EncodingKey, Header};
use marketplace::{
    api::create_router,
    auth::{Claims, Role},
    state::AppStateOptions,
    AppState, Config,
};
use serde_json::Value;
use sqlx::Connection as _;
use tower::ServiceExt as _;
use url::Url;
use uuid::Uuid;

pub use assertions::*;
pub use fixtures::*;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    schema: String,
    admin_database_url: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> anyhow::Result<Value> {
        serde_json::from_slice(&self.body).context("response body is JSON")
    }
}

impl TestApp {
    pub async fn new_with_config(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let shared = shared::shared().await?;
        let mut config = shared.base_config.clone();
        configure(&mut config);

        let admin_database_url = config.database.url.clone();

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let mut admin_conn = sqlx::PgConnection::connect(&admin_database_url)
            .await
            .context(
                "connect to test database (set TEST_DATABASE_URL or \
                 MARKETPLACE__DATABASE__TEST_DATABASE_URL)",
            )?;
        sqlx::query(&format!(r#"CREATE SCHEMA "{}""#, schema))
            .execute(&mut admin_conn)
            .await
            .context("create test schema")?;

        config.database.url = with_search_path(&admin_database_url, &schema)?;
        config.database.pool_min_size = 0;
        // each test owns a pool and a schema; keep pools small for parallel runs
        config.database.pool_max_size = 2;
        config.database.statement_timeout_seconds = Some(30);
        config.database.lock_timeout_seconds = Some(5);

        let state = AppState::new_with_options(
            config,
            AppStateOptions {
                run_migrations: true,
            },
        )
        .await
        .context("initialize AppState")?;

        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            schema,
            admin_database_url,
        })
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.state.db_pool
    }

    pub async fn cleanup(self) -> anyhow::Result<()> {
        self.state.db_pool.close().await;

        let mut admin_conn = sqlx::PgConnection::connect(&self.admin_database_url)
            .await
            .context("connect admin db for schema drop")?;
        sqlx::query(&format!(r#"DROP SCHEMA "{}" CASCADE"#, self.schema))
            .execute(&mut admin_conn)
            .await
            .context("drop test schema")?;

        Ok(())
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<TestResponse> {
        self.request(Method::GET, path_and_query, None, None, &[])
            .await
    }

    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> anyhow::Result<TestResponse> {
        self.request(method, path, Some(body), token, &[]).await
    }

    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
        token: Option<&str>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<TestResponse> {
        let body = match body {
            Some(value) => Body::from(serde_json::to_vec(value)?),
            None => Body::empty(),
        };

        let mut request = Request::builder()
            .method(method)
            .uri(path_and_query)
            .header(header::HOST, "example.org")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .context("build request")?;

        if let Some(token) = token {
            request.headers_mut().insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))?,
            );
        }
        for (name, value) in extra_headers {
            request.headers_mut().insert(
                name.parse::<HeaderName>().context("parse header name")?,
                value.parse::<HeaderValue>().context("parse header value")?,
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }
}

/// Bearer token the test router accepts.
pub fn token_for(user_id: Uuid, role: Role) -> String {
    let claims = Claims {
        sub: user_id,
        role,
        exp: chrono::Utc::now().timestamp() + 3600,
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("sign test token")
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(
        &'a TestApp,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = anyhow::Result<()>> + 'a>,
    >,
{
    let app = TestApp::new_with_config(configure).await?;

    let result = std::panic::AssertUnwindSafe(f(&app)).catch_unwind().await;
    let cleanup_result = app.cleanup().await;

    if let Err(e) = cleanup_result {
        eprintln!("test schema cleanup failed: {e:?}");
    }

    match result {
        Ok(r) => r,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

fn with_search_path(database_url: &str, schema: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(database_url).context("parse database URL")?;
    url.query_pairs_mut()
        .append_pair("options", &format!("-c search_path={}", schema));
    Ok(url.to_string())
}

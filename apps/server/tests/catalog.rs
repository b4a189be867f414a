//! Reference data endpoints and the ambient routes

#[allow(unused)]
mod support;

use axum::http::StatusCode;
use support::*;

#[tokio::test]
async fn services_are_returned_as_a_two_level_tree() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            sqlx::query("UPDATE service_categories SET is_active = FALSE WHERE slug = 'aer-conditionat'")
                .execute(app.pool())
                .await?;

            let body = assert_success(&app.get("/api/services").await?)?;
            assert_eq!(body["count"], 3);
            assert_eq!(
                data_strings(&body, "slug"),
                vec![
                    "instalatii-sanitare".to_string(),
                    "instalatii-electrice".to_string(),
                    "incalzire-climatizare".to_string(),
                ]
            );
            assert_eq!(body["data"][0]["subcategories"].as_array().map(Vec::len), Some(3));
            assert_eq!(body["data"][2]["subcategories"].as_array().map(Vec::len), Some(1));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn locations_list_regions_and_filter_cities() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = assert_success(&app.get("/api/locations/regions").await?)?;
            assert_eq!(body["count"], 6);
            assert_eq!(body["data"][0]["name"], "Brașov");
            assert!(body["data"][0]["type"].is_string());

            let region = region_id(app.pool(), "CJ").await?;
            let body = assert_success(
                &app.get(&format!("/api/locations/cities?region_id={region}"))
                    .await?,
            )?;
            assert_eq!(
                data_strings(&body, "name"),
                vec!["Cluj-Napoca".to_string(), "Turda".to_string()]
            );

            let response = app.get("/api/locations/cities?region_id=abc").await?;
            assert_status(&response, StatusCode::BAD_REQUEST, "bad region id");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn health_metrics_and_unknown_routes() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let response = app.get("/health").await?;
            assert_status(&response, StatusCode::OK, "health");
            assert!(response.headers.contains_key("x-request-id"));
            assert_eq!(
                response
                    .headers
                    .get("x-content-type-options")
                    .and_then(|v| v.to_str().ok()),
                Some("nosniff")
            );

            app.get("/api/installers").await?;
            let response = app.get("/metrics").await?;
            assert_status(&response, StatusCode::OK, "metrics");
            let text = String::from_utf8_lossy(&response.body);
            assert!(text.contains("marketplace_http_requests_total"));

            let response = app.get("/api/nowhere").await?;
            assert_status(&response, StatusCode::NOT_FOUND, "unknown route");
            assert_failure(&response)?;

            Ok(())
        })
    })
    .await
}

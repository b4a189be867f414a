//! Installer search, profile page and profile update

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;

use crate::{
    api::{
        envelope,
        extractors::{JsonBody, QueryPairs, UuidPath},
        headers::{etag_header, extract_if_match},
    },
    auth::AuthenticatedPrincipal,
    db::search::InstallerSearchParams,
    models::{InstallerDetail, ProfilePatch, RatingStats},
    request_context::RequestContext,
    state::AppState,
    Result,
};

/// GET /api/installers
pub async fn search_installers(
    State(state): State<AppState>,
    QueryPairs(query): QueryPairs,
) -> Result<Response> {
    let params = InstallerSearchParams::from_query(&query, &state.config.search)?;
    let page = state.search.search(&params).await;
    Ok(envelope::success(page).into_response())
}

#[derive(Debug, Serialize)]
struct InstallerPageBody {
    data: InstallerDetail,
    stats: RatingStats,
}

/// GET /api/installers/:id
pub async fn get_installer(
    State(state): State<AppState>,
    UuidPath(installer_id): UuidPath,
) -> Result<Response> {
    let (installer, stats) = futures::try_join!(
        state.profiles.get(installer_id),
        state.reviews.stats_for(installer_id)
    )?;

    let etag = etag_header(installer.installer.version);
    let body = envelope::success(InstallerPageBody {
        data: installer,
        stats,
    });

    Ok(match etag {
        Some(etag) => ([etag], body).into_response(),
        None => body.into_response(),
    })
}

/// PATCH /api/installers/:id
pub async fn update_installer(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(installer_id): UuidPath,
    context: Option<Extension<RequestContext>>,
    headers: HeaderMap,
    JsonBody(patch): JsonBody<ProfilePatch>,
) -> Result<Response> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    let expected_version = extract_if_match(&headers)?;

    if let Some(Extension(context)) = &context {
        tracing::debug!(request_id = %context.request_id, "Profile update requested");
    }

    let update = state
        .profiles
        .update(installer_id, principal.user_id, patch, expected_version)
        .await?;

    let body = envelope::data(update.installer);
    Ok(match etag_header(update.version) {
        Some(etag) => ([etag], body).into_response(),
        None => body.into_response(),
    })
}

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::{
    error::MuralError,
    management::{AuthorizedFetcher, RateLimiter, SessionStore, TrackPageFetcher, collect_album_covers},
    server::AppState,
    spotify::{TokenEndpoint, TrackSource},
    types::{AlbumCover, CollectionRequest, TopTracksResponse},
    validation, warning,
};

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Default, Deserialize)]
pub struct TopTracksQuery {
    time_range: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MuralQuery {
    width: Option<String>,
    height: Option<String>,
    quality: Option<String>,
    time_range: Option<String>,
}

/// Rate limiting key: first `X-Forwarded-For` entry, or `"unknown"`.
pub fn client_identity(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

pub async fn top_tracks<S, C, L>(
    State(state): State<AppState<S, C, L>>,
    headers: HeaderMap,
    Query(query): Query<TopTracksQuery>,
) -> Result<Json<TopTracksResponse>, MuralError>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    let time_range =
        validation::parse_time_range(query.time_range.as_deref().unwrap_or("medium_term"))?;
    let limit = validation::parse_limit(query.limit.as_deref().unwrap_or("50"))?;
    let offset = validation::parse_offset(query.offset.as_deref().unwrap_or("0"))?;
    validation::validate_page_bounds(limit, offset)?;

    let fetcher = AuthorizedFetcher::new(
        &*state.auth,
        state.limiter.as_ref(),
        state.rate_limit,
        client_identity(&headers),
    );

    let page = fetcher
        .fetch_page(time_range, limit as u32, offset as u32)
        .await
        .inspect_err(|e| warning!("Top tracks request failed: {}", e))?;

    Ok(Json(page))
}

pub async fn mural<S, C, L>(
    State(state): State<AppState<S, C, L>>,
    headers: HeaderMap,
    Query(query): Query<MuralQuery>,
) -> Result<Json<Vec<AlbumCover>>, MuralError>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    let request = CollectionRequest::parse(
        query.width.as_deref().unwrap_or_default(),
        query.height.as_deref().unwrap_or_default(),
        query.quality.as_deref().unwrap_or("medium"),
        query.time_range.as_deref().unwrap_or("medium_term"),
    )?;

    let fetcher = AuthorizedFetcher::new(
        &*state.auth,
        state.limiter.as_ref(),
        state.rate_limit,
        client_identity(&headers),
    );

    let covers = collect_album_covers(&fetcher, &request)
        .await
        .inspect_err(|e| warning!("Mural collection failed: {}", e))?;

    Ok(Json(covers))
}

use std::future::Future;

use crate::{
    config::RateLimitPolicy,
    error::MuralError,
    management::{AuthManager, RateLimiter, SessionStore},
    spotify::{TokenEndpoint, TrackSource},
    types::{TimeRange, TopTracksResponse},
    validation,
};

/// One page of top tracks, as seen by the album cover collector.
pub trait TrackPageFetcher: Send + Sync {
    fn fetch_page(
        &self,
        time_range: TimeRange,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<TopTracksResponse, MuralError>> + Send;
}

/// Fetches pages on behalf of one client: each page is bounds-checked,
/// counted against the client's rate limit, and sent with the current
/// access token (refreshed first if it has expired).
pub struct AuthorizedFetcher<'a, S, C, L> {
    auth: &'a AuthManager<S, C>,
    limiter: &'a L,
    policy: RateLimitPolicy,
    identity: String,
}

impl<'a, S, C, L> AuthorizedFetcher<'a, S, C, L> {
    pub fn new(
        auth: &'a AuthManager<S, C>,
        limiter: &'a L,
        policy: RateLimitPolicy,
        identity: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            limiter,
            policy,
            identity: identity.into(),
        }
    }
}

impl<S, C, L> TrackPageFetcher for AuthorizedFetcher<'_, S, C, L>
where
    S: SessionStore,
    C: TokenEndpoint + TrackSource,
    L: RateLimiter,
{
    async fn fetch_page(
        &self,
        time_range: TimeRange,
        limit: u32,
        offset: u32,
    ) -> Result<TopTracksResponse, MuralError> {
        validation::validate_page_bounds(limit as i64, offset as i64)?;

        if !self.limiter.allow(&self.identity, self.policy).await {
            return Err(MuralError::RateLimited { retry_after: None });
        }

        let access_token = self
            .auth
            .valid_access_token()
            .await
            .ok_or(MuralError::Unauthorized)?;

        self.auth
            .endpoint()
            .get_top_tracks(&access_token, time_range, limit, offset)
            .await
    }
}

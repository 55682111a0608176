use std::future::Future;

use reqwest::{StatusCode, header::RETRY_AFTER};

use crate::{
    error::MuralError,
    spotify::SpotifyClient,
    types::{TimeRange, TopTracksResponse},
};

/// Authenticated access to the user's top tracks.
pub trait TrackSource: Send + Sync + 'static {
    /// Fetches one page of `GET /me/top/tracks`.
    ///
    /// 401 maps to [`MuralError::Unauthorized`], 429 to
    /// [`MuralError::RateLimited`], any other non-2xx status to
    /// [`MuralError::Upstream`].
    fn get_top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<TopTracksResponse, MuralError>> + Send;
}

impl TrackSource for SpotifyClient {
    async fn get_top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: u32,
        offset: u32,
    ) -> Result<TopTracksResponse, MuralError> {
        let api_url = format!(
            "{uri}/me/top/tracks",
            uri = self.settings.api_url.trim_end_matches('/')
        );

        let response = self
            .http
            .get(&api_url)
            .bearer_auth(access_token)
            .query(&[
                ("time_range", time_range.as_str().to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<TopTracksResponse>().await?),
            StatusCode::UNAUTHORIZED => Err(MuralError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                Err(MuralError::RateLimited { retry_after })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(MuralError::Upstream {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#![allow(dead_code)]

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use muralcli::{
    config::Settings,
    error::{AuthError, MuralError},
    management::{ACCESS_TOKEN_KEY, SessionStore, TOKEN_EXPIRES_KEY},
    spotify::{TokenEndpoint, TrackSource},
    types::{ExternalUrls, Image, TimeRange, TopTracksResponse, Token, Track, TrackAlbum, TrackArtist},
};

pub const CLIENT_ID: &str = "test-client";
pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

pub fn settings() -> Settings {
    Settings {
        client_id: Some(CLIENT_ID.to_string()),
        redirect_uri: Some(REDIRECT_URI.to_string()),
        ..Settings::default()
    }
}

/// Stores an access token valid for another hour.
pub async fn seed_session<S: SessionStore>(store: &S) {
    let expires = chrono::Utc::now().timestamp_millis() + 3_600_000;
    store.set(ACCESS_TOKEN_KEY, "access", None).await.unwrap();
    store
        .set(TOKEN_EXPIRES_KEY, &expires.to_string(), None)
        .await
        .unwrap();
}

/// In-process stand-in for both Spotify services.
///
/// Records every call; `tracks` is the whole top-tracks list, served in
/// pages according to `limit` and `offset`.
#[derive(Default)]
pub struct FakeSpotify {
    pub exchange_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub track_calls: AtomicUsize,
    pub fail_exchange: AtomicBool,
    pub fail_refresh: AtomicBool,
    pub rotate_refresh_token: AtomicBool,
    pub expires_in: Mutex<Option<u64>>,
    pub exchange_delay: Mutex<Option<Duration>>,
    pub verifiers: Mutex<Vec<String>>,
    pub offsets: Mutex<Vec<u32>>,
    pub tracks: Vec<Track>,
    pub track_status: Mutex<Option<u16>>,
}

impl FakeSpotify {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    pub fn exchanges(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn track_requests(&self) -> usize {
        self.track_calls.load(Ordering::SeqCst)
    }

    pub fn set_expires_in(&self, seconds: u64) {
        *self.expires_in.lock().unwrap() = Some(seconds);
    }

    /// Makes every code exchange take `delay` before answering.
    pub fn slow_exchange(&self, delay: Duration) {
        *self.exchange_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_tracks_with(&self, status: u16) {
        *self.track_status.lock().unwrap() = Some(status);
    }

    fn expires_in(&self) -> u64 {
        self.expires_in.lock().unwrap().unwrap_or(3600)
    }
}

impl TokenEndpoint for FakeSpotify {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<Token, AuthError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.verifiers.lock().unwrap().push(code_verifier.to_string());

        let delay = *self.exchange_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(AuthError::ExchangeFailed("400: invalid_grant".into()));
        }

        Ok(Token {
            access_token: format!("access-{code}"),
            refresh_token: Some("refresh-1".to_string()),
            scope: Some("user-top-read".to_string()),
            expires_in: self.expires_in(),
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(AuthError::ExchangeFailed("400: invalid_grant".into()));
        }

        let rotated = self
            .rotate_refresh_token
            .load(Ordering::SeqCst)
            .then(|| format!("refresh-{}", call + 1));

        Ok(Token {
            access_token: format!("access-refreshed-{call}-from-{refresh_token}"),
            refresh_token: rotated,
            scope: None,
            expires_in: 3600,
        })
    }
}

impl TrackSource for FakeSpotify {
    async fn get_top_tracks(
        &self,
        _access_token: &str,
        _time_range: TimeRange,
        limit: u32,
        offset: u32,
    ) -> Result<TopTracksResponse, MuralError> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        self.offsets.lock().unwrap().push(offset);

        if let Some(status) = *self.track_status.lock().unwrap() {
            return Err(match status {
                401 => MuralError::Unauthorized,
                429 => MuralError::RateLimited {
                    retry_after: Some(30),
                },
                status => MuralError::Upstream {
                    status,
                    message: "upstream failure".into(),
                },
            });
        }

        Ok(page(&self.tracks, limit, offset))
    }
}

/// Slices `tracks` the way the Web API pages `/me/top/tracks`.
pub fn page(tracks: &[Track], limit: u32, offset: u32) -> TopTracksResponse {
    let start = (offset as usize).min(tracks.len());
    let end = (start + limit as usize).min(tracks.len());
    let next = (end < tracks.len()).then(|| {
        format!("https://api.spotify.com/v1/me/top/tracks?offset={end}&limit={limit}")
    });

    TopTracksResponse {
        items: tracks[start..end].to_vec(),
        next,
        total: Some(tracks.len() as u64),
        limit: Some(limit),
        offset: Some(offset),
    }
}

/// A track on album `album_id` with the usual three image sizes.
pub fn track(album_id: &str, artist: &str) -> Track {
    Track {
        id: Some(format!("track-{album_id}")),
        name: format!("Song on {album_id}"),
        album: TrackAlbum {
            id: album_id.to_string(),
            name: format!("Album {album_id}"),
            uri: format!("spotify:album:{album_id}"),
            images: images(album_id),
            external_urls: ExternalUrls {
                spotify: Some(format!("https://open.spotify.com/album/{album_id}")),
            },
        },
        artists: vec![TrackArtist {
            id: None,
            name: artist.to_string(),
        }],
    }
}

pub fn images(album_id: &str) -> Vec<Image> {
    [640, 300, 64]
        .into_iter()
        .map(|width| Image {
            url: format!("https://i.scdn.co/image/{album_id}-{width}"),
            height: Some(width),
            width: Some(width),
        })
        .collect()
}

/// `count` tracks on `count` different albums.
pub fn distinct_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| track(&format!("album{i}"), &format!("Artist {i}")))
        .collect()
}

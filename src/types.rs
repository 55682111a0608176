use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::ValidationError;

/// Token endpoint response for both the `authorization_code` and the
/// `refresh_token` grants. A refresh may or may not rotate the refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
}

/// Authorization URL handed to the user agent at the start of a PKCE flow.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationRequest {
    #[serde(rename = "authUrl")]
    pub url: String,
}

/// Query parameters Spotify appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub album: TrackAlbum,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

/// One page of `GET /me/top/tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopTracksResponse {
    pub items: Vec<Track>,
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

impl TopTracksResponse {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "short_term")]
    Short,
    #[serde(rename = "medium_term")]
    Medium,
    #[serde(rename = "long_term")]
    Long,
}

impl TimeRange {
    /// Value of the `time_range` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Short => "short_term",
            TimeRange::Medium => "medium_term",
            TimeRange::Long => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_term" | "short" => Ok(TimeRange::Short),
            "medium_term" | "medium" => Ok(TimeRange::Medium),
            "long_term" | "long" => Ok(TimeRange::Long),
            other => Err(ValidationError::InvalidTimeRange(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Low,
    Medium,
    High,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Low => "low",
            ImageQuality::Medium => "medium",
            ImageQuality::High => "high",
        }
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageQuality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ImageQuality::Low),
            "medium" => Ok(ImageQuality::Medium),
            "high" => Ok(ImageQuality::High),
            other => Err(ValidationError::InvalidQuality(other.to_string())),
        }
    }
}

/// One cell of the mural.
///
/// Placeholders use `placeholder-<n>` ids and an empty `external_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCover {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub artist_name: String,
    pub spotify_uri: String,
    pub external_url: String,
}

impl AlbumCover {
    pub fn is_placeholder(&self) -> bool {
        self.external_url.is_empty() && self.id.starts_with("placeholder-")
    }
}

#[derive(Tabled)]
pub struct MuralTableRow {
    pub position: String,
    pub album: String,
    pub artist: String,
    pub image: String,
}

/// A validated request for a `width` x `height` mural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRequest {
    width: u32,
    height: u32,
    pub quality: ImageQuality,
    pub time_range: TimeRange,
}

impl CollectionRequest {
    pub fn new(
        width: u32,
        height: u32,
        quality: ImageQuality,
        time_range: TimeRange,
    ) -> Result<Self, ValidationError> {
        crate::validation::validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            quality,
            time_range,
        })
    }

    /// Builds a request from raw user input, e.g. query string values.
    pub fn parse(
        width: &str,
        height: &str,
        quality: &str,
        time_range: &str,
    ) -> Result<Self, ValidationError> {
        let width = crate::validation::parse_dimension(width)?;
        let height = crate::validation::parse_dimension(height)?;
        Self::new(
            width,
            height,
            crate::validation::parse_quality(quality)?,
            crate::validation::parse_time_range(time_range)?,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of covers the mural needs.
    pub fn required(&self) -> usize {
        (self.width * self.height) as usize
    }
}

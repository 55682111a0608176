use std::collections::HashSet;

use crate::{
    error::MuralError,
    management::TrackPageFetcher,
    types::{AlbumCover, CollectionRequest, Image, ImageQuality, Track},
    warning,
};

pub const PAGE_SIZE: u32 = 50;
/// Offsets at or past this value are never requested.
pub const MAX_OFFSET: u32 = 200;
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-album.png";
pub const PLACEHOLDER_NAME: &str = "No Album";
pub const PLACEHOLDER_ARTIST: &str = "Add more music to your library";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const MEDIUM_MIN_WIDTH: u32 = 200;
const MEDIUM_MAX_WIDTH: u32 = 400;

/// Picks the image URL for `quality` from an album's images.
///
/// Images are ordered widest first (missing widths count as 0). `High`
/// takes the widest, `Low` the narrowest, `Medium` the first image between
/// 200 and 400 pixels wide, falling back to the middle of the list.
pub fn select_image(images: &[Image], quality: ImageQuality) -> String {
    let mut sorted: Vec<&Image> = images.iter().collect();
    sorted.sort_by(|a, b| b.width.unwrap_or(0).cmp(&a.width.unwrap_or(0)));

    let (Some(widest), Some(narrowest)) = (sorted.first(), sorted.last()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    let chosen = match quality {
        ImageQuality::High => widest,
        ImageQuality::Low => narrowest,
        ImageQuality::Medium => sorted
            .iter()
            .find(|image| {
                image
                    .width
                    .is_some_and(|w| (MEDIUM_MIN_WIDTH..=MEDIUM_MAX_WIDTH).contains(&w))
            })
            .or_else(|| sorted.get(sorted.len() / 2))
            .unwrap_or(widest),
    };

    chosen.url.clone()
}

fn cover_from_track(track: &Track, image_url: String) -> AlbumCover {
    AlbumCover {
        id: track.album.id.clone(),
        name: track.album.name.clone(),
        image_url,
        artist_name: track
            .artists
            .first()
            .map(|artist| artist.name.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
        spotify_uri: track.album.uri.clone(),
        external_url: track.album.external_urls.spotify.clone().unwrap_or_default(),
    }
}

/// Filler cell for murals the listening history cannot fill.
pub fn placeholder_cover(index: usize) -> AlbumCover {
    AlbumCover {
        id: format!("placeholder-{index}"),
        name: PLACEHOLDER_NAME.to_string(),
        image_url: PLACEHOLDER_IMAGE.to_string(),
        artist_name: PLACEHOLDER_ARTIST.to_string(),
        spotify_uri: String::new(),
        external_url: String::new(),
    }
}

/// Collects exactly `width * height` distinct album covers.
///
/// Pages of 50 top tracks are scanned in order; a track whose album (or
/// selected image) was already seen is skipped. Paging stops once enough
/// covers are found, when Spotify reports no further page, or when the
/// offset reaches [`MAX_OFFSET`]. Any shortfall is filled with
/// placeholders after the real covers.
///
/// # Errors
///
/// The first failed page fetch aborts the collection; no partial result is
/// returned.
pub async fn collect_album_covers<F>(
    fetcher: &F,
    request: &CollectionRequest,
) -> Result<Vec<AlbumCover>, MuralError>
where
    F: TrackPageFetcher,
{
    let required = request.required();
    let mut covers: Vec<AlbumCover> = Vec::with_capacity(required);
    let mut seen_albums: HashSet<String> = HashSet::new();
    let mut seen_images: HashSet<String> = HashSet::new();
    let max_pages = MAX_OFFSET / PAGE_SIZE;

    for page_index in 0..max_pages {
        let offset = page_index * PAGE_SIZE;
        let page = fetcher
            .fetch_page(request.time_range, PAGE_SIZE, offset)
            .await?;

        for track in &page.items {
            if covers.len() >= required {
                break;
            }

            let image_url = select_image(&track.album.images, request.quality);
            if seen_albums.contains(&track.album.id) || seen_images.contains(&image_url) {
                continue;
            }

            seen_albums.insert(track.album.id.clone());
            seen_images.insert(image_url.clone());
            covers.push(cover_from_track(track, image_url));
        }

        if covers.len() >= required || !page.has_more() {
            break;
        }

        if page_index + 1 == max_pages {
            warning!(
                "Reached maximum offset with {} of {} unique albums",
                covers.len(),
                required
            );
        }
    }

    let found = covers.len();
    covers.extend((0..required.saturating_sub(found)).map(placeholder_cover));

    Ok(covers)
}

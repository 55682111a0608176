use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::CliState,
    error,
    error::MuralError,
    info,
    management::{AuthorizedFetcher, collect_album_covers},
    success,
    types::{AlbumCover, CollectionRequest, MuralTableRow},
    warning,
};

const CLI_IDENTITY: &str = "cli";

pub async fn mural(state: CliState, request: CollectionRequest, json: bool) {
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!(
        "Collecting {} album covers ({})...",
        request.required(),
        request.time_range
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let fetcher = AuthorizedFetcher::new(
        &*state.auth,
        state.limiter.as_ref(),
        state.rate_limit,
        CLI_IDENTITY,
    );
    let result = collect_album_covers(&fetcher, &request).await;
    pb.finish_and_clear();

    let covers = match result {
        Ok(covers) => covers,
        Err(MuralError::Unauthorized) => {
            error!("Not authenticated. Please run muralcli auth");
        }
        Err(e) => error!("{}", e.user_message()),
    };

    if json {
        match serde_json::to_string_pretty(&covers) {
            Ok(output) => println!("{}", output),
            Err(e) => error!("Failed to serialize covers: {}", e),
        }
        return;
    }

    let placeholders = covers.iter().filter(|c| c.is_placeholder()).count();
    let rows = table_rows(&covers, request.width());
    println!("{}", Table::new(rows));

    if placeholders > 0 {
        warning!(
            "Only {} distinct albums found, filled {} cells with placeholders.",
            covers.len() - placeholders,
            placeholders
        );
    } else {
        success!("Collected {} album covers.", covers.len());
    }
    info!(
        "Mural layout: {} x {} ({} quality)",
        request.width(),
        request.height(),
        request.quality
    );
}

/// One row per cell, positioned as `row:column` in reading order.
fn table_rows(covers: &[AlbumCover], width: u32) -> Vec<MuralTableRow> {
    let width = width.max(1) as usize;
    covers
        .iter()
        .enumerate()
        .map(|(i, cover)| MuralTableRow {
            position: format!("{}:{}", i / width + 1, i % width + 1),
            album: cover.name.clone(),
            artist: cover.artist_name.clone(),
            image: cover.image_url.clone(),
        })
        .collect()
}

use std::path::PathBuf;

use cardex_cache::ImageOutcome;
use cardex_catalog::{CardFace, ImageSize};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::progress::BarProgress;
use crate::settings::Settings;

use super::AppContext;

/// Print one image URL, mirroring it first unless `fast` is set.
pub(crate) async fn run_image(
    settings: Settings,
    id: String,
    size: ImageSize,
    back: bool,
    fast: bool,
) -> Result<(), CliError> {
    let ctx = AppContext::open(settings)?;
    let images = ctx.image_cache();
    let face = if back { CardFace::Back } else { CardFace::Front };

    if fast {
        match images.get_card_image_url_fast(&id, size, face)? {
            Some(url) => println!("{}", url),
            None => log::warn!("No stored {} {} image for {}", face, size, id),
        }
        return Ok(());
    }

    let outcome = images.cache_image(&id, size, face).await?;
    let note = match &outcome {
        ImageOutcome::Uploaded(_) => "mirrored",
        ImageOutcome::AlreadyCached(_) => "already mirrored",
        ImageOutcome::Fallback(_) if images.is_storage_configured() => "mirroring failed; upstream",
        ImageOutcome::Fallback(_) => "upstream",
        ImageOutcome::Missing => {
            log::warn!("No {} {} image for {}", face, size, id);
            return Ok(());
        }
    };
    if let Some(url) = outcome.url() {
        println!("{}", url);
    }
    log::debug!("{} {} image for {}: {}", face, size, id, note);
    Ok(())
}

/// Mirror images for every id in `ids_file`, one id per line.
pub(crate) async fn run_cache_images(
    settings: Settings,
    ids_file: PathBuf,
    size: ImageSize,
    back_faces: bool,
) -> Result<(), CliError> {
    let ids: Vec<String> = std::fs::read_to_string(&ids_file)?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        log::info!(
            "{}",
            "No card ids to cache.".if_supports_color(Stdout, |t| t.dimmed())
        );
        return Ok(());
    }

    let ctx = AppContext::open(settings)?;
    let images = ctx.image_cache();
    if !images.is_storage_configured() {
        log::warn!("Image storage is not configured; nothing will be mirrored");
    }

    let progress = BarProgress::new(ids.len(), !log::log_enabled!(log::Level::Info));
    let summary = if back_faces {
        images
            .batch_cache_images_with_back_faces(&ids, size, &progress)
            .await
    } else {
        images.batch_cache_images(&ids, size, &progress).await
    };

    log::info!(
        "{} {} cards",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ids.len(),
    );
    log::info!("  Uploaded:        {:>6}", summary.uploaded);
    log::info!("  Already cached:  {:>6}", summary.already_cached);
    log::info!("  Upstream URL:    {:>6}", summary.fallback);
    log::info!("  Missing:         {:>6}", summary.missing);
    Ok(())
}

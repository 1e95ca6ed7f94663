//! Binary entrypoint for the slideshow kiosk.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

use slideshow_kiosk::cache::SlideCache;
use slideshow_kiosk::catalog::{self, Catalog};
use slideshow_kiosk::config::Configuration;
use slideshow_kiosk::error::Error;
use slideshow_kiosk::http::HttpTransport;
use slideshow_kiosk::playback::PlaybackController;
use slideshow_kiosk::settings::SettingsStore;
use slideshow_kiosk::tasks::player::PlayerContext;
use slideshow_kiosk::tasks::{control, loader, player, viewer};
use slideshow_kiosk::{album, discovery, sort};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "slideshow-kiosk", about = "Album slideshow kiosk viewer")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Client id selecting the album namespace
    #[arg(long)]
    client: Option<String>,

    /// Show id within the client
    #[arg(long)]
    show: Option<String>,

    /// Kiosk link to derive the album from (legacy query parameters accepted)
    #[arg(long, value_name = "URL")]
    link: Option<String>,

    /// List the published albums and exit
    #[arg(long)]
    browse: bool,

    /// Override the autoplay interval (seconds)
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("slideshow_kiosk={}", level).parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("hyper=warn".parse().unwrap());
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .validated()
        .context("validating configuration")?;

    let transport = Arc::new(HttpTransport::new(cfg.http_timeout, cfg.cache_bust.clone())?);

    let album = match album::resolve(cli.client, cli.show, cli.link.as_deref()) {
        Some(album) if !cli.browse => album,
        resolved => {
            browse_catalog(transport.as_ref(), &cfg.base_url).await;
            if resolved.is_none() {
                println!("Select an album with --client <ID> --show <ID>.");
            }
            return Ok(());
        }
    };

    let store = SettingsStore::new(&cfg.settings_path);
    let mut settings = store.load(&album);
    if let Some(secs) = cli.interval {
        settings.interval_sec = secs.max(1);
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    info!(album = %album, "discovering slides");
    let mut slides =
        discovery::discover_slides(transport.as_ref(), &cfg.base_url, &album, &cfg.probe, &cancel)
            .await;
    if slides.is_empty() {
        error!(album = %album, "discovery found nothing");
        println!("No slides found for album {album}.");
        return Err(Error::EmptyAlbum(album.to_string()).into());
    }
    info!(count = slides.len(), "slides discovered");
    sort::sort_slides(&mut slides, settings.sort_by, settings.direction);

    let audio = discovery::discover_audio(transport.as_ref(), &cfg.base_url, &album).await;
    if let Some(track) = &audio {
        info!(src = %track.src, "background audio available");
    }

    let (control_tx, control_rx) = mpsc::channel(16);
    let (viewer_tx, viewer_rx) = mpsc::channel(16);
    let (prefetch_tx, prefetch_rx) = mpsc::channel(16);
    let cache = Arc::new(SlideCache::new(cfg.prefetch_cache_slides));

    let viewer_task = tokio::spawn(viewer::run(
        viewer_rx,
        transport.clone(),
        cache.clone(),
        cancel.clone(),
    ));
    let loader_task = tokio::spawn(loader::run(
        prefetch_rx,
        transport.clone(),
        cache.clone(),
        cancel.clone(),
    ));
    let control_task = tokio::spawn(control::run(control_tx, cancel.clone()));

    let controller = PlaybackController::new(slides, settings.interval());
    let ctx = PlayerContext {
        album,
        store,
        settings,
        audio,
        autoplay: cfg.autoplay,
    };
    player::run(
        ctx,
        controller,
        control_rx,
        viewer_tx,
        prefetch_tx,
        cancel.clone(),
    )
    .await?;

    cancel.cancel();
    let _ = viewer_task.await;
    let _ = loader_task.await;
    let _ = control_task.await;
    Ok(())
}

async fn browse_catalog(transport: &HttpTransport, base_url: &str) {
    match catalog::fetch_catalog(transport, base_url).await {
        Some(catalog) => print_catalog(&catalog),
        None => println!("Could not load the album catalog."),
    }
}

fn print_catalog(catalog: &Catalog) {
    if catalog.clients.is_empty() {
        println!("The catalog is empty.");
        return;
    }
    println!("Published albums:");
    for client in &catalog.clients {
        println!("  {}", client.display_name());
        for show in &client.shows {
            println!(
                "    --client {} --show {}   ({})",
                client.id,
                show.id,
                show.display_name()
            );
        }
    }
}

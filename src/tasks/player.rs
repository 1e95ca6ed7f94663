use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::album::AlbumKey;
use crate::discovery::AudioTrack;
use crate::events::{ControlEvent, Prefetch, ViewerEvent};
use crate::playback::PlaybackController;
use crate::settings::{Settings, SettingsStore};
use crate::sort::sort_slides;

/// Everything the player owns for one album session.
pub struct PlayerContext {
    pub album: AlbumKey,
    pub store: SettingsStore,
    pub settings: Settings,
    pub audio: Option<AudioTrack>,
    pub autoplay: bool,
}

/// Drives the slideshow.
///
/// Rules:
/// - Control events mutate the playback state machine, then the viewer is
///   re-rendered synchronously before the next event is taken.
/// - The autoplay deadline is the only timer; the single sleep branch below
///   re-reads it every iteration, so rescheduling can never leave two
///   timers running.
/// - Manual navigation always drops out of autoplay.
/// - Settings changes stay in memory until an explicit save.
pub async fn run(
    mut ctx: PlayerContext,
    mut controller: PlaybackController,
    mut control_rx: Receiver<ControlEvent>,
    to_viewer: Sender<ViewerEvent>,
    to_loader: Sender<Prefetch>,
    cancel: CancellationToken,
) -> Result<()> {
    // Background audio starts muted until the user opts in.
    let mut audio_muted = true;

    let _ = to_viewer
        .send(ViewerEvent::Margin(ctx.settings.margin_pct))
        .await;
    show_current(&controller, &to_viewer, &to_loader).await;
    if ctx.autoplay {
        controller.play(Instant::now());
        let _ = to_viewer
            .send(ViewerEvent::Playing(controller.is_playing()))
            .await;
    }

    loop {
        let deadline = controller.deadline();
        select! {
            _ = cancel.cancelled() => break,

            _ = async move {
                match deadline {
                    Some(d) => tokio::time::sleep_until(d).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                controller.tick(Instant::now());
                show_current(&controller, &to_viewer, &to_loader).await;
            }

            maybe = control_rx.recv() => {
                let Some(event) = maybe else { break };
                debug!(?event, "control event");
                match event {
                    ControlEvent::Next => {
                        let target = controller.current_index() as i64 + 1;
                        manual_jump(&mut controller, target, &to_viewer, &to_loader).await;
                    }
                    ControlEvent::Prev => {
                        let target = controller.current_index() as i64 - 1;
                        manual_jump(&mut controller, target, &to_viewer, &to_loader).await;
                    }
                    ControlEvent::Goto(index) => {
                        manual_jump(&mut controller, index, &to_viewer, &to_loader).await;
                    }
                    ControlEvent::TogglePlay => {
                        controller.toggle(Instant::now());
                        let _ = to_viewer
                            .send(ViewerEvent::Playing(controller.is_playing()))
                            .await;
                    }
                    ControlEvent::SetInterval(interval) => {
                        controller.set_interval(interval, Instant::now());
                        ctx.settings.interval_sec = controller.interval().as_secs();
                        info!(
                            interval = %humantime::format_duration(controller.interval()),
                            "autoplay interval changed"
                        );
                    }
                    ControlEvent::SetMargin(pct) => {
                        ctx.settings.margin_pct = pct.min(Settings::MARGIN_MAX);
                        let _ = to_viewer
                            .send(ViewerEvent::Margin(ctx.settings.margin_pct))
                            .await;
                    }
                    ControlEvent::AdjustMargin(step) => {
                        let margin = (i16::from(ctx.settings.margin_pct) + i16::from(step))
                            .clamp(0, i16::from(Settings::MARGIN_MAX))
                            as u8;
                        if margin != ctx.settings.margin_pct {
                            ctx.settings.margin_pct = margin;
                            let _ = to_viewer.send(ViewerEvent::Margin(margin)).await;
                        }
                    }
                    ControlEvent::SetSort(by, direction) => {
                        ctx.settings.sort_by = by;
                        ctx.settings.direction = direction;
                        let mut slides = controller.slides().to_vec();
                        sort_slides(&mut slides, by, direction);
                        controller.replace_slides(slides);
                        show_current(&controller, &to_viewer, &to_loader).await;
                    }
                    ControlEvent::ToggleAudio => {
                        if ctx.audio.is_some() {
                            audio_muted = !audio_muted;
                            let _ = to_viewer.send(ViewerEvent::AudioMuted(audio_muted)).await;
                        } else {
                            let _ = to_viewer
                                .send(ViewerEvent::Notice(
                                    "no background audio for this album".to_string(),
                                ))
                                .await;
                        }
                    }
                    ControlEvent::SaveSettings => match ctx.store.save(&ctx.album, &ctx.settings) {
                        Ok(()) => {
                            let _ = to_viewer
                                .send(ViewerEvent::Notice("settings saved".to_string()))
                                .await;
                        }
                        Err(err) => {
                            warn!(error = %err, "failed to save settings");
                            let _ = to_viewer
                                .send(ViewerEvent::Notice(
                                    "settings could not be saved".to_string(),
                                ))
                                .await;
                        }
                    },
                    ControlEvent::Quit => {
                        cancel.cancel();
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Manual navigation: pause, move, announce the pause, re-render.
async fn manual_jump(
    controller: &mut PlaybackController,
    index: i64,
    to_viewer: &Sender<ViewerEvent>,
    to_loader: &Sender<Prefetch>,
) {
    let was_playing = controller.is_playing();
    controller.goto(index);
    if was_playing {
        let _ = to_viewer.send(ViewerEvent::Playing(false)).await;
    }
    show_current(controller, to_viewer, to_loader).await;
}

/// Push the current slide to the surface and queue neighbor prefetches.
async fn show_current(
    controller: &PlaybackController,
    to_viewer: &Sender<ViewerEvent>,
    to_loader: &Sender<Prefetch>,
) {
    if let Some(slide) = controller.current_slide() {
        let _ = to_viewer
            .send(ViewerEvent::ShowSlide {
                slide: slide.clone(),
                index: controller.current_index(),
                total: controller.len(),
            })
            .await;
    }
    let neighbors = controller.neighbors();
    if !neighbors.is_empty() {
        let _ = to_loader.send(Prefetch(neighbors)).await;
    }
}

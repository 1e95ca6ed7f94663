//! Thin terminal presentation surface. Renders whatever the player sends;
//! nothing in the playback core depends on what happens here.

use std::sync::Arc;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::SlideCache;
use crate::events::ViewerEvent;
use crate::http::{HttpTransport, Transport};

pub async fn run(
    mut events: Receiver<ViewerEvent>,
    transport: Arc<HttpTransport>,
    cache: Arc<SlideCache>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut margin_pct: u8 = 0;
    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe = events.recv() => {
                let Some(event) = maybe else { break };
                match event {
                    ViewerEvent::ShowSlide { slide, index, total } => {
                        let (bytes, origin) = match cache.get(&slide.src) {
                            Some(bytes) => (Some(bytes), "cache"),
                            None => (transport.get_bytes(&slide.src).await, "network"),
                        };
                        let dims = bytes
                            .as_deref()
                            .and_then(|b| image::load_from_memory(b).ok())
                            .map(|img| format!("{}x{}", img.width(), img.height()))
                            .unwrap_or_else(|| "?".to_string());
                        debug!(src = %slide.src, origin, "slide bytes resolved");
                        let label = slide.title.as_deref().unwrap_or(&slide.file);
                        println!(
                            "[{}/{}] {label}  ({dims}, margin {margin_pct}%)",
                            index + 1,
                            total
                        );
                    }
                    ViewerEvent::Playing(true) => println!("autoplay on"),
                    ViewerEvent::Playing(false) => println!("autoplay paused"),
                    ViewerEvent::Margin(pct) => {
                        margin_pct = pct;
                        println!("margin {pct}%");
                    }
                    ViewerEvent::AudioMuted(true) => println!("audio muted"),
                    ViewerEvent::AudioMuted(false) => println!("audio on"),
                    ViewerEvent::Notice(text) => println!("{text}"),
                }
            }
        }
    }
    Ok(())
}

//! Neighbor prefetcher: warms the slide cache so the viewer usually finds
//! the next image locally. Best-effort; failures are logged and dropped.

use std::sync::Arc;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::SlideCache;
use crate::events::Prefetch;
use crate::http::{HttpTransport, Transport};

pub async fn run(
    mut requests: Receiver<Prefetch>,
    transport: Arc<HttpTransport>,
    cache: Arc<SlideCache>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        select! {
            _ = cancel.cancelled() => break,
            maybe = requests.recv() => {
                let Some(Prefetch(slides)) = maybe else { break };
                for slide in slides {
                    if cache.contains(&slide.src) {
                        continue;
                    }
                    match transport.get_bytes(&slide.src).await {
                        Some(bytes) => {
                            debug!(src = %slide.src, bytes = bytes.len(), "prefetched");
                            cache.put(&slide.src, bytes);
                        }
                        None => debug!(src = %slide.src, "prefetch failed"),
                    }
                }
            }
        }
    }
    Ok(())
}

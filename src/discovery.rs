//! Slide discovery: manifest, index, then brute-force numbered probing.
//!
//! Strategies run in priority order and the first one that yields slides
//! wins. All network failures fall through to the next strategy; a fully
//! empty result is the caller's cue to surface one user-visible error.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::album::AlbumKey;
use crate::config::ProbeOptions;
use crate::http::{Transport, join_url};

/// One discovered image. Immutable once discovered; only the sorter
/// reorders the sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// File identifier within the album.
    pub file: String,
    /// Fully resolved URL.
    pub src: String,
    pub title: Option<String>,
    pub date_modified: Option<DateTime<Utc>>,
}

/// Background audio track found next to the slides.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    pub src: String,
}

const AUDIO_NAMES: &[&str] = &["audio", "background"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "m4a"];

/// Manifest shapes accepted at the album path: a keyed object or a bare
/// array, each holding filenames or slide descriptors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestDoc {
    Images { images: Vec<ManifestEntry> },
    Slides { slides: Vec<ManifestEntry> },
    Bare(Vec<ManifestEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Name(String),
    Descriptor {
        file: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default, rename = "dateModified")]
        date_modified: Option<String>,
    },
}

impl ManifestDoc {
    fn into_entries(self) -> Vec<ManifestEntry> {
        match self {
            Self::Images { images } => images,
            Self::Slides { slides } => slides,
            Self::Bare(entries) => entries,
        }
    }
}

impl ManifestEntry {
    fn into_slide(self, album_url: &str) -> Slide {
        match self {
            Self::Name(file) => Slide {
                src: join_url(album_url, &file),
                file,
                title: None,
                date_modified: None,
            },
            Self::Descriptor {
                file,
                title,
                date_modified,
            } => Slide {
                src: join_url(album_url, &file),
                file,
                title,
                date_modified: date_modified.as_deref().and_then(parse_datestamp),
            },
        }
    }
}

/// Parse a manifest timestamp leniently: RFC 3339, then RFC 2822.
fn parse_datestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Produce the ordered slide list for `album`. Empty means every strategy
/// failed. The order is provisional; the sorter may reorder it.
pub async fn discover_slides<T: Transport>(
    transport: &T,
    base_url: &str,
    album: &AlbumKey,
    probe: &ProbeOptions,
    cancel: &CancellationToken,
) -> Vec<Slide> {
    let album_url = join_url(base_url, &album.album_path());

    for name in ["manifest.json", "index.json"] {
        if let Some(value) = transport.get_json(&join_url(&album_url, name)).await
            && let Ok(doc) = serde_json::from_value::<ManifestDoc>(value)
        {
            let slides: Vec<Slide> = doc
                .into_entries()
                .into_iter()
                .map(|e| e.into_slide(&album_url))
                .collect();
            if !slides.is_empty() {
                info!(album = %album, source = name, count = slides.len(), "album listed");
                return slides;
            }
        }
        debug!(album = %album, source = name, "listing unavailable, falling through");
    }

    probe_numbered(transport, &album_url, probe, cancel).await
}

/// Scan `base/<padded-i>.<ext>` for i = 1.. until the miss tolerance is
/// exhausted or the cap is reached. Probes run concurrently within a batch;
/// batches are awaited whole so parallelism stays bounded.
async fn probe_numbered<T: Transport>(
    transport: &T,
    album_url: &str,
    probe: &ProbeOptions,
    cancel: &CancellationToken,
) -> Vec<Slide> {
    let mut found = Vec::new();
    let mut misses = 0u32;
    let mut started = false;
    let mut next = 1u32;

    'scan: while next <= probe.max_index {
        if cancel.is_cancelled() {
            debug!(probed_up_to = next - 1, "probe scan cancelled");
            break;
        }
        let batch_end = probe
            .max_index
            .min(next.saturating_add(probe.batch_size - 1));
        let batch = join_all((next..=batch_end).map(|i| probe_index(transport, album_url, i, probe)));
        for hit in batch.await {
            match hit {
                Some(slide) => {
                    found.push(slide);
                    started = true;
                    misses = 0;
                }
                None if started => {
                    misses += 1;
                    if misses >= probe.miss_tolerance {
                        break 'scan;
                    }
                }
                None => {}
            }
        }
        next = batch_end + 1;
    }

    info!(count = found.len(), "numbered probe complete");
    found
}

/// Try every padding/extension variant for one index; first hit wins.
async fn probe_index<T: Transport>(
    transport: &T,
    album_url: &str,
    index: u32,
    probe: &ProbeOptions,
) -> Option<Slide> {
    let mut tried = Vec::new();
    for width in &probe.pad_widths {
        let stem = format!("{index:0width$}", width = *width);
        if tried.contains(&stem) {
            continue;
        }
        for ext in &probe.extensions {
            let file = format!("{stem}.{ext}");
            let url = join_url(album_url, &file);
            if let Some(hit) = transport.head(&url).await {
                return Some(Slide {
                    file,
                    src: url,
                    title: None,
                    date_modified: hit.last_modified,
                });
            }
        }
        tried.push(stem);
    }
    None
}

/// Probe the fixed candidate-name matrix for a background track.
pub async fn discover_audio<T: Transport>(
    transport: &T,
    base_url: &str,
    album: &AlbumKey,
) -> Option<AudioTrack> {
    let album_url = join_url(base_url, &album.album_path());
    for name in AUDIO_NAMES {
        for ext in AUDIO_EXTENSIONS {
            let url = join_url(&album_url, &format!("{name}.{ext}"));
            if transport.head(&url).await.is_some() {
                debug!(src = %url, "audio track found");
                return Some(AudioTrack { src: url });
            }
        }
    }
    None
}

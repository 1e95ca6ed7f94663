//! Runtime configuration for the kiosk, loaded from YAML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Base URL the album tree and catalog index are served under.
    pub base_url: String,
    /// Directory holding one JSON settings file per album.
    pub settings_path: PathBuf,
    /// Whether playback starts in autoplay.
    pub autoplay: bool,
    /// Per-request timeout for album fetches and probes.
    #[serde(with = "humantime_serde")]
    pub http_timeout: Duration,
    /// Fixed cache-busting token appended to every fetched URL.
    /// When unset, the process start time is used.
    pub cache_bust: Option<String>,
    /// How many prefetched slides the in-memory cache retains.
    pub prefetch_cache_slides: usize,
    /// Numbered-filename probing options.
    pub probe: ProbeOptions,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(!self.base_url.is_empty(), "base-url must be set");
        ensure!(
            self.prefetch_cache_slides > 0,
            "prefetch-cache-slides must be greater than zero"
        );
        self.probe
            .validate()
            .context("invalid probe configuration")?;
        Ok(self)
    }

    const fn default_http_timeout() -> Duration {
        Duration::from_secs(10)
    }

    const fn default_prefetch_cache_slides() -> usize {
        8
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            settings_path: PathBuf::from("settings"),
            autoplay: true,
            http_timeout: Self::default_http_timeout(),
            cache_bust: None,
            prefetch_cache_slides: Self::default_prefetch_cache_slides(),
            probe: ProbeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProbeOptions {
    /// Highest slide number attempted.
    pub max_index: u32,
    /// Consecutive misses tolerated once the run of hits has started.
    pub miss_tolerance: u32,
    /// Probes issued concurrently per batch. Keep at or below
    /// miss-tolerance so an early stop never scans past the miss run.
    pub batch_size: u32,
    /// Candidate file extensions, tried in order.
    pub extensions: Vec<String>,
    /// Zero-padding widths tried for each index, in order.
    pub pad_widths: Vec<usize>,
}

impl ProbeOptions {
    fn validate(&self) -> Result<()> {
        ensure!(self.max_index >= 1, "probe.max-index must be >= 1");
        ensure!(self.miss_tolerance >= 1, "probe.miss-tolerance must be >= 1");
        ensure!(self.batch_size >= 1, "probe.batch-size must be >= 1");
        ensure!(
            !self.extensions.is_empty(),
            "probe.extensions must not be empty"
        );
        ensure!(
            !self.pad_widths.is_empty(),
            "probe.pad-widths must not be empty"
        );
        ensure!(
            self.pad_widths.iter().all(|w| (1..=9).contains(w)),
            "probe.pad-widths entries must be between 1 and 9"
        );
        Ok(())
    }
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            max_index: 999,
            miss_tolerance: 3,
            batch_size: 3,
            extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            pad_widths: vec![2, 1, 3],
        }
    }
}

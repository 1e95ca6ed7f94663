//! Per-album presentation settings and their on-disk store.
//!
//! One JSON file per album key. Loading never fails: unrecognized or
//! mistyped fields are dropped field-by-field and anything else falls back
//! to the defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::album::AlbumKey;
use crate::error::Error;
use crate::sort::{Direction, SortBy};

/// User-adjustable presentation parameters for one album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Layout margin around the slide, percent of the stage.
    pub margin_pct: u8,
    /// Autoplay period in whole seconds.
    pub interval_sec: u64,
    pub sort_by: SortBy,
    pub direction: Direction,
}

impl Settings {
    pub const MARGIN_MAX: u8 = 40;

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_sec.max(1))
    }

    /// Typed field-by-field merge over the defaults. Numeric fields clamp
    /// into their documented ranges; anything mistyped is ignored.
    fn merged_from(value: &Value) -> Self {
        let mut settings = Self::default();
        if let Some(n) = value.get("marginPct").and_then(Value::as_u64) {
            settings.margin_pct = n.min(u64::from(Self::MARGIN_MAX)) as u8;
        }
        if let Some(n) = value.get("intervalSec").and_then(Value::as_u64) {
            settings.interval_sec = n.max(1);
        }
        if let Some(by) = value.get("sortBy").and_then(|v| typed_enum(v)) {
            settings.sort_by = by;
        }
        if let Some(dir) = value.get("direction").and_then(|v| typed_enum(v)) {
            settings.direction = dir;
        }
        settings
    }
}

fn typed_enum<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margin_pct: 5,
            interval_sec: 5,
            sort_by: SortBy::Name,
            direction: Direction::Asc,
        }
    }
}

/// Key-value store with one JSON entry per album.
pub struct SettingsStore {
    root: PathBuf,
}

impl SettingsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load the settings for `album`, falling back to defaults on any
    /// missing, corrupt, or mistyped data. Never an error.
    pub fn load(&self, album: &AlbumKey) -> Settings {
        let path = self.entry_path(album);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "no persisted settings, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Settings::merged_from(&value),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "corrupt settings discarded");
                Settings::default()
            }
        }
    }

    /// Persist the full settings object for `album`.
    pub fn save(&self, album: &AlbumKey, settings: &Settings) -> Result<(), Error> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.entry_path(album);
        let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    fn entry_path(&self, album: &AlbumKey) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(&album.settings_key())))
    }
}

/// Make a namespace key safe as a filename.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

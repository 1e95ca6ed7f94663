//! Album identity and resolution from kiosk launch parameters.

use std::fmt;

use reqwest::Url;

/// Query parameter names accepted for the client id, in priority order.
const CLIENT_ALIASES: &[&str] = &["client", "clientId", "IDClient"];
/// Query parameter names accepted for the show id, in priority order.
const SHOW_ALIASES: &[&str] = &["show", "album"];

/// Identifies one album: a settings namespace and a storage path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumKey {
    pub client: String,
    pub show: String,
}

impl AlbumKey {
    /// Build a key from explicit parts. Empty parts never name an album.
    pub fn new(client: impl Into<String>, show: impl Into<String>) -> Option<Self> {
        let client = client.into();
        let show = show.into();
        if client.is_empty() || show.is_empty() {
            return None;
        }
        Some(Self { client, show })
    }

    /// Relative URL path of the album's content.
    pub fn album_path(&self) -> String {
        format!("albums/{}/{}/", self.client, self.show)
    }

    /// Namespace key for the persisted settings entry.
    pub fn settings_key(&self) -> String {
        format!("slideshow::{}::{}", self.client, self.show)
    }
}

impl fmt::Display for AlbumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client, self.show)
    }
}

/// Resolve the album from CLI flags and/or a kiosk link.
///
/// Explicit flags win over link parameters; the link is consulted for
/// whichever half is missing. Returns `None` when no usable pair exists,
/// which sends the caller to the catalog-browse fallback.
pub fn resolve(
    client: Option<String>,
    show: Option<String>,
    link: Option<&str>,
) -> Option<AlbumKey> {
    let (link_client, link_show) = match link.map(parse_link) {
        Some(Some(parts)) => parts,
        _ => (None, None),
    };
    let client = client.filter(|c| !c.is_empty()).or(link_client)?;
    let show = show.filter(|s| !s.is_empty()).or(link_show)?;
    AlbumKey::new(client, show)
}

/// Pull client/show out of a kiosk URL, honoring legacy parameter names.
fn parse_link(link: &str) -> Option<(Option<String>, Option<String>)> {
    let url = Url::parse(link).ok()?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    Some((
        first_param(&pairs, CLIENT_ALIASES),
        first_param(&pairs, SHOW_ALIASES),
    ))
}

fn first_param(pairs: &[(String, String)], aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        for (key, value) in pairs {
            if key == alias && !value.is_empty() {
                return Some(value.clone());
            }
        }
    }
    None
}

//! The browsable catalog of published albums, served as `albums/index.json`.

use serde::Deserialize;

use crate::http::{Transport, join_url};

#[derive(Debug, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub clients: Vec<CatalogClient>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogClient {
    #[serde(alias = "guid")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shows: Vec<CatalogShow>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogShow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl CatalogClient {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl CatalogShow {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Fetch and parse the catalog root. `None` when it is missing or malformed.
pub async fn fetch_catalog<T: Transport>(transport: &T, base_url: &str) -> Option<Catalog> {
    let url = join_url(base_url, "albums/index.json");
    let value = transport.get_json(&url).await?;
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_guid_alias_and_missing_names_parse() {
        let raw = serde_json::json!({
            "clients": [
                {"guid": "c-1", "shows": [{"id": "s-1", "name": "Spring"}]},
                {"id": "c-2", "name": "Acme", "shows": []},
            ]
        });
        let catalog: Catalog = serde_json::from_value(raw).unwrap();
        assert_eq!(catalog.clients.len(), 2);
        assert_eq!(catalog.clients[0].id, "c-1");
        assert_eq!(catalog.clients[0].display_name(), "c-1");
        assert_eq!(catalog.clients[0].shows[0].display_name(), "Spring");
        assert_eq!(catalog.clients[1].display_name(), "Acme");
    }
}

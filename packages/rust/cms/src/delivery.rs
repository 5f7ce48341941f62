//! Content Delivery API client: the read-only view the site renders.

use std::collections::HashMap;

use reqwest::Client;
use tracing::{info, instrument};

use folio_shared::{ContentStoreConfig, FolioError, Result, public_asset_url};

use crate::wire::{self, Collection, DeliveryEntry, check_status, decode, rich_text_first_value};

/// A published entry with its linked image already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredEntry {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    /// Public image URL; empty when the link could not be resolved.
    pub image_url: String,
    /// Plain text of the description's first paragraph.
    pub description: Option<String>,
    pub featured: bool,
}

/// Read-only client for published content.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: Client,
    base_url: String,
    space_id: String,
    environment_id: String,
    token: String,
}

impl DeliveryClient {
    pub fn new(config: &ContentStoreConfig, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: wire::build_client()?,
            base_url: wire::normalize_base_url(&config.delivery_base_url)?,
            space_id: config.space_id.clone(),
            environment_id: config.environment_id.clone(),
            token: token.into(),
        })
    }

    /// List published entries of `content_type`, resolving image links
    /// against the response's `includes.Asset` block.
    #[instrument(skip(self))]
    pub async fn list_entries(&self, content_type: &str) -> Result<Vec<DeliveredEntry>> {
        let url = format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url, self.space_id, self.environment_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("content_type", content_type), ("include", "1")])
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        let response = check_status(response, "list published entries").await?;
        let page: Collection<DeliveryEntry> = decode(response, "list published entries").await?;

        let asset_urls: HashMap<String, String> = page
            .includes
            .assets
            .into_iter()
            .filter_map(|asset| {
                let file = asset.fields.file?;
                Some((asset.sys.id, public_asset_url(&file.url)))
            })
            .collect();

        let entries: Vec<DeliveredEntry> = page
            .items
            .into_iter()
            .map(|entry| {
                let fields = entry.fields;
                let image_url = fields
                    .image
                    .as_ref()
                    .and_then(|link| asset_urls.get(&link.sys.id))
                    .cloned()
                    .unwrap_or_default();
                let description = fields
                    .description
                    .as_ref()
                    .and_then(rich_text_first_value)
                    .map(str::to_string);

                DeliveredEntry {
                    id: entry.sys.id,
                    title: fields.title,
                    category: fields.category,
                    image_url,
                    description,
                    featured: fields.featured.unwrap_or(false),
                }
            })
            .collect();

        info!(count = entries.len(), "published entries fetched");
        Ok(entries)
    }
}

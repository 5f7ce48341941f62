//! Contentful JSON shapes and the HTTP plumbing shared by both clients.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use folio_shared::{ArtworkDraft, FolioError, PublishDefaults, Result};

/// User-Agent string for content-store requests.
const USER_AGENT: &str = concat!("Folio/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest body snippet carried into an error message.
const ERROR_SNIPPET_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A page of items (`/assets`, `/entries`).
#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub includes: Includes,
}

/// Linked resources returned alongside delivery entries.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Includes {
    #[serde(rename = "Asset", default)]
    pub assets: Vec<DeliveryAsset>,
}

/// The `sys` block common to every resource.
#[derive(Debug, Deserialize)]
pub(crate) struct Sys {
    pub id: String,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// File metadata of an asset.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FileField {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "fileName", default)]
    pub file_name: String,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,
}

/// Management API asset: every field is a locale map.
#[derive(Debug, Deserialize)]
pub(crate) struct ManagementAsset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: ManagementAssetFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ManagementAssetFields {
    #[serde(default)]
    pub file: HashMap<String, FileField>,
}

/// Management API entry. Only `sys` matters to the pipeline.
#[derive(Debug, Deserialize)]
pub(crate) struct ManagementEntry {
    pub sys: Sys,
}

/// Delivery API asset: fields are already resolved to a single locale.
#[derive(Debug, Deserialize)]
pub(crate) struct DeliveryAsset {
    pub sys: Sys,
    #[serde(default)]
    pub fields: DeliveryAssetFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeliveryAssetFields {
    #[serde(default)]
    pub file: Option<FileField>,
}

/// Delivery API artwork entry.
#[derive(Debug, Deserialize)]
pub(crate) struct DeliveryEntry {
    pub sys: Sys,
    #[serde(default)]
    pub fields: DeliveryEntryFields,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeliveryEntryFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<Link>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub featured: Option<bool>,
}

/// `{ "sys": { "type": "Link", "linkType": "Asset", "id": ... } }`
#[derive(Debug, Deserialize)]
pub(crate) struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkSys {
    pub id: String,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Build the localized `fields` payload for a new artwork entry.
pub(crate) fn artwork_entry_body(defaults: &PublishDefaults, draft: &ArtworkDraft) -> Value {
    let locale = defaults.locale.as_str();
    json!({
        "fields": {
            "title": { locale: draft.title },
            "category": { locale: draft.category },
            "image": {
                locale: {
                    "sys": { "type": "Link", "linkType": "Asset", "id": draft.asset_id }
                }
            },
            "description": { locale: rich_text_paragraph(&draft.description) },
            "featured": { locale: draft.featured },
        }
    })
}

/// A rich-text document holding one paragraph of plain text.
pub(crate) fn rich_text_paragraph(text: &str) -> Value {
    json!({
        "nodeType": "document",
        "data": {},
        "content": [{
            "nodeType": "paragraph",
            "data": {},
            "content": [{ "nodeType": "text", "value": text, "marks": [], "data": {} }]
        }]
    })
}

/// First text node of the first paragraph, if the document has one.
pub(crate) fn rich_text_first_value(doc: &Value) -> Option<&str> {
    doc.pointer("/content/0/content/0/value")
        .and_then(Value::as_str)
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))
}

/// Validate a configured base URL and strip any trailing slash.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)
        .map_err(|e| FolioError::config(format!("invalid content store URL '{raw}': {e}")))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Turn a non-success response into a [`FolioError::ContentStore`].
pub(crate) async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
    Err(FolioError::content_store(
        status.as_u16(),
        format!("{what}: {snippet}"),
    ))
}

/// Decode a JSON body into `T`.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| FolioError::Network(format!("{what}: failed to read body: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FolioError::parse(format!("{what}: invalid response JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ArtworkDraft {
        ArtworkDraft {
            asset_id: "asset-7".into(),
            title: "Moonlit Fox".into(),
            category: "Uncategorized".into(),
            description: "A fox under a pale moon.".into(),
            featured: false,
        }
    }

    #[test]
    fn entry_body_wraps_every_field_in_locale() {
        let body = artwork_entry_body(&PublishDefaults::default(), &draft());
        let fields = &body["fields"];
        assert_eq!(fields["title"]["en-US"], "Moonlit Fox");
        assert_eq!(fields["category"]["en-US"], "Uncategorized");
        assert_eq!(fields["featured"]["en-US"], false);
        assert_eq!(fields["image"]["en-US"]["sys"]["linkType"], "Asset");
        assert_eq!(fields["image"]["en-US"]["sys"]["id"], "asset-7");
    }

    #[test]
    fn entry_body_description_is_single_paragraph_document() {
        let body = artwork_entry_body(&PublishDefaults::default(), &draft());
        let doc = &body["fields"]["description"]["en-US"];
        assert_eq!(doc["nodeType"], "document");
        assert_eq!(doc["content"].as_array().map(Vec::len), Some(1));
        assert_eq!(doc["content"][0]["nodeType"], "paragraph");
        assert_eq!(
            rich_text_first_value(doc),
            Some("A fox under a pale moon.")
        );
    }

    #[test]
    fn entry_body_honours_custom_locale() {
        let defaults = PublishDefaults {
            locale: "he-IL".into(),
            ..PublishDefaults::default()
        };
        let body = artwork_entry_body(&defaults, &draft());
        assert_eq!(body["fields"]["title"]["he-IL"], "Moonlit Fox");
        assert!(body["fields"]["title"].get("en-US").is_none());
    }

    #[test]
    fn base_url_trailing_slash_removed() {
        assert_eq!(
            normalize_base_url("https://api.contentful.com/").unwrap(),
            "https://api.contentful.com"
        );
        assert!(normalize_base_url("not a url").is_err());
    }
}

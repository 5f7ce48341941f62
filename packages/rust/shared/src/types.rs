//! Core domain types shared by the content-store client, the captioner, and
//! the ingestion pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when the captioning model returns no usable line.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Description used when the captioning model returns at most one line.
pub const DEFAULT_DESCRIPTION: &str = "Illustration.";

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// A stored media object in the content store. Read-only to Folio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Store-assigned asset id (`sys.id`).
    pub id: String,
    /// Publicly resolvable URL (`https:` prefixed). Empty if the asset has no file.
    pub url: String,
    /// Display filename of the uploaded file.
    pub file_name: String,
    /// MIME type reported by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Upload time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Whether the asset has a file the captioner can look at.
    pub fn has_file(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Turn a store file URL into a public one.
///
/// Contentful returns protocol-relative URLs (`//images.ctfassets.net/...`).
pub fn public_asset_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains("://") {
        raw.to_string()
    } else if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        format!("https://{raw}")
    }
}

// ---------------------------------------------------------------------------
// Captions and entries
// ---------------------------------------------------------------------------

/// Title/description pair derived from one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub title: String,
    pub description: String,
}

/// The domain half of a new artwork entry. Locale wrapping and the rich-text
/// document shape are the content-store client's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkDraft {
    /// Asset the entry links to.
    pub asset_id: String,
    pub title: String,
    pub category: String,
    /// Plain text; stored as a single rich-text paragraph.
    pub description: String,
    pub featured: bool,
}

/// Identity of a stored entry, as needed to publish it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    /// Entry id (`sys.id`).
    pub id: String,
    /// Current `sys.version`, required by the publish call.
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_relative_urls_get_https() {
        assert_eq!(
            public_asset_url("//images.ctfassets.net/space/abc/cat.png"),
            "https://images.ctfassets.net/space/abc/cat.png"
        );
    }

    #[test]
    fn absolute_and_empty_urls_are_kept() {
        assert_eq!(
            public_asset_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(public_asset_url(""), "");
    }

    #[test]
    fn asset_without_url_has_no_file() {
        let asset = Asset {
            id: "a1".into(),
            url: String::new(),
            file_name: String::new(),
            content_type: None,
            created_at: None,
        };
        assert!(!asset.has_file());
    }
}

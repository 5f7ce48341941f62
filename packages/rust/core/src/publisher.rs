//! Entry construction and create-then-publish.

use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use folio_shared::{ArtworkDraft, CaptionResult, EntryRef, FolioError, PublishDefaults, Result};

use crate::store::EntryStore;

/// Hex characters of the asset-id digest kept in a deterministic entry id.
const ENTRY_KEY_HEX_LEN: usize = 32;

/// Result of one publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Entry created and published.
    Published(EntryRef),
    /// An entry under the deterministic id already existed.
    AlreadyExists(String),
}

/// Combine a caption with the fixed publish defaults.
pub fn build_draft(defaults: &PublishDefaults, asset_id: &str, caption: CaptionResult) -> ArtworkDraft {
    ArtworkDraft {
        asset_id: asset_id.to_string(),
        title: caption.title,
        category: defaults.default_category.clone(),
        description: caption.description,
        featured: defaults.default_featured,
    }
}

/// Entry id derived from the asset id: `art-` + 32 hex chars of SHA-256.
///
/// Contentful ids allow `[A-Za-z0-9._-]{1,64}`.
pub fn entry_key(asset_id: &str) -> String {
    let digest = Sha256::digest(asset_id.as_bytes());
    let hex = format!("{digest:x}");
    format!("art-{}", &hex[..ENTRY_KEY_HEX_LEN])
}

/// Create the entry for `asset_id`, then publish it.
///
/// With `deterministic_ids`, the entry is created under [`entry_key`] and a
/// conflict reports [`PublishOutcome::AlreadyExists`] instead of failing.
/// If publishing fails after creation, the draft stays behind unpublished.
#[instrument(skip(store, defaults, caption))]
pub async fn publish_artwork<S: EntryStore>(
    store: &S,
    defaults: &PublishDefaults,
    asset_id: &str,
    caption: CaptionResult,
    deterministic_ids: bool,
) -> Result<PublishOutcome> {
    let draft = build_draft(defaults, asset_id, caption);
    let key = deterministic_ids.then(|| entry_key(asset_id));

    let created = match store.create_draft(defaults, &draft, key.as_deref()).await {
        Ok(entry) => entry,
        Err(FolioError::Conflict(id)) => return Ok(PublishOutcome::AlreadyExists(id)),
        Err(e) => return Err(e),
    };

    let published = store.publish(&created).await?;
    info!(entry_id = %published.id, title = %draft.title, "entry published");
    Ok(PublishOutcome::Published(published))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_uses_publish_defaults() {
        let caption = CaptionResult {
            title: "Moonlit Fox".into(),
            description: "A fox under a pale moon.".into(),
        };
        let draft = build_draft(&PublishDefaults::default(), "asset-1", caption);
        assert_eq!(draft.asset_id, "asset-1");
        assert_eq!(draft.title, "Moonlit Fox");
        assert_eq!(draft.category, "Uncategorized");
        assert_eq!(draft.description, "A fox under a pale moon.");
        assert!(!draft.featured);
    }

    #[test]
    fn entry_key_is_stable_and_valid() {
        let a = entry_key("5KsDBWseXY6QegucYAoacS");
        let b = entry_key("5KsDBWseXY6QegucYAoacS");
        assert_eq!(a, b);
        assert_eq!(a.len(), 4 + ENTRY_KEY_HEX_LEN);
        assert!(a.starts_with("art-"));
        assert!(a[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn entry_key_differs_per_asset() {
        assert_ne!(entry_key("asset-1"), entry_key("asset-2"));
    }
}

//! Seams between the ingestion pipeline and its remote collaborators.
//!
//! The pipeline is written against these traits; the Contentful and
//! captioning clients implement them here, and tests substitute in-memory
//! fakes.

use std::future::Future;

use folio_captioning::CaptionClient;
use folio_cms::ManagementClient;
use folio_shared::{ArtworkDraft, Asset, CaptionResult, EntryRef, PublishDefaults, Result};

/// Paged read access to stored media assets.
pub trait AssetSource: Sync {
    /// Fetch up to `limit` assets starting at offset `skip`.
    fn fetch_assets_page(
        &self,
        skip: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Asset>>> + Send;
}

/// Entry lookup and creation.
pub trait EntryStore: Sync {
    /// Entries of `content_type` whose image field links to `asset_id`.
    fn find_linked_entries(
        &self,
        content_type: &str,
        asset_id: &str,
    ) -> impl Future<Output = Result<Vec<EntryRef>>> + Send;

    /// Create an unpublished entry, optionally under a caller-chosen id.
    fn create_draft(
        &self,
        defaults: &PublishDefaults,
        draft: &ArtworkDraft,
        entry_id: Option<&str>,
    ) -> impl Future<Output = Result<EntryRef>> + Send;

    /// Publish a previously created entry.
    fn publish(&self, entry: &EntryRef) -> impl Future<Output = Result<EntryRef>> + Send;
}

/// Image → title/description generation.
pub trait Captioner: Sync {
    /// Title and description for the image at `image_url`.
    fn generate_caption(&self, image_url: &str)
    -> impl Future<Output = Result<CaptionResult>> + Send;
}

// ---------------------------------------------------------------------------
// Real backends
// ---------------------------------------------------------------------------

impl AssetSource for ManagementClient {
    async fn fetch_assets_page(&self, skip: usize, limit: usize) -> Result<Vec<Asset>> {
        self.list_assets(skip, limit).await
    }
}

impl EntryStore for ManagementClient {
    async fn find_linked_entries(&self, content_type: &str, asset_id: &str) -> Result<Vec<EntryRef>> {
        self.entries_linking_asset(content_type, asset_id).await
    }

    async fn create_draft(
        &self,
        defaults: &PublishDefaults,
        draft: &ArtworkDraft,
        entry_id: Option<&str>,
    ) -> Result<EntryRef> {
        self.create_entry(defaults, draft, entry_id).await
    }

    async fn publish(&self, entry: &EntryRef) -> Result<EntryRef> {
        self.publish_entry(entry).await
    }
}

impl Captioner for CaptionClient {
    async fn generate_caption(&self, image_url: &str) -> Result<CaptionResult> {
        self.caption(image_url).await
    }
}

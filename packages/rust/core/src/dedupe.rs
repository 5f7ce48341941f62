//! "Already processed?" check for a single asset.

use tracing::debug;

use folio_shared::Result;

use crate::store::EntryStore;

/// Whether any entry of `content_type` already links to `asset_id`.
///
/// This is a read-then-act check with no locking: two overlapping runs can
/// both see "absent" and both create an entry.
pub async fn entry_exists<S: EntryStore>(
    store: &S,
    content_type: &str,
    asset_id: &str,
) -> Result<bool> {
    let linked = store.find_linked_entries(content_type, asset_id).await?;
    debug!(asset_id, linked = linked.len(), "dedupe lookup");
    Ok(!linked.is_empty())
}

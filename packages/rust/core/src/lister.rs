//! Exhaustive asset listing via offset paging.

use tracing::{debug, info, instrument};

use folio_shared::{Asset, FolioError, Result};

use crate::store::AssetSource;

/// Fetch every asset, `page_size` at a time.
///
/// Paging stops at the first page shorter than `page_size`, so a total that
/// is an exact multiple of the page size costs one extra (empty) request.
/// Store errors propagate unchanged.
#[instrument(skip(source))]
pub async fn fetch_all_assets<S: AssetSource>(source: &S, page_size: usize) -> Result<Vec<Asset>> {
    if page_size == 0 {
        return Err(FolioError::validation("asset page size must be positive"));
    }

    let mut assets = Vec::new();
    let mut skip = 0;

    loop {
        let page = source.fetch_assets_page(skip, page_size).await?;
        let len = page.len();
        debug!(skip, len, "asset page");
        assets.extend(page);

        if len < page_size {
            break;
        }
        skip += page_size;
    }

    info!(total = assets.len(), "assets listed");
    Ok(assets)
}

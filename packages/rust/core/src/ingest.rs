//! Artwork backfill: assets → dedupe → caption → publish, one at a time.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use folio_shared::{AppConfig, Asset, PublishDefaults, Result};

use crate::dedupe;
use crate::lister;
use crate::publisher::{self, PublishOutcome};
use crate::store::{AssetSource, Captioner, EntryStore};

/// Runtime ingestion settings, resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Assets requested per listing page.
    pub page_size: usize,
    /// Pause after each asset that reached the captioner.
    pub item_delay: Duration,
    /// Create entries under ids derived from asset ids.
    pub deterministic_entry_ids: bool,
    /// List and dedupe only; no captioning, no writes.
    pub dry_run: bool,
    /// Field values and content type of new entries.
    pub publish: PublishDefaults,
}

impl From<&AppConfig> for IngestOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_size: config.ingest.page_size,
            item_delay: Duration::from_millis(config.ingest.item_delay_ms),
            deterministic_entry_ids: config.ingest.deterministic_entry_ids,
            dry_run: false,
            publish: config.publish.clone(),
        }
    }
}

/// What happened to one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// A new entry was created and published.
    Created { entry_id: String },
    /// An entry already links this asset.
    SkippedExisting,
    /// The asset has no file to caption.
    SkippedNoFile,
    /// Dry run: an entry would have been created.
    WouldCreate,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub total: usize,
    pub created: usize,
    pub skipped_existing: usize,
    pub skipped_no_file: usize,
    pub would_create: usize,
    pub elapsed: Duration,
}

/// Progress callback for ingestion.
pub trait IngestProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before an asset is examined (`current` is 1-based).
    fn asset_started(&self, asset: &Asset, current: usize, total: usize);
    /// Called once an asset's outcome is known.
    fn asset_finished(&self, asset: &Asset, outcome: &AssetOutcome);
}

/// No-op progress for headless/test usage.
pub struct SilentIngestProgress;

impl IngestProgress for SilentIngestProgress {
    fn phase(&self, _name: &str) {}
    fn asset_started(&self, _asset: &Asset, _current: usize, _total: usize) {}
    fn asset_finished(&self, _asset: &Asset, _outcome: &AssetOutcome) {}
}

/// Run the backfill.
///
/// 1. List every asset
/// 2. Per asset, in list order: skip if an entry links it, else caption,
///    create, publish, then wait `item_delay`
///
/// The first error that is not a handled rate limit aborts the run. Nothing
/// is checkpointed; a rerun starts again from the first asset and relies on
/// the dedupe check to skip finished work.
#[instrument(skip_all, fields(page_size = opts.page_size, dry_run = opts.dry_run))]
pub async fn run_ingest<S, C>(
    store: &S,
    captioner: &C,
    opts: &IngestOptions,
    progress: &dyn IngestProgress,
) -> Result<IngestSummary>
where
    S: AssetSource + EntryStore,
    C: Captioner,
{
    let start = Instant::now();

    progress.phase("Listing assets");
    let assets = lister::fetch_all_assets(store, opts.page_size).await?;

    let mut summary = IngestSummary {
        total: assets.len(),
        ..Default::default()
    };

    progress.phase("Processing assets");
    for (index, asset) in assets.iter().enumerate() {
        progress.asset_started(asset, index + 1, assets.len());

        let outcome = process_asset(store, captioner, opts, asset).await?;
        match &outcome {
            AssetOutcome::Created { .. } => summary.created += 1,
            AssetOutcome::SkippedExisting => summary.skipped_existing += 1,
            AssetOutcome::SkippedNoFile => summary.skipped_no_file += 1,
            AssetOutcome::WouldCreate => summary.would_create += 1,
        }
        progress.asset_finished(asset, &outcome);
    }

    summary.elapsed = start.elapsed();
    info!(
        total = summary.total,
        created = summary.created,
        skipped_existing = summary.skipped_existing,
        skipped_no_file = summary.skipped_no_file,
        "ingest complete"
    );

    Ok(summary)
}

async fn process_asset<S, C>(
    store: &S,
    captioner: &C,
    opts: &IngestOptions,
    asset: &Asset,
) -> Result<AssetOutcome>
where
    S: EntryStore,
    C: Captioner,
{
    if !asset.has_file() {
        warn!(asset_id = %asset.id, "asset has no file, skipping");
        return Ok(AssetOutcome::SkippedNoFile);
    }

    if dedupe::entry_exists(store, &opts.publish.content_type_id, &asset.id).await? {
        info!(asset_id = %asset.id, file = %asset.file_name, "skipped (already exists)");
        return Ok(AssetOutcome::SkippedExisting);
    }

    if opts.dry_run {
        info!(asset_id = %asset.id, file = %asset.file_name, "would create entry");
        return Ok(AssetOutcome::WouldCreate);
    }

    info!(asset_id = %asset.id, file = %asset.file_name, "creating new entry");
    let caption = captioner.generate_caption(&asset.url).await?;

    let published = publisher::publish_artwork(
        store,
        &opts.publish,
        &asset.id,
        caption,
        opts.deterministic_entry_ids,
    )
    .await?;

    let outcome = match published {
        PublishOutcome::Published(entry) => AssetOutcome::Created { entry_id: entry.id },
        PublishOutcome::AlreadyExists(entry_id) => {
            info!(asset_id = %asset.id, %entry_id, "skipped (entry id taken)");
            AssetOutcome::SkippedExisting
        }
    };

    tokio::time::sleep(opts.item_delay).await;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_default_config() {
        let opts = IngestOptions::from(&AppConfig::default());
        assert_eq!(opts.page_size, 100);
        assert_eq!(opts.item_delay, Duration::from_millis(2000));
        assert!(!opts.deterministic_entry_ids);
        assert!(!opts.dry_run);
        assert_eq!(opts.publish.content_type_id, "artwork");
    }

    #[test]
    fn summary_default_is_empty() {
        let summary = IngestSummary::default();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.created, 0);
        assert_eq!(summary.elapsed, Duration::ZERO);
    }
}

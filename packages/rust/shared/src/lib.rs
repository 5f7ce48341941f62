//! Shared types, error model, and configuration for Folio.
//!
//! This crate is the foundation depended on by all other Folio crates.
//! It provides:
//! - [`FolioError`]: the unified error type
//! - Domain types ([`Asset`], [`ArtworkDraft`], [`CaptionResult`], [`EntryRef`])
//! - Configuration ([`AppConfig`], [`PublishDefaults`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CaptioningConfig, ContactConfig, ContentStoreConfig, IngestConfig,
    PublishDefaults, config_dir, config_file_path, init_config, load_config, load_config_from,
    require_env,
};
pub use error::{FolioError, Result};
pub use types::{
    ArtworkDraft, Asset, CaptionResult, DEFAULT_DESCRIPTION, DEFAULT_TITLE, EntryRef,
    public_asset_url,
};

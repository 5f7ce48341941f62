//! Application configuration for Folio.
//!
//! User config lives at `~/.folio/folio.toml`. Every field has a default, so a
//! missing file (or a missing section) resolves to the built-in portfolio
//! settings. Secrets are never stored here; config only names the env vars
//! that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "folio.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".folio";

// ---------------------------------------------------------------------------
// Config structs (matching folio.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Contentful space and API endpoints.
    #[serde(default)]
    pub content_store: ContentStoreConfig,

    /// Captioning model settings.
    #[serde(default)]
    pub captioning: CaptioningConfig,

    /// Ingestion pacing.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Field defaults for newly published entries.
    #[serde(default)]
    pub publish: PublishDefaults,

    /// Contact form relay.
    #[serde(default)]
    pub contact: ContactConfig,
}

/// `[content_store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStoreConfig {
    /// Contentful space id.
    #[serde(default = "default_space_id")]
    pub space_id: String,

    /// Contentful environment id.
    #[serde(default = "default_environment_id")]
    pub environment_id: String,

    /// Management API base URL.
    #[serde(default = "default_management_base_url")]
    pub management_base_url: String,

    /// Delivery API base URL.
    #[serde(default = "default_delivery_base_url")]
    pub delivery_base_url: String,

    /// Name of the env var holding the management token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Name of the env var holding the delivery token.
    #[serde(default = "default_delivery_token_env")]
    pub delivery_token_env: String,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            space_id: default_space_id(),
            environment_id: default_environment_id(),
            management_base_url: default_management_base_url(),
            delivery_base_url: default_delivery_base_url(),
            access_token_env: default_access_token_env(),
            delivery_token_env: default_delivery_token_env(),
        }
    }
}

fn default_space_id() -> String {
    "x93bgogiqd3y".into()
}
fn default_environment_id() -> String {
    "master".into()
}
fn default_management_base_url() -> String {
    "https://api.contentful.com".into()
}
fn default_delivery_base_url() -> String {
    "https://cdn.contentful.com".into()
}
fn default_access_token_env() -> String {
    "CONTENTFUL_ACCESS_TOKEN".into()
}
fn default_delivery_token_env() -> String {
    "CONTENTFUL_DELIVERY_TOKEN".into()
}

/// `[captioning]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptioningConfig {
    /// Chat-completions API base URL (without `/chat/completions`).
    #[serde(default = "default_captioning_base_url")]
    pub base_url: String,

    /// Vision-capable model id.
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Delay used on 429 when the provider sends no usable hint.
    #[serde(default = "default_retry_delay_ms")]
    pub default_retry_delay_ms: u64,

    /// Cap on consecutive 429 retries. Unset means retry forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for CaptioningConfig {
    fn default() -> Self {
        Self {
            base_url: default_captioning_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            default_retry_delay_ms: default_retry_delay_ms(),
            max_rate_limit_retries: None,
        }
    }
}

fn default_captioning_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_retry_delay_ms() -> u64 {
    2000
}

/// `[ingest]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Assets requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pause after each processed asset.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Create entries under an id derived from the asset id instead of a
    /// store-assigned one.
    #[serde(default)]
    pub deterministic_entry_ids: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            item_delay_ms: default_item_delay_ms(),
            deterministic_entry_ids: false,
        }
    }
}

fn default_page_size() -> usize {
    100
}
fn default_item_delay_ms() -> u64 {
    2000
}

/// `[publish]` section: the fixed field values of every generated entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDefaults {
    /// Content type of the artwork entries.
    #[serde(default = "default_content_type_id")]
    pub content_type_id: String,

    /// Locale key every field value is stored under.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Category assigned to new entries.
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Featured flag assigned to new entries.
    #[serde(default)]
    pub default_featured: bool,
}

impl Default for PublishDefaults {
    fn default() -> Self {
        Self {
            content_type_id: default_content_type_id(),
            locale: default_locale(),
            default_category: default_category(),
            default_featured: false,
        }
    }
}

fn default_content_type_id() -> String {
    "artwork".into()
}
fn default_locale() -> String {
    "en-US".into()
}
fn default_category() -> String {
    "Uncategorized".into()
}

/// `[contact]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// EmailJS API base URL.
    #[serde(default = "default_contact_base_url")]
    pub base_url: String,

    /// Env var holding the EmailJS service id.
    #[serde(default = "default_service_id_env")]
    pub service_id_env: String,

    /// Env var holding the EmailJS template id.
    #[serde(default = "default_template_id_env")]
    pub template_id_env: String,

    /// Env var holding the EmailJS public key.
    #[serde(default = "default_public_key_env")]
    pub public_key_env: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            base_url: default_contact_base_url(),
            service_id_env: default_service_id_env(),
            template_id_env: default_template_id_env(),
            public_key_env: default_public_key_env(),
        }
    }
}

fn default_contact_base_url() -> String {
    "https://api.emailjs.com".into()
}
fn default_service_id_env() -> String {
    "EMAILJS_SERVICE_ID".into()
}
fn default_template_id_env() -> String {
    "EMAILJS_TEMPLATE_ID".into()
}
fn default_public_key_env() -> String {
    "EMAILJS_PUBLIC_KEY".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.folio/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| FolioError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.folio/folio.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FolioError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FolioError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FolioError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FolioError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a required secret from the env var named by config.
///
/// `what` is a human label used in the error ("Contentful management token").
pub fn require_env(var_name: &str, what: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(FolioError::config(format!(
            "{what} not found. Set the {var_name} environment variable."
        ))),
    }
}

//! CLI command definitions, routing, and tracing setup.

use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use folio_captioning::CaptionClient;
use folio_cms::{DeliveryClient, ManagementClient};
use folio_core::contact::{self, ContactMessage, ContactRelay};
use folio_core::gallery::{self, ALL_CATEGORIES};
use folio_core::ingest::{AssetOutcome, IngestOptions, IngestProgress, IngestSummary};
use folio_shared::{AppConfig, Asset, config_file_path, init_config, load_config, require_env};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Folio: portfolio content maintenance.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Backfill artwork entries from uploaded images and inspect the published gallery.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Create and publish an artwork entry for every asset that has none.
    Ingest {
        /// List and dedupe only; report what would be created.
        #[arg(long)]
        dry_run: bool,

        /// Create entries under ids derived from asset ids.
        #[arg(long)]
        deterministic_ids: bool,

        /// Give up after this many consecutive rate-limit retries.
        #[arg(long)]
        max_retries: Option<u32>,

        /// Pause between assets, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// List published artworks.
    Gallery {
        /// Only show this category.
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,

        /// Only show featured artworks.
        #[arg(long)]
        featured: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Send a message through the contact-form relay.
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "folio=info",
        1 => "folio=debug",
        _ => "folio=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest {
            dry_run,
            deterministic_ids,
            max_retries,
            delay_ms,
        } => cmd_ingest(dry_run, deterministic_ids, max_retries, delay_ms).await,
        Command::Gallery {
            category,
            featured,
            json,
        } => cmd_gallery(&category, featured, json).await,
        Command::Contact {
            name,
            email,
            message,
        } => {
            cmd_contact(ContactMessage {
                name,
                email,
                message,
            })
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

async fn cmd_ingest(
    dry_run: bool,
    deterministic_ids: bool,
    max_retries: Option<u32>,
    delay_ms: Option<u64>,
) -> Result<()> {
    let mut config = load_config()?;
    if max_retries.is_some() {
        config.captioning.max_rate_limit_retries = max_retries;
    }
    if let Some(ms) = delay_ms {
        config.ingest.item_delay_ms = ms;
    }
    if deterministic_ids {
        config.ingest.deterministic_entry_ids = true;
    }

    // Check credentials before doing anything
    let token = require_env(
        &config.content_store.access_token_env,
        "Contentful management token",
    )?;
    let store = ManagementClient::new(&config.content_store, &config.publish.locale, token)?;

    let api_key = if dry_run {
        std::env::var(&config.captioning.api_key_env).unwrap_or_default()
    } else {
        require_env(&config.captioning.api_key_env, "OpenAI API key")?
    };
    let captioner = CaptionClient::new(&config.captioning, api_key)?;

    let opts = IngestOptions {
        dry_run,
        ..IngestOptions::from(&config)
    };

    info!(
        space = %config.content_store.space_id,
        environment = %config.content_store.environment_id,
        content_type = %opts.publish.content_type_id,
        dry_run,
        "starting artwork ingest"
    );

    let reporter = CliProgress::new();
    let result = folio_core::ingest::run_ingest(&store, &captioner, &opts, &reporter).await;
    reporter.finish();
    let summary = result?;

    print_summary(&summary, dry_run);
    Ok(())
}

fn print_summary(summary: &IngestSummary, dry_run: bool) {
    println!();
    if dry_run {
        println!("  Dry run complete.");
        println!("  Would create: {}", summary.would_create);
    } else {
        println!("  Ingest complete.");
        println!("  Created:      {}", summary.created);
    }
    println!("  Skipped:      {}", summary.skipped_existing);
    println!("  No file:      {}", summary.skipped_no_file);
    println!("  Assets:       {}", summary.total);
    println!("  Time:         {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl IngestProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn asset_started(&self, asset: &Asset, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {}", asset.file_name));
    }

    fn asset_finished(&self, asset: &Asset, outcome: &AssetOutcome) {
        let line = match outcome {
            AssetOutcome::Created { entry_id } => {
                format!("+ created {entry_id} for {}", asset.file_name)
            }
            AssetOutcome::SkippedExisting => format!("- skipped (already exists): {}", asset.file_name),
            AssetOutcome::SkippedNoFile => format!("- skipped (no file): {}", asset.id),
            AssetOutcome::WouldCreate => format!("? would create: {}", asset.file_name),
        };
        self.spinner.println(line);
    }
}

// ---------------------------------------------------------------------------
// gallery
// ---------------------------------------------------------------------------

async fn cmd_gallery(category: &str, featured_only: bool, json: bool) -> Result<()> {
    let config = load_config()?;
    let token = require_env(
        &config.content_store.delivery_token_env,
        "Contentful delivery token",
    )?;
    let client = DeliveryClient::new(&config.content_store, token)?;

    let artworks = gallery::load_gallery(&client, &config.publish.content_type_id).await?;

    let mut shown = gallery::filter_by_category(&artworks, category);
    if featured_only {
        shown = gallery::featured(shown);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!();
    println!("  Categories: {}", gallery::categories(&artworks).join(", "));
    println!();
    for (index, artwork) in shown.iter().enumerate() {
        let marker = if artwork.featured { "*" } else { " " };
        println!(
            "  {marker} {:<32} {:<18} {}",
            gallery::display_title(artwork, index),
            artwork.category,
            artwork.src
        );
    }
    println!();
    println!("  {} of {} artworks", shown.len(), artworks.len());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// contact
// ---------------------------------------------------------------------------

async fn cmd_contact(msg: ContactMessage) -> Result<()> {
    let errors = contact::validate(&msg);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("  {}: {}", error.field, error.message);
        }
        return Err(eyre!("contact message is invalid"));
    }

    let config = load_config()?;
    let relay = ContactRelay::new(
        &config.contact,
        require_env(&config.contact.service_id_env, "EmailJS service id")?,
        require_env(&config.contact.template_id_env, "EmailJS template id")?,
        require_env(&config.contact.public_key_env, "EmailJS public key")?,
    )?;

    relay.send(&msg).await?;
    println!("  Message sent. Thank you!");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = config_file_path()?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    let created = init_config()?;
    println!("Created {}", created.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    println!("# {}", config_file_path()?.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

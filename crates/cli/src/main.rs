//! Go Marketplace CLI - Inspect and edit a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the persisted cart
//! gm-cli cart show
//!
//! # Add a product (or one more unit of it)
//! gm-cli cart add --id a --title "T-Shirt" --image-url https://img/a.png --price 10
//!
//! # Change quantities
//! gm-cli cart increment a
//! gm-cli cart decrement a
//!
//! # Seed the cart from a YAML item list
//! gm-cli seed items.yaml --clear
//! ```
//!
//! # Commands
//!
//! - `cart` - Show, add, increment, decrement, remove, clear
//! - `seed` - Add every item listed in a YAML file
//!
//! Every command waits for the cart to be written back to storage before
//! exiting.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use go_marketplace_cart::{CartStore, FileStore};
use go_marketplace_core::{CartItem, Price, ProductId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Go Marketplace CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the persisted cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Add every item listed in a YAML file to the cart
    Seed {
        /// Path to the YAML item list
        file: String,

        /// Empty the cart before seeding
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show every line in the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long)]
        image_url: String,

        /// Unit price (decimal, e.g. 19.99)
        #[arg(long)]
        price: Price,
    },
    /// Add one unit to a product already in the cart
    Increment {
        /// Product ID
        id: String,
    },
    /// Take one unit off a product, removing it at zero
    Decrement {
        /// Product ID
        id: String,
    },
    /// Remove a product regardless of quantity
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Directives used when `RUST_LOG` is not set. The binary's target is its
/// crate name, `gm_cli`, not the package name.
const DEFAULT_FILTER: &str = "gm_cli=info,go_marketplace_cart=info";

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Arc::new(FileStore::new(&config.storage_dir));
    let store = CartStore::open(storage, config.cart_store()).await;
    tracing::debug!(
        dir = %config.storage_dir.display(),
        key = %store.storage_key(),
        outcome = ?store.load_outcome(),
        "Opened cart"
    );

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store),
            CartAction::Add {
                id,
                title,
                image_url,
                price,
            } => commands::cart::add(
                &store,
                CartItem {
                    id: ProductId::new(id),
                    title,
                    image_url,
                    price,
                },
            )?,
            CartAction::Increment { id } => {
                commands::cart::increment(&store, &ProductId::new(id))?;
            }
            CartAction::Decrement { id } => {
                commands::cart::decrement(&store, &ProductId::new(id))?;
            }
            CartAction::Remove { id } => commands::cart::remove(&store, &ProductId::new(id))?,
            CartAction::Clear => commands::cart::clear(&store),
        },
        Commands::Seed { file, clear } => {
            commands::seed::cart_items(&store, &file, clear).await?;
        }
    }

    store.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;
    use go_marketplace_cart::{DEFAULT_CART_KEY, KeyValueStore};
    use go_marketplace_core::CartEntry;

    use super::*;

    fn test_config(dir: &tempfile::TempDir) -> CliConfig {
        CliConfig {
            storage_dir: dir.path().to_path_buf(),
            cart_key: DEFAULT_CART_KEY.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_filter_targets_this_binary() {
        let crate_directive = format!("{}=", env!("CARGO_CRATE_NAME"));
        assert!(DEFAULT_FILTER.starts_with(&crate_directive));
        assert!(DEFAULT_FILTER.contains("go_marketplace_cart="));
    }

    #[tokio::test]
    async fn test_run_add_persists_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let cli = Cli::try_parse_from([
            "gm-cli",
            "cart",
            "add",
            "--id",
            "a",
            "--title",
            "T",
            "--image-url",
            "u",
            "--price",
            "19.99",
        ])
        .unwrap();

        run(cli, &config).await.unwrap();

        let stored = FileStore::new(dir.path())
            .get(DEFAULT_CART_KEY)
            .await
            .unwrap()
            .unwrap();
        let entries: Vec<CartEntry> = serde_json::from_str(&stored).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().id.as_str(), "a");
        assert_eq!(entries.first().unwrap().price, Price::from_cents(1999));
    }

    #[tokio::test]
    async fn test_run_increment_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let cli = Cli::try_parse_from(["gm-cli", "cart", "increment", "nope"]).unwrap();

        let err = run(cli, &config).await.unwrap_err();
        assert!(err.to_string().contains("Cart entry not found: nope"));
        assert_eq!(
            FileStore::new(dir.path()).get(DEFAULT_CART_KEY).await.unwrap(),
            None
        );
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "gm-cli",
            "cart",
            "add",
            "--id",
            "a",
            "--title",
            "T",
            "--image-url",
            "u",
            "--price",
            "19.99",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add { price, .. }
            }) if price == Price::from_cents(1999)
        ));
    }

    #[test]
    fn test_parse_rejects_bad_price() {
        let cli = Cli::try_parse_from([
            "gm-cli",
            "cart",
            "add",
            "--id",
            "a",
            "--title",
            "T",
            "--image-url",
            "u",
            "--price",
            "cheap",
        ]);
        assert!(cli.is_err());
    }
}

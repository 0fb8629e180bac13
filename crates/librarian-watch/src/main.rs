use anyhow::{Context, Result};
use clap::Parser;
use librarian_config::{ConfigLoader, SharedSettings};
use librarian_watch::{LibraryReconciler, NotifyEventSource, TreeAction, TreeActionBatch};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Config file looked up in the vault when `--config` is not given.
const VAULT_CONFIG_FILE: &str = ".librarian.toml";

/// Watch a vault and print the library tree actions each bulk window produces.
#[derive(Debug, Parser)]
#[command(name = "librarian-watch", version, about)]
struct Cli {
    /// Vault directory to watch
    vault: PathBuf,

    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library root inside the vault, overriding the config
    #[arg(short, long)]
    root: Option<String>,

    /// Print batches as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load_or_default(cli.vault.join(VAULT_CONFIG_FILE))?,
    };
    if let Some(root) = cli.root {
        config.library.root = root;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    config.validate().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            config.logging.env_filter_directive(),
        ))
        .init();

    let source = Arc::new(NotifyEventSource::new(&cli.vault));
    let reconciler = LibraryReconciler::from_settings(source, SharedSettings::new(config))?;

    let json = cli.json;
    let subscription = reconciler
        .start(move |batch| print_batch(&batch, json))
        .with_context(|| format!("failed to watch {}", cli.vault.display()))?;

    info!("Watching {}; press Ctrl-C to stop", cli.vault.display());
    tokio::signal::ctrl_c().await?;

    subscription.unsubscribe();
    Ok(())
}

fn print_batch(batch: &TreeActionBatch, json: bool) {
    if json {
        match serde_json::to_string(batch) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to serialize batch {}: {}", batch.window_id, e),
        }
        return;
    }

    if batch.is_empty() {
        return;
    }
    println!(
        "window {} ({} events, {} roots)",
        batch.window_id, batch.debug.raw_count, batch.debug.root_count
    );
    for action in &batch.actions {
        match action {
            TreeAction::Create { target } | TreeAction::Delete { target } => {
                println!("  {:<6} {}", action.as_str(), target);
            }
            TreeAction::Rename {
                target,
                new_node_name,
            } => println!("  {:<6} {} -> {}", action.as_str(), target, new_node_name),
            TreeAction::Move {
                target,
                new_parent,
                new_node_name,
            } => println!(
                "  {:<6} {} -> {}/{}",
                action.as_str(),
                target,
                new_parent.chain.join("/"),
                new_node_name
            ),
        }
    }
}

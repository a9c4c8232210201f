use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use charisma_application::ConversationIndex;
use charisma_infrastructure::{CharismaPaths, ConfigService, FileKeyValueStore};

mod commands;

#[derive(Parser)]
#[command(name = "charisma")]
#[command(about = "Charisma CLI - local conversations and unread tracking", long_about = None)]
struct Cli {
    /// Store data and config under this directory instead of the platform defaults
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log engine activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity of this installation
    Whoami,
    /// Change the display name of this installation
    Rename { display_name: String },
    /// Manage the party directory
    Parties {
        #[command(subcommand)]
        action: PartiesAction,
    },
    /// Send a message from self
    Send {
        to: String,
        #[arg(required = true, num_args = 1..)]
        body: Vec<String>,
    },
    /// List conversations, most recent first
    Conversations,
    /// Show a conversation and mark it read
    Open { counterparty: String },
    /// Show a conversation without marking it read
    History { counterparty: String },
    /// Mark a conversation read
    Read { counterparty: String },
    /// Delete every message exchanged with a party
    Delete { counterparty: String },
    /// Show the total unread count
    Unread,
    /// Recompute conversations from the message log
    Rebuild,
    /// Check stored conversations against the message log
    Verify,
}

#[derive(Subcommand)]
enum PartiesAction {
    /// List known parties
    List,
    /// Register or update a party
    Add {
        id: String,
        display_name: String,
        #[arg(long, default_value = "")]
        handle: String,
    },
    /// Hide a party from listings
    Hide { id: String },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_index(data_dir: Option<PathBuf>) -> Result<ConversationIndex> {
    let paths = CharismaPaths::new(data_dir);
    let config = ConfigService::from_paths(&paths)?
        .get_config()
        .context("Failed to load configuration")?;
    let store_dir = paths.store_dir()?;
    let store = FileKeyValueStore::open(&store_dir)
        .await
        .with_context(|| format!("Failed to open store at {}", store_dir.display()))?;
    tracing::debug!("Using store at {}", store_dir.display());

    let index = ConversationIndex::open(Arc::new(store), config).await?;
    Ok(index)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let index = open_index(cli.data_dir).await?;

    match cli.command {
        Commands::Whoami => commands::identity::whoami(&index).await?,
        Commands::Rename { display_name } => {
            commands::identity::rename(&index, &display_name).await?
        }
        Commands::Parties { action } => match action {
            PartiesAction::List => commands::parties::list(&index).await?,
            PartiesAction::Add {
                id,
                display_name,
                handle,
            } => commands::parties::add(&index, id, display_name, handle).await?,
            PartiesAction::Hide { id } => commands::parties::hide(&index, &id).await?,
        },
        Commands::Send { to, body } => {
            commands::messages::send(&index, &to, &body.join(" ")).await?
        }
        Commands::Conversations => commands::conversations::list(&index).await?,
        Commands::Open { counterparty } => {
            commands::messages::open(&index, &counterparty).await?
        }
        Commands::History { counterparty } => {
            commands::messages::history(&index, &counterparty).await?
        }
        Commands::Read { counterparty } => {
            commands::messages::read(&index, &counterparty).await?
        }
        Commands::Delete { counterparty } => {
            commands::messages::delete(&index, &counterparty).await?
        }
        Commands::Unread => commands::conversations::unread(&index).await?,
        Commands::Rebuild => commands::conversations::rebuild(&index).await?,
        Commands::Verify => commands::conversations::verify(&index).await?,
    }

    Ok(())
}

//! keyhold operator binary.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyhold_common::Config;
use keyhold_core::{DbAccountDirectory, GpgKeyService};
use keyhold_db::repositories::{EmailAddressRepository, GpgKeyRepository, UserRepository};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "keyhold", version, about = "Manage OpenPGP public keys of accounts")]
struct Cli {
    /// Configuration file; defaults to `config/` plus `KEYHOLD__*` variables
    #[arg(long, short, env = "KEYHOLD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run pending database migrations
    Migrate,
    /// Register an armored public key for an account (`-` reads stdin)
    Import { owner: String, file: PathBuf },
    /// List the keys of an account
    List { owner: String },
    /// Show one key
    Show {
        id: String,
        /// Treat the argument as an OpenPGP key ID
        #[arg(long)]
        key_id: bool,
    },
    /// Delete a key on behalf of a user
    Delete { requestor: String, id: String },
}

fn read_armored(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading key from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    keyhold_common::telemetry::init(&config.logging)?;

    let db = keyhold_db::init(&config.database).await?;
    info!("Connected to database");

    if matches!(cli.command, Command::Migrate) {
        keyhold_db::migrate(&db).await?;
        info!("Migrations completed");
        return Ok(());
    }

    let db = Arc::new(db);
    let directory = DbAccountDirectory::new(
        UserRepository::new(Arc::clone(&db)),
        EmailAddressRepository::new(Arc::clone(&db)),
    );
    let service = GpgKeyService::new(
        GpgKeyRepository::new(Arc::clone(&db)),
        Arc::new(directory),
        config.keys.clone(),
    );

    match cli.command {
        Command::Migrate => {}
        Command::Import { owner, file } => {
            let armored = read_armored(&file)?;
            let record = service.add_key(&owner, &armored).await?;
            let view = service.view(&record).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::List { owner } => {
            let mut views = Vec::new();
            for record in service.list_keys(&owner).await? {
                views.push(service.view(&record).await?);
            }
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Command::Show { id, key_id } => {
            let record = if key_id {
                service.get_key_by_key_id(&id).await?
            } else {
                service.get_key(&id).await?
            };
            let view = service.view(&record).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Delete { requestor, id } => {
            service.delete_key(&requestor, &id).await?;
            info!(id = %id, "Delete finished");
        }
    }

    Ok(())
}

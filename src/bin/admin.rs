//! CLI administration tool for redirector.
//!
//! Talks to the management listener over HTTP, so it works against a
//! running server regardless of the storage backend.
//!
//! # Usage
//!
//! ```bash
//! # List all mappings
//! cargo run --bin redirector-admin -- ls
//!
//! # Add a permanent redirect
//! cargo run --bin redirector-admin -- add --key /old --dest /new --permanent
//!
//! # Back up and restore
//! cargo run --bin redirector-admin -- export --pretty > mappings.json
//! cargo run --bin redirector-admin -- import --file mappings.json --clear
//!
//! # Remove everything
//! cargo run --bin redirector-admin -- rm --all
//! ```
//!
//! # Environment Variables
//!
//! - `MGMT_LISTEN`: management address (default `127.0.0.1:9321`)

use redirector::api::dto::MappingDto;
use redirector::config::DEFAULT_MGMT_LISTEN;
use redirector::domain::entities::Mapping;
use redirector::infrastructure::management_client::ManagementClient;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::io::Read;
use std::path::PathBuf;

/// CLI tool for managing redirector mappings.
#[derive(Parser)]
#[command(name = "redirector-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Management listener address
    #[arg(long, global = true, env = "MGMT_LISTEN", default_value = DEFAULT_MGMT_LISTEN)]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all mappings
    Ls,

    /// Show store statistics
    Stats,

    /// Write all mappings to stdout as a JSON array
    Export {
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },

    /// Load mappings from a JSON array
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Delete all existing mappings first
        #[arg(long)]
        clear: bool,

        /// Comment for mappings that have none
        #[arg(long)]
        comment: Option<String>,
    },

    /// Add or replace one mapping
    Add {
        #[arg(short, long)]
        key: String,

        #[arg(short, long)]
        dest: String,

        /// Answer with 308 instead of 307
        #[arg(short, long)]
        permanent: bool,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Remove one mapping or all of them
    Rm(RmArgs),
}

#[derive(Args)]
struct RmArgs {
    /// Key to remove
    #[arg(short, long, conflicts_with = "all", required_unless_present = "all")]
    key: Option<String>,

    /// Remove every mapping
    #[arg(long)]
    all: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ManagementClient::new(&cli.addr)?;

    match cli.command {
        Commands::Ls => list_mappings(&client).await?,
        Commands::Stats => show_stats(&client).await?,
        Commands::Export { pretty } => export(&client, pretty).await?,
        Commands::Import {
            file,
            clear,
            comment,
        } => import(&client, file, clear, comment).await?,
        Commands::Add {
            key,
            dest,
            permanent,
            comment,
        } => {
            let dto = MappingDto {
                key,
                dest,
                perm: permanent,
                comment,
            };
            add(&client, dto).await?
        }
        Commands::Rm(args) => remove(&client, args).await?,
    }

    Ok(())
}

/// Prints mappings as a table.
///
/// ```text
/// KEY        DESTINATION              PERMANENT  COMMENT
/// /old       /new                     yes        moved
/// ```
async fn list_mappings(client: &ManagementClient) -> Result<()> {
    let mut mappings = client.list().await.context("Failed to list mappings")?;

    if mappings.is_empty() {
        println!("{}", "No mappings found".yellow());
        return Ok(());
    }

    mappings.sort_by(|a, b| a.key.cmp(&b.key));

    let key_width = column_width(mappings.iter().map(|m| m.key.as_str()), "KEY");
    let dest_width = column_width(mappings.iter().map(|m| m.dest.as_str()), "DESTINATION");

    println!(
        "{:<kw$}  {:<dw$}  {:<9}  {}",
        "KEY".bright_white().bold(),
        "DESTINATION".bright_white().bold(),
        "PERMANENT".bright_white().bold(),
        "COMMENT".bright_white().bold(),
        kw = key_width,
        dw = dest_width,
    );

    for mapping in &mappings {
        let permanent = if mapping.perm {
            "yes".green()
        } else {
            "no".bright_black()
        };

        println!(
            "{:<kw$}  {:<dw$}  {:<9}  {}",
            mapping.key.cyan(),
            mapping.dest,
            permanent,
            mapping.comment.as_deref().unwrap_or("").bright_black(),
            kw = key_width,
            dw = dest_width,
        );
    }

    println!();
    println!(
        "Total: {}",
        mappings.len().to_string().bright_white().bold()
    );

    Ok(())
}

async fn show_stats(client: &ManagementClient) -> Result<()> {
    let stats = client.stats().await.context("Failed to fetch stats")?;

    println!("{}", "Statistics".bright_blue().bold());
    println!();
    println!("  Status:     {}", stats.status.bright_green().bold());
    println!("  Version:    {}", stats.version);
    println!("  Uptime:     {}s", stats.uptime_seconds);
    println!(
        "  Mappings:   {}",
        stats.database.total_mappings.to_string().bright_green().bold()
    );
    println!("  Disk usage: {} bytes", stats.database.disk_usage);
    println!();

    Ok(())
}

async fn export(client: &ManagementClient, pretty: bool) -> Result<()> {
    let mappings = client.list().await.context("Failed to list mappings")?;

    let json = if pretty {
        serde_json::to_string_pretty(&mappings)?
    } else {
        serde_json::to_string(&mappings)?
    };
    println!("{}", json);

    Ok(())
}

async fn import(
    client: &ManagementClient,
    file: Option<PathBuf>,
    clear: bool,
    comment: Option<String>,
) -> Result<()> {
    let raw = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let mappings = prepare_import(&raw, comment.as_deref())?;

    if clear {
        client
            .delete_all()
            .await
            .context("Failed to delete existing mappings")?;
        println!("{}", "Deleted existing mappings".yellow());
    }

    client
        .add(&mappings)
        .await
        .context("Failed to import mappings")?;

    println!(
        "{} {} mappings",
        "Imported".green().bold(),
        mappings.len().to_string().bright_white().bold()
    );

    Ok(())
}

/// Parses and checks an import document before anything is sent.
fn prepare_import(raw: &str, comment: Option<&str>) -> Result<Vec<MappingDto>> {
    let mut mappings: Vec<MappingDto> =
        serde_json::from_str(raw).context("Input is not a JSON array of mappings")?;

    if mappings.is_empty() {
        bail!("Input contains no mappings");
    }

    for (i, dto) in mappings.iter_mut().enumerate() {
        if let Some(comment) = comment
            && dto.comment.as_deref().unwrap_or("").is_empty()
        {
            dto.comment = Some(comment.to_string());
        }

        Mapping::from(dto.clone())
            .validated()
            .with_context(|| format!("Mapping {} is invalid", i + 1))?;
    }

    Ok(mappings)
}

async fn add(client: &ManagementClient, dto: MappingDto) -> Result<()> {
    let mapping = Mapping::from(dto.clone())
        .validated()
        .context("Invalid mapping")?;

    client
        .add(std::slice::from_ref(&dto))
        .await
        .context("Failed to add mapping")?;

    let mut kind = if mapping.permanent { "308" } else { "307" }.to_string();
    if mapping.is_template {
        kind.push_str(", template");
    }
    println!(
        "{} {} -> {} ({})",
        "Added".green().bold(),
        mapping.key.cyan(),
        mapping.destination,
        kind.bright_black()
    );

    Ok(())
}

async fn remove(client: &ManagementClient, args: RmArgs) -> Result<()> {
    let prompt = match &args.key {
        Some(key) => format!("Remove mapping {}?", key),
        None => "Remove ALL mappings?".to_string(),
    };

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    match args.key {
        Some(key) => {
            client
                .delete(&key)
                .await
                .with_context(|| format!("Failed to remove {}", key))?;
            println!("{} {}", "Removed".green().bold(), key.cyan());
        }
        None => {
            client
                .delete_all()
                .await
                .context("Failed to remove mappings")?;
            println!("{}", "Removed all mappings".green().bold());
        }
    }

    Ok(())
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

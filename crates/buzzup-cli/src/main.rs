//! buzzup: upload files to BuzzHeavier from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};

use buzzup_cli::{init_tracing, listing, progress::ProgressRenderer, settings::Settings};
use buzzup_client::UploadBatch;
use buzzup_core::{ClientConfig, FileItem};

#[derive(Parser)]
#[command(name = "buzzup", about = "Upload files to BuzzHeavier from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more files and print their shareable links
    Upload {
        /// Files to upload, in the order they should be processed
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Target directory ID on the service
        #[arg(long)]
        parent_id: Option<String>,
        /// Storage location ID
        #[arg(long)]
        location_id: Option<String>,
        /// Note attached to every uploaded file
        #[arg(long)]
        note: Option<String>,
        /// Maximum simultaneous transfers
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// List a local directory the way the picker orders it
    Ls {
        /// Directory to list (defaults to the current directory)
        path: Option<PathBuf>,
        /// Only show entries whose name contains this substring
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current settings
    Show,
    /// Set one or more settings
    Set {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        parent_id: Option<String>,
        #[arg(long)]
        location_id: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Upload {
            files,
            parent_id,
            location_id,
            note,
            concurrency,
        } => run_upload(files, parent_id, location_id, note, concurrency).await,
        Commands::Ls { path, filter } => run_ls(path, filter),
        Commands::Config { command } => run_config(command),
    }
}

async fn run_upload(
    files: Vec<PathBuf>,
    parent_id: Option<String>,
    location_id: Option<String>,
    note: Option<String>,
    concurrency: Option<usize>,
) -> Result<()> {
    let settings = Settings::load()?;
    let mut config = settings.upload_config();
    if let Some(parent) = parent_id {
        config.parent_directory_id = Some(parent);
    }
    if let Some(location) = location_id {
        config.location_id = Some(location);
    }
    if let Some(note) = note {
        config.notes = Some(note);
    }

    let mut client_config = ClientConfig::from_env()?;
    if let Some(limit) = concurrency {
        client_config.max_concurrent = limit.max(1);
    }

    let mut items = Vec::new();
    for path in files {
        let item = FileItem::from_path(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        ensure!(
            !item.is_directory,
            "{} is a directory; only files can be uploaded",
            path.display()
        );
        items.push(item);
    }

    let renderer = ProgressRenderer::new(&items);
    let batch = Arc::new(UploadBatch::new(items, config, client_config));
    let events = batch.subscribe();

    // Ctrl-C cancels the batch; in-flight and pending tasks settle as failed.
    let interrupt_batch = Arc::clone(&batch);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt_batch.cancel();
        }
    });

    let render_task = tokio::spawn(renderer.run(events));
    let result = match batch.run().await {
        Ok(result) => {
            // The renderer stops on its own once BatchComplete arrives.
            let _ = render_task.await;
            result
        }
        Err(err) => {
            render_task.abort();
            return Err(err.into());
        }
    };

    println!();
    println!(
        "{} succeeded, {} failed",
        result.success_count, result.failure_count
    );
    if !result.shareable_text.is_empty() {
        println!();
        println!("{}", result.shareable_text);
    }
    for task in result.tasks.iter().filter(|t| t.error_message.is_some()) {
        eprintln!(
            "{}: {}",
            task.file.name,
            task.error_message.as_deref().unwrap_or("failed")
        );
    }
    if result.failure_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_ls(path: Option<PathBuf>, filter: Option<String>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from("."));
    let items = listing::list_directory(&path, filter.as_deref())?;
    for item in &items {
        println!(
            "{:<4} {:>10}  {}",
            if item.is_directory { "dir" } else { "file" },
            item.human_size(),
            item.name
        );
    }
    Ok(())
}

fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            println!(
                "api_key: {}",
                if settings.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!(
                "parent_directory_id: {}",
                settings.parent_directory_id.as_deref().unwrap_or("(not set)")
            );
            println!(
                "location_id: {}",
                settings.location_id.as_deref().unwrap_or("(not set)")
            );
            println!("notes: {}", settings.notes.as_deref().unwrap_or("(not set)"));
            println!("file: {}", Settings::path()?.display());
        }
        ConfigCommands::Set {
            api_key,
            parent_id,
            location_id,
            note,
        } => {
            let mut settings = Settings::load()?;
            if let Some(key) = api_key {
                settings.api_key = Some(key);
            }
            if let Some(parent) = parent_id {
                settings.parent_directory_id = Some(parent);
            }
            if let Some(location) = location_id {
                settings.location_id = Some(location);
            }
            if let Some(note) = note {
                settings.notes = Some(note);
            }
            settings.save()?;
            println!("Settings saved to {}", Settings::path()?.display());
        }
    }
    Ok(())
}

mod error;
mod project;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::project::{Project, TrackOutcome};

#[derive(Parser)]
#[command(name = "aether", version, about = "Aether - a distributed Blender render manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an aether project in the current directory
    Init,
    /// Add a .blend file to the tracked files
    Add {
        /// A .blend file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("Could not read current directory")?;

    match cli.command {
        Commands::Init => {
            Project::init(&root).await?;
            println!("Initialized aether project in {}", root.display());
        }
        Commands::Add { file } => {
            let project = Project::open(&root).await?;
            match project.track(&file).await? {
                TrackOutcome::Added => println!("Tracking file {}", file.display()),
                TrackOutcome::Updated => println!("Updated file {}", file.display()),
                TrackOutcome::Unchanged => println!("File {} is unchanged", file.display()),
            }
        }
    }
    Ok(())
}

// src/main.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use release_enricher::application::commands::*;
use release_enricher::config::EnricherConfig;
use release_enricher::document::HostRelease;
use release_enricher::AppState;

#[derive(Parser)]
#[command(name = "release-enricher")]
#[command(about = "Enrich release listings with thumbnails, AniList ratings and favorites", long_about = None)]
struct Cli {
    /// JSON config file (defaults apply to anything it leaves out)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config and the default location
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load releases into a page, enrich them and print the page
    Enrich {
        /// JSON array of releases
        releases: PathBuf,
        /// Rows inserted per host update
        #[arg(short, long, default_value_t = 20)]
        batch_size: usize,
        /// Pause between host updates in milliseconds
        #[arg(short = 'i', long, default_value_t = 100)]
        batch_interval_ms: u64,
    },
    /// Toggle a title's favorite state
    Favorite { title: String },
    /// List favorites
    Favorites,
    /// Remove every favorite
    ClearFavorites {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
    /// Set the thumbnail size (64, 128, 256, or any "<n>px")
    SetSize { size: String },
    /// Set the row padding (empty to disable)
    SetPadding { padding: String },
    /// Show stored preferences
    Preferences,
    /// Resolve one title's rating
    Rating {
        title: String,
        /// Skip the cache and fetch from AniList
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    );
    clog.init();

    let mut config = match &cli.config {
        Some(path) => EnricherConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EnricherConfig::default(),
    };
    if let Some(database) = cli.database {
        config.database_path = Some(database);
    }

    let state = AppState::open(config).context("opening application state")?;

    match cli.command {
        Commands::Enrich {
            releases,
            batch_size,
            batch_interval_ms,
        } => {
            let body = std::fs::read_to_string(&releases)
                .with_context(|| format!("reading {}", releases.display()))?;
            let releases: Vec<HostRelease> =
                serde_json::from_str(&body).context("parsing releases")?;

            let report = enrich_releases(
                &state,
                &releases,
                batch_size,
                Duration::from_millis(batch_interval_ms),
            )
            .await?;
            println!("{}", report.html);
        }
        Commands::Favorite { title } => {
            let toggled = toggle_favorite(&state, &title)?;
            let verb = if toggled.is_favorite { "Added" } else { "Removed" };
            println!("{} '{}'", verb, toggled.key);
        }
        Commands::Favorites => {
            println!("{}", serde_json::to_string_pretty(&list_favorites(&state))?);
        }
        Commands::ClearFavorites { yes } => {
            let removed = clear_favorites(&state, yes)?;
            println!("Removed {} favorite(s)", removed);
        }
        Commands::SetSize { size } => {
            let stored = set_image_size(&state, &size)?;
            println!("{} = {}", stored.name, stored.value);
        }
        Commands::SetPadding { padding } => {
            let stored = set_padding(&state, &padding)?;
            println!("{} = {:?}", stored.name, stored.value);
        }
        Commands::Preferences => {
            println!("{}", serde_json::to_string_pretty(&get_preferences(&state))?);
        }
        Commands::Rating { title, force } => {
            let rating = get_rating(&state, &title, force).await?;
            println!("{}", serde_json::to_string_pretty(&rating)?);
        }
    }

    Ok(())
}

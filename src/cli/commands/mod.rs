//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod browse;
mod catalog;
mod prefs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use anidex::client::{CatalogService, FetchClient};
use anidex::config::{Config, LoadOptions};
use anidex::preferences::{JsonFileStore, PreferenceStore};
use anidex::session::BrowseSession;
use anidex::store::AnimeStore;
use anidex::throttle::NavigationThrottle;

#[derive(Parser)]
#[command(name = "anidex")]
#[command(about = "Search and browse the anime catalog without tripping its rate limit")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Search titles by name
    Search {
        /// Search text (search syntax characters are stripped)
        query: String,
        /// Page of results to show
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show the top-ranked titles
    Top {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show details for a title
    Show {
        /// MyAnimeList id
        id: u64,
        /// Also list recommendations
        #[arg(short, long)]
        recommendations: bool,
    },

    /// List recommendations for a title
    Recommend {
        /// MyAnimeList id
        id: u64,
    },

    /// Mark a title as liked
    Like {
        /// MyAnimeList id
        id: u64,
    },

    /// Mark a title as disliked
    Dislike {
        /// MyAnimeList id
        id: u64,
    },

    /// List liked and disliked titles
    Prefs,

    /// Suggest unrated titles from the top listing
    Suggest {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Interactive browsing session
    Browse {
        /// Initial search (top listing if omitted)
        query: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

/// Everything a command needs, built once from config.
pub(crate) struct AppContext {
    pub config: Config,
    pub options: LoadOptions,
    pub session: BrowseSession,
}

impl AppContext {
    fn build(config: Config, options: LoadOptions) -> anyhow::Result<Self> {
        let client = FetchClient::with_user_agent(
            config.request_timeout(),
            config.retry_policy(),
            config.api.user_agent.as_deref(),
        )?;
        let service = CatalogService::new(client, config.api.base_url.clone())
            .with_page_size(config.api.page_size);
        let throttle = NavigationThrottle::with_config(config.throttle_config());
        let session = BrowseSession::new(AnimeStore::new(service), throttle);

        Ok(Self {
            config,
            options,
            session,
        })
    }

    pub fn preferences(&self) -> PreferenceStore<JsonFileStore> {
        PreferenceStore::load(JsonFileStore::new(
            self.config.preferences_path(&self.options),
        ))
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
    };
    let config = Config::load(&options).await?;
    let ctx = AppContext::build(config, options)?;

    match cli.command {
        Commands::Search { query, page } => catalog::cmd_search(&ctx, &query, page).await,
        Commands::Top { page } => catalog::cmd_top(&ctx, page).await,
        Commands::Show {
            id,
            recommendations,
        } => catalog::cmd_show(&ctx, id, recommendations).await,
        Commands::Recommend { id } => catalog::cmd_recommend(&ctx, id).await,
        Commands::Like { id } => prefs::cmd_like(&ctx, id).await,
        Commands::Dislike { id } => prefs::cmd_dislike(&ctx, id).await,
        Commands::Prefs => prefs::cmd_prefs(&ctx),
        Commands::Suggest { page } => prefs::cmd_suggest(&ctx, page).await,
        Commands::Browse { query } => browse::cmd_browse(&ctx, query).await,
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&ctx.config)?);
            Ok(())
        }
    }
}

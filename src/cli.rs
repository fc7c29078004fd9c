use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metaforged")]
#[command(author, version, about = "Actor and movie metadata aggregation tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Actor metadata lookups and searches
    Actor {
        #[command(subcommand)]
        action: LookupCommand,
    },

    /// Movie metadata lookups and searches
    Movie {
        #[command(subcommand)]
        action: LookupCommand,
    },

    /// List registered providers
    Providers,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
pub enum LookupCommand {
    /// Fetch a record by provider name and id
    Info {
        /// Provider name (case-insensitive)
        provider: String,

        /// Provider-specific id
        id: String,

        /// Skip the local store and always fetch
        #[arg(long)]
        refresh: bool,
    },

    /// Fetch a record from a provider page URL
    Url {
        url: String,

        /// Skip the local store and always fetch
        #[arg(long)]
        refresh: bool,
    },

    /// Search one provider, or every provider when none is given
    Search {
        keyword: String,

        /// Only search this provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Skip the local store and always query the provider
        #[arg(long)]
        refresh: bool,
    },
}

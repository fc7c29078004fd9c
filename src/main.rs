mod cli;

use metaforged::config;
use metaforged::metadata::{Engine, Entity, MetadataService};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, LookupCommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            // Verbose mode: trace for metaforged crates
            "metaforged=trace,metaforged_db=trace,metaforged_common=trace".to_string()
        } else {
            "metaforged=info,metaforged_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Actor { action } => {
            let engine = open_engine(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_lookup(engine.actors(), action))
        }
        Commands::Movie { action } => {
            let engine = open_engine(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_lookup(engine.movies(), action))
        }
        Commands::Providers => {
            let engine = open_engine(cli.config.as_deref())?;
            list_providers(engine.actors());
            list_providers(engine.movies());
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("metaforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_engine(config_path: Option<&std::path::Path>) -> Result<Engine> {
    let config = config::load_config_or_default(config_path)?;
    tracing::debug!("Opening database at {}", config.database.path);
    Engine::from_config(&config)
}

async fn run_lookup<E: Entity>(service: &MetadataService<E>, action: LookupCommand) -> Result<()> {
    match action {
        LookupCommand::Info {
            provider,
            id,
            refresh,
        } => {
            let info = service.get_info_by_id(&provider, &id, !refresh).await?;
            print_json(&info)
        }
        LookupCommand::Url { url, refresh } => {
            let info = service.get_info_by_url(&url, !refresh).await?;
            print_json(&info)
        }
        LookupCommand::Search {
            keyword,
            provider: Some(provider),
            refresh,
        } => {
            let results = service.search(&keyword, &provider, !refresh).await?;
            print_json(&results)
        }
        LookupCommand::Search {
            keyword,
            provider: None,
            refresh,
        } => {
            if refresh {
                tracing::warn!("--refresh only applies to single-provider searches");
            }

            // Ctrl-C stops waiting on slow providers; finished results are kept.
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let results = service.search_all_with(&keyword, cancel).await?;
            print_json(&results)
        }
    }
}

fn list_providers<E: Entity>(service: &MetadataService<E>) {
    for provider in service.providers() {
        let mut capabilities = Vec::new();
        if provider.id_fetcher().is_some() {
            capabilities.push("id");
        }
        if provider.url_fetcher().is_some() {
            capabilities.push("url");
        }
        if provider.searcher().is_some() {
            capabilities.push("search");
        }

        print!("{:<6} {:<20} {}", E::KIND, provider.name(), provider.url());
        print!("  [{}]", capabilities.join(", "));
        if let Some(searcher) = provider.searcher() {
            print!(" priority {}", searcher.priority());
        }
        if provider.is_identity_provider() {
            print!(" (identity)");
        }
        println!();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json_str = serde_json::to_string_pretty(value)?;
    println!("{}", json_str);
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Database: {}", config.database.path);
            println!(
                "  Timeouts: request {}s, search {}s",
                config.engine.request_timeout_secs, config.engine.search_timeout_secs
            );
            println!("  Providers: {}", config.providers.len());
            for provider in &config.providers {
                println!(
                    "    {} {} ({:?}) {}",
                    provider.kind, provider.name, provider.provider_type, provider.url
                );
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Database: {}", config.database.path);
        }
    }

    Ok(())
}

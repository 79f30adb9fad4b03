//! Ferry CLI - Command line interface for Ferry
//!
//! Moves issues between GitHub repositories together with their Zenhub
//! board data, and exposes the underlying paginated client.

mod commands;

use clap::{Parser, Subcommand};
use ferry_core::{Config, Secrets};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CommitsArgs, FetchArgs, MigrateArgs, SecretsArgs};

/// Ferry: copy issues, comments and board data between repositories
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Migrate issues from one repository to another
    #[command(visible_alias = "m")]
    Migrate(MigrateArgs),

    /// Fetch every page of an API list endpoint and print it as JSON
    Fetch(FetchArgs),

    /// Count commits in one or more repositories
    Commits(CommitsArgs),

    /// Show current configuration
    Config,

    /// Manage the secrets file
    Secrets(SecretsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output can be piped
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("ferry {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Migrate(args)) => {
            args.execute().await?;
        }
        Some(Commands::Fetch(args)) => {
            args.execute().await?;
        }
        Some(Commands::Commits(args)) => {
            args.execute().await?;
        }
        Some(Commands::Config) => {
            let config = Config::load()?.with_env_overrides();
            print_config(&config);
        }
        Some(Commands::Secrets(args)) => {
            args.execute()?;
        }
        None => {
            println!("Ferry - issue migration between GitHub repositories");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    let repo = |org: &str, repo: &str| {
        if org.is_empty() || repo.is_empty() {
            "(not set)".to_string()
        } else {
            format!("{}/{}", org, repo)
        }
    };
    let board = |id: Option<u64>| id.map_or("(none)".to_string(), |id| id.to_string());

    println!("Ferry Configuration");
    println!("===================");
    println!();
    println!("Repositories:");
    println!(
        "  source: {} (zenhub: {})",
        repo(&config.source.org, &config.source.repo),
        board(config.source.zenhub_repo_id)
    );
    println!(
        "  target: {} (zenhub: {})",
        repo(&config.target.org, &config.target.repo),
        board(config.target.zenhub_repo_id)
    );
    println!();
    println!("APIs:");
    println!("  github: {}", config.github.api_url);
    println!("  web: {}", config.github.web_url);
    println!("  zenhub: {}", config.zenhub.api_url);
    println!();
    println!("HTTP:");
    println!("  timeout: {:?}", config.http.timeout);
    println!("  max_attempts: {}", config.http.max_attempts);
    println!("  retry_delay: {:?}", config.http.retry_delay);
    println!("  rate_limit_margin: {:?}", config.http.rate_limit_margin);
    println!("  per_page: {}", config.http.per_page);
    println!();
    let migration = &config.migration;
    println!("Migration:");
    println!("  patch_source: {}", migration.patch_source);
    println!("  secondary_metadata: {}", migration.secondary_metadata);
    println!("  include_closed: {}", migration.include_closed);
    println!("  exclude_labels: {:?}", migration.exclude_labels);
    println!("  default_pipeline: {}", migration.default_pipeline);
    for (from, to) in &migration.pipeline_overrides {
        println!("  pipeline: {} -> {}", from, to);
    }
    if let Some(path) = &migration.mapping_file {
        println!("  mapping_file: {}", path.display());
    }
    println!();

    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }

    // Report presence only, never the tokens
    match Secrets::load() {
        Ok(secrets) => {
            let state = |token: Option<String>| if token.is_some() { "set" } else { "missing" };
            println!("GitHub token: {}", state(secrets.github_token()));
            println!("Zenhub token: {}", state(secrets.zenhub_token()));
        }
        Err(e) => println!("Secrets: {}", e),
    }
}

mod products;
mod scrape;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Track product prices across online storefronts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape tracked products (or the given URLs) and record their prices
    Scrape {
        /// Scrape only these URLs instead of every active product
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// Print results without writing price history
        #[arg(long)]
        dry_run: bool,
    },
    /// Start tracking a product URL
    Add { url: String },
    /// Show recorded prices for a product, newest first
    History {
        url: String,

        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pricewatch_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Scrape { urls, dry_run } => scrape::run_scrape(&config, urls, dry_run).await,
        Commands::Add { url } => products::run_add(&config, &url).await,
        Commands::History { url, limit } => products::run_history(&config, &url, limit).await,
        Commands::Db { command } => {
            let pool = products::connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = pricewatch_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    pricewatch_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;

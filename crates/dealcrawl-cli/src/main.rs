mod commands;
mod dump;
mod history;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dealcrawl_core::AppConfig;
use tracing_subscriber::EnvFilter;

use report::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "dealcrawl")]
#[command(about = "Find the cheapest prices for products across online stores")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand. Unset flags fall back to the
/// environment-driven [`AppConfig`].
#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to the products file
    #[arg(long, global = true, env = "DEAL_CRAWLER_PRODUCTS_FILE")]
    products_file: Option<PathBuf>,

    /// Path to the shipping rules file
    #[arg(long, global = true, env = "DEAL_CRAWLER_SHIPPING_FILE")]
    shipping_file: Option<PathBuf>,

    /// Bypass the on-disk HTTP cache
    #[arg(long, global = true, env = "DEAL_CRAWLER_NO_CACHE")]
    no_cache: bool,

    /// HTTP cache lifetime in seconds
    #[arg(long, global = true, env = "DEAL_CRAWLER_CACHE_DURATION")]
    cache_duration: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "DEAL_CRAWLER_REQUEST_TIMEOUT")]
    request_timeout: Option<u64>,

    /// Log progress for every product and URL
    #[arg(long, global = true, env = "DEAL_CRAWLER_VERBOSE")]
    verbose: bool,
}

impl GlobalArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.products_file {
            config.products_path.clone_from(path);
        }
        if let Some(path) = &self.shipping_file {
            config.shipping_path.clone_from(path);
        }
        if let Some(secs) = self.cache_duration {
            config.cache_duration_secs = secs;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout_secs = secs;
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the best price found for each configured product
    Prices {
        /// Only check URLs on these site domains (comma-separated)
        #[arg(long, value_delimiter = ',', env = "DEAL_CRAWLER_SITES")]
        sites: Vec<String>,

        /// Only check products whose name contains one of these (comma-separated)
        #[arg(long, value_delimiter = ',', env = "DEAL_CRAWLER_PRODUCTS")]
        products: Vec<String>,

        /// Show every size instead of the best-value size per product
        #[arg(long, env = "DEAL_CRAWLER_ALL_SIZES")]
        all_sizes: bool,

        /// Render the report as markdown
        #[arg(long, env = "DEAL_CRAWLER_MARKDOWN")]
        markdown: bool,

        /// Write the results to this CSV file
        #[arg(long, env = "DEAL_CRAWLER_DUMP")]
        dump: Option<PathBuf>,
    },
    /// Compute the cheapest way to buy a set of products across stores
    Plan {
        /// Products to buy, matched by name substring (comma-separated)
        #[arg(long, value_delimiter = ',', required = true, env = "DEAL_CRAWLER_PLAN")]
        products: Vec<String>,

        /// Only consider URLs on these site domains (comma-separated)
        #[arg(long, value_delimiter = ',', env = "DEAL_CRAWLER_SITES")]
        sites: Vec<String>,

        /// Minimize price per 100 ml instead of total cost
        #[arg(long, env = "DEAL_CRAWLER_OPTIMIZE_FOR_VALUE")]
        optimize_for_value: bool,

        /// Render the plan as markdown
        #[arg(long, env = "DEAL_CRAWLER_MARKDOWN")]
        markdown: bool,

        /// Write the plan to this CSV file
        #[arg(long, env = "DEAL_CRAWLER_DUMP")]
        dump: Option<PathBuf>,
    },
    /// Score today's prices against the dumped price history
    Analyze {
        /// Directory of `YYYY-MM-DD.csv` dumps written by `prices --dump`
        #[arg(long, default_value = "history", env = "DEAL_CRAWLER_HISTORY_DIR")]
        history_dir: PathBuf,

        /// Render the table as markdown
        #[arg(long, env = "DEAL_CRAWLER_MARKDOWN")]
        markdown: bool,
    },
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads `.env` first so clap's env fallbacks see those values too.
    let mut config = dealcrawl_core::load_app_config().context("failed to load configuration")?;
    let cli = Cli::parse();
    cli.global.apply(&mut config);
    init_tracing(&config)?;

    let no_cache = cli.global.no_cache;
    match cli.command {
        Commands::Prices {
            sites,
            products,
            all_sizes,
            markdown,
            dump,
        } => {
            commands::run_prices(
                &config,
                &commands::PricesOptions {
                    sites,
                    products,
                    all_sizes,
                    no_cache,
                    format: OutputFormat::from_markdown_flag(markdown),
                    dump,
                },
            )
            .await?;
        }
        Commands::Plan {
            products,
            sites,
            optimize_for_value,
            markdown,
            dump,
        } => {
            commands::run_plan(
                &config,
                &commands::PlanOptions {
                    products,
                    sites,
                    optimize_for_value,
                    no_cache,
                    format: OutputFormat::from_markdown_flag(markdown),
                    dump,
                },
            )
            .await?;
        }
        Commands::Analyze {
            history_dir,
            markdown,
        } => {
            let today = chrono::Local::now().date_naive();
            commands::run_analyze(&history_dir, today, OutputFormat::from_markdown_flag(markdown))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;

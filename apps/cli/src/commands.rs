//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use valleydocs_core::{ProgressReporter, ScrapeResult};
use valleydocs_crawler::HttpPageSource;
use valleydocs_shared::{
    AppConfig, ContentMode, IconMode, ScrapeConfig, init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// valleydocs: turn The Living Valley docs into structured game data.
#[derive(Parser)]
#[command(
    name = "valleydocs",
    version,
    about = "Scrape The Living Valley documentation into structured records and transcripts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl the site and write records, transcripts and logs.
    Scrape(ScrapeArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `scrape`. Each one overrides the matching config file value.
#[derive(clap::Args)]
pub(crate) struct ScrapeArgs {
    /// Config file to use instead of ~/.valleydocs/valleydocs.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Site base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Entry page path (repeatable). Replaces the configured entry pages.
    #[arg(long = "page", value_name = "PATH")]
    pages: Vec<String>,

    /// Icon rendering: element or text.
    #[arg(long)]
    icons: Option<IconMode>,

    /// Record content encoding: xhtml or json.
    #[arg(long)]
    content: Option<ContentMode>,

    /// Output directory for records and transcripts.
    #[arg(short, long)]
    out: Option<String>,

    /// Directory for diagnostic dumps.
    #[arg(long)]
    log_dir: Option<String>,

    /// Directory for the page cache.
    #[arg(long)]
    cache_dir: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "valleydocs=info",
        1 => "valleydocs=debug",
        _ => "valleydocs=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape(args) => cmd_scrape(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scrape(args: ScrapeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    apply_overrides(&mut config, args);

    let scrape_config = ScrapeConfig::try_from(&config)?;
    let source = HttpPageSource::new(
        scrape_config.base_url.clone(),
        &config.output.cache_dir,
        &config.fetch,
    )?;

    info!(
        base_url = %scrape_config.base_url,
        entries = scrape_config.entry_pages.len(),
        icons = %scrape_config.icon_mode,
        content = %scrape_config.content_mode,
        "scraping site"
    );

    let reporter = CliProgress::new()?;
    let result = valleydocs_core::scrape(&scrape_config, source, &reporter).await?;

    println!();
    println!("  Scrape complete!");
    println!("  Resources:  {}", result.resources);
    println!("  Narrations: {}", result.narrations);
    println!("  Failed:     {}", result.failed_urls);
    println!("  Output:     {}", scrape_config.output_dir.display());
    println!("  Logs:       {}", scrape_config.log_dir.display());
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    if result.failed_urls > 0 {
        println!(
            "  {} page(s) could not be fetched; see {}",
            result.failed_urls,
            scrape_config.log_dir.join("failed_urls.json").display()
        );
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ScrapeArgs) {
    if let Some(base_url) = args.base_url {
        config.site.base_url = base_url;
    }
    if !args.pages.is_empty() {
        config.site.entry_pages = args.pages;
    }
    if let Some(icons) = args.icons {
        config.output.icon_mode = icons;
    }
    if let Some(content) = args.content {
        config.output.content_mode = content;
    }
    if let Some(out) = args.out {
        config.output.output_dir = out;
    }
    if let Some(log_dir) = args.log_dir {
        config.output.log_dir = log_dir;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.output.cache_dir = cache_dir;
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map_err(|e| eyre!("invalid progress template: {e}"))?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_crawled(&self, url: &str, count: usize) {
        self.spinner.set_message(format!("Crawling [{count}] {url}"));
    }

    fn page_rendered(&self, resource_id: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {resource_id}"));
    }

    fn done(&self, _result: &ScrapeResult) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

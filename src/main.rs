use anyhow::{bail, Context, Result};
use bookshelf::config::{find_config_file, load_config, Config};
use bookshelf::engine::CatalogEngine;
use bookshelf::models::NavigationState;
use bookshelf::navigation::{MemoryNavigator, NavigationCodec, PageLinks};
use bookshelf::transport::HttpTransport;
use bookshelf::ViewState;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bookshelf - browse a paginated book catalog
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse a paginated book catalog", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Search endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Per-attempt request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable the page cache
    #[arg(long, global = true, default_value_t = false)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the page an address points at, e.g. `?page=2&query=homer`
    #[command(alias = "b")]
    Browse {
        /// Address query string
        #[arg(default_value = "")]
        address: String,
    },

    /// Search the catalog, starting from page 1
    #[command(alias = "s")]
    Search {
        /// Search term
        term: String,
    },

    /// Jump to a page, keeping the query
    #[command(alias = "p")]
    Page {
        /// Page number (1-based)
        number: u32,

        /// Search term to page through
        #[arg(long, short = 'q', default_value = "")]
        query: String,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bookshelf={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = effective_config(&cli)?;

    let start = match &cli.command {
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Commands::Browse { address } => address.clone(),
        Commands::Search { .. } => String::new(),
        Commands::Page { query, .. } => {
            NavigationCodec::to_address(&NavigationState::first_page(query.as_str()))
        }
    };

    let transport = Arc::new(HttpTransport::new(&config.endpoint)?);
    let navigator = Arc::new(MemoryNavigator::new(start));
    let mut engine = CatalogEngine::new(&config, transport, navigator);

    match &cli.command {
        Commands::Search { term } => {
            engine.pagination().on_search_submit(term);
        }
        Commands::Page { number, .. } => {
            engine
                .pagination()
                .on_page_select(*number)
                .context("Invalid page")?;
        }
        Commands::Browse { .. } | Commands::Config => {}
    }

    let view = engine.refresh().await;
    let navigation = engine.navigation().cloned().unwrap_or_default();
    output_view(
        &navigation,
        &view,
        engine.page_links().as_ref(),
        cli.output,
        cli.quiet,
    )?;

    if let ViewState::Error(kind) = view {
        bail!("Fetch failed ({})", kind);
    }
    Ok(())
}

/// Load the config file and environment, then apply command-line overrides
fn effective_config(cli: &Cli) -> Result<Config> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(),
    };
    if let Some(path) = &path {
        tracing::info!("Using config file: {}", path.display());
    }

    let mut config = load_config(path.as_deref())?;
    if let Some(url) = &cli.endpoint {
        config.endpoint.url = url.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.endpoint.timeout_seconds = timeout;
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    Ok(config)
}

fn output_view(
    navigation: &NavigationState,
    view: &ViewState,
    links: Option<&PageLinks>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            let document = serde_json::json!({
                "navigation": navigation,
                "address": NavigationCodec::to_address(navigation),
                "view": view,
                "pager": links,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        OutputFormat::Table => match view {
            ViewState::Success(result) => {
                use comfy_table::{Attribute, Cell, Table};
                let mut table = Table::new();
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.set_header(vec!["Title", "Author", "Year", "City", "Country", "Pages"]);

                for book in &result.books {
                    table.add_row(vec![
                        Cell::new(truncate(&book.title, 50)).add_attribute(Attribute::Bold),
                        Cell::new(truncate(&book.author, 30)),
                        Cell::new(optional(book.publication_year)),
                        Cell::new(&book.publication_city),
                        Cell::new(&book.publication_country),
                        Cell::new(optional(book.page_count)),
                    ]);
                }
                println!("{table}");

                if !quiet {
                    println!("{} matches", result.total_count);
                    if let Some(links) = links {
                        println!("{}", render_pager(links));
                    }
                }
            }
            ViewState::Empty => println!("No results found"),
            ViewState::Error(kind) => eprintln!("{}", kind.advisory()),
            ViewState::Idle | ViewState::Loading => {}
        },
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// One-line pager, e.g. `« ‹ 1 2 [3] 4 5 › »`
fn render_pager(links: &PageLinks) -> String {
    let mut parts = Vec::new();
    if links.first.is_some() {
        parts.push("«".to_string());
    }
    if links.previous.is_some() {
        parts.push("‹".to_string());
    }
    for page in &links.pages {
        if *page == links.active {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if links.next.is_some() {
        parts.push("›".to_string());
    }
    if links.last.is_some() {
        parts.push("»".to_string());
    }
    format!("{}  (page {} of {})", parts.join(" "), links.active, links.total_pages)
}

//! scholarsearch - fetch, filter and export publications by author
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! scholarsearch search "Yann LeCun, Andrew Ng" --from 2015 --sort descending --export bib
//! scholarsearch import authors.xlsx
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! scholarsearch serve --port 3000
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholarsearch::client::PublicationClient;
use scholarsearch::config::{ClientConfig, API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL};
use scholarsearch::coordinator::{FetchCoordinator, FetchOutcome};
use scholarsearch::export::{self, ExportFormat};
use scholarsearch::import;
use scholarsearch::models::{Publication, SortOrder};
use scholarsearch::server::{self, AppState};
use scholarsearch::session::SearchSession;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// ScholarSearch - publications by author
#[derive(Parser)]
#[command(name = "scholarsearch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Publication service URL
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Publication service API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true, default_value = "")]
    api_key: String,

    /// Request timeout in seconds (transport default when omitted)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch publications for authors, filter them and optionally export
    Search {
        /// Comma-separated author names
        #[arg(required_unless_present = "import")]
        query: Option<String>,

        /// Read author names from the first column of a spreadsheet (.xlsx, .xls, .ods, .csv)
        #[arg(long)]
        import: Option<PathBuf>,

        /// Only show these authors (repeatable; default: all returned authors)
        #[arg(long = "author")]
        authors: Vec<String>,

        /// Case-insensitive text filter over title, authors, abstract, URL, year and source
        #[arg(long, default_value = "")]
        term: String,

        /// Earliest publication year
        #[arg(long = "from")]
        start_year: Option<i32>,

        /// Latest publication year
        #[arg(long = "to")]
        end_year: Option<i32>,

        /// Sort by year: ascending, descending or none (newest first)
        #[arg(long, default_value = "none")]
        sort: SortOrder,

        /// Page to show (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Print every page
        #[arg(long)]
        all: bool,

        /// Export the filtered list (repeatable): xlsx, bib, docx
        #[arg(long = "export")]
        exports: Vec<ExportFormat>,

        /// Directory for exported files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print the author query read from a spreadsheet
    Import {
        /// Spreadsheet file
        file: PathBuf,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = ClientConfig {
        api_url: cli.api_url,
        api_key: cli.api_key,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    match cli.command {
        Commands::Search {
            query,
            import,
            authors,
            term,
            start_year,
            end_year,
            sort,
            page,
            all,
            exports,
            output,
        } => {
            let options = SearchOptions {
                authors,
                term,
                start_year,
                end_year,
                sort,
                page,
                all,
                exports,
                output,
            };
            run_search(&config, query, import, options).await
        }
        Commands::Import { file } => {
            let query = import::query_from_file(&file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("{}", query);
            Ok(())
        }
        Commands::Serve { port, host } => run_server(&config, host, port).await,
    }
}

// ============================================================================
// Search
// ============================================================================

struct SearchOptions {
    authors: Vec<String>,
    term: String,
    start_year: Option<i32>,
    end_year: Option<i32>,
    sort: SortOrder,
    page: usize,
    all: bool,
    exports: Vec<ExportFormat>,
    output: PathBuf,
}

fn build_coordinator(config: &ClientConfig) -> Result<FetchCoordinator> {
    if config.api_key.is_empty() {
        anyhow::bail!("No API key: pass --api-key or set {}", API_KEY_ENV);
    }
    let client = PublicationClient::new(config).context("Failed to create publication client")?;
    Ok(FetchCoordinator::new(client))
}

async fn run_search(
    config: &ClientConfig,
    query: Option<String>,
    import_file: Option<PathBuf>,
    options: SearchOptions,
) -> Result<()> {
    let query = match import_file {
        Some(path) => import::query_from_file(&path)
            .with_context(|| format!("Failed to import {}", path.display()))?,
        None => query.unwrap_or_default(),
    };

    let coordinator = build_coordinator(config)?;
    let session = RwLock::new(SearchSession::new());

    println!("Searching for the publications of: {}", query);
    match coordinator.fetch(&session, &query).await? {
        FetchOutcome::Loaded { authors, publications } => {
            println!("Found {} publications for {} authors.", publications, authors);
        }
        FetchOutcome::Failed | FetchOutcome::Superseded => {}
    }

    let mut session = session.into_inner();
    if !options.authors.is_empty() {
        session.select_authors(&options.authors);
    }
    session.set_search_term(options.term);
    session.set_year_range(options.start_year, options.end_year);
    session.set_sort_order(options.sort);

    if let Some(message) = session.status_message() {
        println!("{}", message);
    } else if options.all {
        let pages = session.page_count();
        for page in 1..=pages {
            session.go_to_page(page);
            print_page(&session);
        }
    } else {
        session.go_to_page(options.page);
        print_page(&session);
    }

    if !options.exports.is_empty() {
        let publications = session.export_list();
        for format in options.exports {
            let path = export::write_to_dir(format, &publications, &options.output)
                .with_context(|| format!("Failed to export {}", format.file_name()))?;
            println!("Saved: {}", path.display());
        }
    }

    Ok(())
}

fn print_page(session: &SearchSession) {
    let view = session.view();
    println!(
        "\n--- Page {} of {} ({} publications) ---",
        view.page,
        view.display_total_pages(),
        view.total_count
    );
    for publication in view.items {
        print_publication(publication);
    }
}

fn print_publication(publication: &Publication) {
    println!("\n{}", publication.title);
    println!("  Date:     {}", publication.year_text());
    println!("  URL:      {}", publication.link);
    println!("  Abstract: {}", publication.abstract_text);
    println!("  Authors:  {}", publication.authors_joined());
    println!("  Source:   {}", publication.source_or_na());
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(config: &ClientConfig, host: String, port: u16) -> Result<()> {
    let coordinator = build_coordinator(config)?;
    let state = Arc::new(AppState::new(coordinator));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    info!(host = %host, port = port, "Starting HTTP server");
    println!("Starting server at http://{}", addr);

    server::run(state, addr).await.context("Server error")?;
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use term_agent::api::state::AppState;
use term_agent::api::build_router;
use term_agent::calculate::{self, ngrams};
use term_agent::config::AppConfig;
use term_agent::fetch::{SheetSource, TabSource};
use term_agent::ingest;
use term_agent::models::{
    DataSet, NgramSortKey, NgramWidth, SortDirection, TermSortKey,
};

#[derive(Parser)]
#[command(name = "term-agent")]
#[command(about = "Search term analytics for ad campaign exports")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Sheet endpoint URL (overrides config)
    #[arg(long)]
    sheet_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Fetch search terms and print the top rows with derived metrics
    Terms {
        /// Number of rows to print
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Column to sort by
        #[arg(long, default_value = "cost")]
        sort: String,
    },

    /// Fetch search terms and print the top n-grams
    Ngrams {
        /// N-gram width (1, 2, or 3)
        #[arg(long, default_value = "2")]
        width: u8,

        /// Number of rows to print
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Column to sort by
        #[arg(long, default_value = "total_cost")]
        sort: String,
    },
}

fn init_logging(level: &str, json_logs: bool) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("loading config from {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(ref sheet_url) = cli.sheet_url {
        config.source.sheet_url = sheet_url.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn TabSource>> {
    if config.source.sheet_url.is_empty() {
        bail!("no sheet URL configured; set [source].sheet_url or pass --sheet-url");
    }
    let source = SheetSource::new(
        config.source.sheet_url.clone(),
        Duration::from_secs(config.source.timeout_seconds),
    )?;
    Ok(Arc::new(source))
}

/// ROAS renders as a multiple; zero and non-finite values show a placeholder.
fn format_roas(roas: f64) -> String {
    if roas.is_finite() && roas != 0.0 {
        format!("{roas:.2}x")
    } else {
        "-".to_string()
    }
}

fn truncated(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

async fn run_serve(
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let source = build_source(&config)?;

    let data = match ingest::load_dataset(source.as_ref()).await {
        Ok(outcome) => {
            if !outcome.skipped.is_empty() {
                warn!(skipped = outcome.skipped.len(), "some rows failed to parse");
            }
            outcome.data
        }
        Err(e) => {
            warn!("initial fetch failed ({e}); starting with an empty dataset");
            DataSet::default()
        }
    };

    let state = AppState::new(data, source);
    let app = build_router(state, &config.server.cors_origin);

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_terms(config: AppConfig, limit: usize, sort: String) -> Result<()> {
    let key: TermSortKey = sort.parse()?;
    let source = build_source(&config)?;

    let (records, skipped) = ingest::load_search_terms(source.as_ref()).await?;
    if !skipped.is_empty() {
        warn!(skipped = skipped.len(), "some rows failed to parse");
    }

    let mut terms = calculate::calculate_all_terms(&records);
    let direction = if key.is_text() {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    terms.sort_by(|a, b| direction.apply(key.compare(a, b)));

    println!(
        "{:<40} {:>10} {:>8} {:>10} {:>7} {:>8} {:>8}",
        "SEARCH TERM", "IMPR", "CLICKS", "COST", "CONV", "CTR", "ROAS"
    );
    for term in terms.iter().take(limit) {
        println!(
            "{:<40} {:>10.0} {:>8.0} {:>10.2} {:>7.1} {:>7.2}% {:>8}",
            truncated(&term.record.search_term, 40),
            term.record.impressions,
            term.record.clicks,
            term.record.cost,
            term.record.conversions,
            term.ctr * 100.0,
            format_roas(term.roas),
        );
    }
    println!("({} of {} terms)", limit.min(terms.len()), terms.len());
    Ok(())
}

async fn run_ngrams(config: AppConfig, width: u8, limit: usize, sort: String) -> Result<()> {
    let width = NgramWidth::new(width)?;
    let key: NgramSortKey = sort.parse()?;
    let source = build_source(&config)?;

    let (records, skipped) = ingest::load_search_terms(source.as_ref()).await?;
    if !skipped.is_empty() {
        warn!(skipped = skipped.len(), "some rows failed to parse");
    }

    let mut grams = ngrams::aggregate(&records, width);
    let direction = if key == NgramSortKey::Ngram {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    grams.sort_by(|a, b| {
        direction
            .apply(key.compare(a, b))
            .then_with(|| a.ngram.cmp(&b.ngram))
    });

    println!(
        "{:<30} {:>6} {:>10} {:>8} {:>10} {:>7} {:>10}",
        "NGRAM", "COUNT", "COST", "CLICKS", "IMPR", "CONV", "VALUE"
    );
    for gram in grams.iter().take(limit) {
        println!(
            "{:<30} {:>6} {:>10.2} {:>8.0} {:>10.0} {:>7.1} {:>10.2}",
            truncated(&gram.ngram, 30),
            gram.count,
            gram.total_cost,
            gram.total_clicks,
            gram.total_impressions,
            gram.total_conversions,
            gram.total_conversion_value,
        );
    }
    println!(
        "({} of {} {}-grams)",
        limit.min(grams.len()),
        grams.len(),
        width
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // --access-log widens the filter so the TraceLayer spans show up.
    let mut level = config.log_level.clone();
    if matches!(
        &cli.command,
        Commands::Serve {
            access_log: true,
            ..
        }
    ) {
        level = format!("{level},tower_http=debug");
    }
    init_logging(&level, cli.json_logs);

    match cli.command {
        Commands::Serve { host, port, .. } => run_serve(config, host, port).await,
        Commands::Terms { limit, sort } => run_terms(config, limit, sort).await,
        Commands::Ngrams { width, limit, sort } => run_ngrams(config, width, limit, sort).await,
    }
}

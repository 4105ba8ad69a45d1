//! pubmed-optimizer: prune redundant keywords from a PubMed query

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pubmed_query_optimizer::optimizer::GroupOutcome;
use pubmed_query_optimizer::{config, metrics::Metrics, search, OptimizationReport, Optimizer};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pubmed-optimizer",
    version,
    about = "Remove keywords that do not change a PubMed query's result count"
)]
struct Cli {
    /// Query to optimize; read from stdin when omitted
    #[arg(short, long)]
    query: Option<String>,

    /// Path to a settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Count engine (esearch or pubmed_web)
    #[arg(long)]
    engine: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Plain)]
    format: Format,

    /// Do not memoize result counts
    #[arg(long)]
    no_cache: bool,

    /// Log every trial search
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Optimized query only
    Plain,
    /// Result count, final query, and excluded keywords
    Report,
    /// Full report as JSON
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(engine) = cli.engine {
        settings.search.engine = engine;
    }
    if cli.no_cache {
        settings.search.cache = false;
    }

    init_logging(cli.verbose || settings.general.debug);

    let query = match cli.query {
        Some(query) => query,
        None => read_query()?,
    };

    let metrics = Arc::new(Metrics::new());
    let search = search::from_settings(&settings, metrics.clone())?;
    let optimizer = Optimizer::new(search.as_ref()).with_metrics(metrics);

    let report = optimizer.run(&query).await?;
    info!("Finished after {} searches", report.searches);

    match cli.format {
        Format::Plain => println!("{}", report.optimized_query),
        Format::Report => print_report(&report),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn read_query() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading query from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_report(report: &OptimizationReport) {
    println!("--- Final Results ---");
    match report.result_count {
        Some(count) => println!("Result Count: {count}"),
        None => println!("Result Count: not searched"),
    }

    println!("\nFinal Search Query:");
    println!("{}", report.optimized_query);

    println!("\nExcluded Keywords:");
    for keyword in &report.excluded_keywords {
        println!("{keyword}");
    }

    let abandoned: Vec<_> = report.abandoned_groups().collect();
    if !abandoned.is_empty() {
        println!("\nIncomplete Groups:");
        for group in abandoned {
            if let GroupOutcome::Abandoned { reason } = &group.outcome {
                println!("{} ({})", group.keywords.join(" OR "), reason);
            }
        }
    }

    println!("\nPubMed: {}", report.pubmed_url());
}

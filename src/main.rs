use anyhow::Context;
use bank_wrapped::config::{ConfigLoader, WrappedConfig};
use bank_wrapped::{RunParams, Wrapped, WrappedReport};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, trace};

/// Year-in-review spending summaries
#[derive(Parser)]
#[command(name = "bank-wrapped")]
#[command(about = "Summarize a year of spending across bank organizations", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch transactions and compute the summary
    Run {
        /// Requesting user's id
        #[arg(long)]
        user_id: String,

        /// Organization ids, comma separated or repeated
        #[arg(long = "org", value_delimiter = ',', required = true)]
        orgs: Vec<String>,

        /// Cutoff year (default: configured year, else the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Display name used when the user is not found in any organization
        #[arg(long)]
        name: Option<String>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = match loader.load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let log_level = match cli.verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,reqwest=debug".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("bank-wrapped started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Commands::Run {
            user_id,
            orgs,
            year,
            name,
            json,
        } => {
            let params = RunParams {
                user_id,
                org_ids: orgs,
                cutoff_year: year,
                display_name: name,
            };
            run_wrapped(config, params, json).await
        }
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_wrapped(config: WrappedConfig, params: RunParams, json: bool) -> anyhow::Result<()> {
    let wrapped = Wrapped::from_config(config).context("Failed to set up API client")?;
    let report = wrapped.run(params).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_config(config: &WrappedConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

fn dollars(cents: i64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

fn print_summary(report: &WrappedReport) {
    let m = &report.metrics;

    if let Some(name) = &m.name {
        println!("Wrapped for {name}");
    }
    println!("Organizations:      {}", m.orgs);
    println!("Collaborators:      {}", m.collaborators);
    println!("You spent:          {}", dollars(m.amount_spent));
    println!("Money moved:        {}", dollars(m.transactions_cents));
    if let Some(org) = &m.most_spent_org {
        println!("Most spent at:      {org}");
    }
    println!("Spending percentile: {:.0}", m.spending_percentile);
    if let Some(day) = &m.busiest_day {
        println!("Busiest day:        {day}");
    }
    if let Some(day) = &m.self_busiest_day {
        println!("Your busiest day:   {day}");
    }
    if let Some(month) = &m.busiest_month {
        println!("Busiest month:      {} ({})", month.name, dollars(month.amount));
    }
    println!("Active days:        {}", m.active_days);
    if !m.top_keywords.is_empty() {
        let words: Vec<_> = m.top_keywords.iter().map(|k| k.keyword.as_str()).collect();
        println!("Top keywords:       {}", words.join(", "));
    }

    if !report.is_complete() {
        println!();
        println!("⚠️ Incomplete: {} organization(s) could not be fetched", report.failures.len());
        for failure in &report.failures {
            println!("  {} - {}", failure.org_id, failure.error);
        }
    }

    println!();
    println!("Share: {}", report.share_link);
}

//! # fxrates
//!
//! Binary that wires together all the components:
//! - Load configuration from flags and environment
//! - Initialize the SQLite store
//! - Create the rate service with the configured providers
//! - Run one command and print the result as JSON

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rates_providers::{ProviderKind, ReqwestTransport, build_providers};
use rates_repo::build_store;
use rates_service::RateService;
use rates_types::{RateProvider, RateRequest};

use config::Config;

#[derive(Parser)]
#[command(name = "fxrates")]
#[command(author, version, about = "Exchange rate ingester", long_about = None)]
struct Cli {
    /// SQLite database URL
    #[arg(
        long,
        global = true,
        env = "FXRATES_DATABASE_URL",
        default_value = "sqlite://fxrates.db"
    )]
    database_url: String,

    /// Upstream HTTP timeout in seconds
    #[arg(long, global = true, env = "FXRATES_HTTP_TIMEOUT", default_value_t = 30)]
    timeout_secs: u64,

    /// Abandon any single provider or store call after this many seconds
    #[arg(long, global = true, env = "FXRATES_DEADLINE")]
    deadline_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch rates from one provider without storing them
    Fetch {
        #[arg(long, default_value = "ecb")]
        provider: ProviderKind,
        #[command(flatten)]
        pair: PairArgs,
        /// Observation date (YYYY-MM-DD); latest when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Fetch and store rates; every covering provider when none is given
    Ingest {
        #[arg(long)]
        provider: Option<ProviderKind>,
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Look up one stored rate
    Rate {
        base: String,
        target: String,
        /// Exact date; most recent when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Most recent stored rate of each target
    Latest {
        #[command(flatten)]
        pair: PairArgs,
    },
    /// Stored rates on a date, falling back to the nearest earlier date
    AsOf {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Stored rates within an inclusive date range
    History {
        #[command(flatten)]
        pair: PairArgs,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// Currencies with directly observed rates
    Currencies,
    /// Bases with directly observed rates
    Bases,
    /// Earliest and latest stored dates
    Range,
    /// List the built-in providers
    Providers,
}

#[derive(clap::Args)]
struct PairArgs {
    /// Base currency code
    #[arg(long)]
    base: String,
    /// Target currency codes (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    targets: Vec<String>,
}

impl PairArgs {
    fn request(&self, date: Option<NaiveDate>) -> RateRequest {
        let targets = self.targets.iter().filter(|t| !t.trim().is_empty());
        match date {
            Some(date) => RateRequest::on(&self.base, targets, date),
            None => RateRequest::latest(&self.base, targets),
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,rates_service=debug".into());

    // stdout carries the JSON result; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config);

    let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(cli.timeout_secs))?);
    let providers = build_providers(transport, |kind| config.base_url(kind));

    if let Commands::Providers = cli.command {
        let listing: Vec<_> = providers
            .iter()
            .map(|p| {
                json!({
                    "id": p.kind().slug(),
                    "name": p.name(),
                    "pivot": p.pivot(),
                    "currencies": p.supported_currencies(),
                })
            })
            .collect();
        return print_json(&listing);
    }

    tracing::debug!("Using database: {}", cli.database_url);

    // Build store (handles connection and migration)
    let store = build_store(&cli.database_url).await?;

    let mut service = RateService::new(store, providers);
    if let Some(secs) = cli.deadline_secs {
        service = service.with_deadline(Duration::from_secs(secs));
    }

    match cli.command {
        Commands::Fetch {
            provider,
            pair,
            date,
        } => {
            let rates = service.fetch(provider, &pair.request(date)).await?;
            print_json(&rates)?;
        }

        Commands::Ingest {
            provider,
            pair,
            date,
        } => {
            let req = pair.request(date);
            match provider {
                Some(kind) => print_json(&service.ingest(kind, &req).await?)?,
                None => print_json(&service.ingest_all(&req).await?)?,
            }
        }

        Commands::Rate { base, target, date } => {
            let rate = service
                .rate(&base.to_uppercase(), &target.to_uppercase(), date)
                .await?;
            print_json(&rate)?;
        }

        Commands::Latest { pair } => {
            let req = pair.request(None);
            print_json(&service.latest_rates(&req.base, &req.targets).await?)?;
        }

        Commands::AsOf { pair, date } => {
            let req = pair.request(None);
            print_json(&service.rates_as_of(&req.base, &req.targets, date).await?)?;
        }

        Commands::History { pair, start, end } => {
            let req = pair.request(None);
            print_json(&service.history(&req.base, &req.targets, start, end).await?)?;
        }

        Commands::Currencies => print_json(&service.available_currencies().await?)?,

        Commands::Bases => print_json(&service.available_bases().await?)?,

        Commands::Range => print_json(&service.date_range().await?)?,

        Commands::Providers => {}
    }

    Ok(())
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingenie_core::domain::market::Period;
use fingenie_core::domain::profile::InvestmentProfile;
use fingenie_core::pipeline::PipelineOptions;
use fingenie_core::portfolio::Holding;
use fingenie_core::services::Services;

#[derive(Debug, Parser)]
#[command(name = "fingenie", about = "Stock analysis from the command line; prints JSON")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Map a company name or ticker to a verified ticker.
    Resolve { query: String },

    /// Resolve and run the full analysis.
    Analyze {
        query: String,

        #[arg(long, default_value_t = Period::OneMonth)]
        period: Period,

        #[arg(long, default_value_t = InvestmentProfile::Moderate)]
        profile: InvestmentProfile,

        /// Store the finished record in the analysis history (needs DATABASE_URL).
        #[arg(long)]
        persist: bool,
    },

    /// Screen holdings and print the aggregate.
    Portfolio {
        /// TICKER=SHARES, repeatable.
        #[arg(long = "holding", value_parser = parse_holding, required = true)]
        holdings: Vec<Holding>,

        #[arg(long, default_value_t = fingenie_core::portfolio::DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fingenie_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let services = Services::from_settings(&settings)?;

    let res = run(args.command, &services, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
    }
    res
}

async fn run(
    command: Command,
    services: &Services,
    settings: &fingenie_core::config::Settings,
) -> anyhow::Result<()> {
    match command {
        Command::Resolve { query } => {
            let resolved = services.resolver().resolve(&query).await?;
            print_json(&resolved)
        }
        Command::Analyze {
            query,
            period,
            profile,
            persist,
        } => {
            let pool = if persist {
                let db_url = settings.require_database_url()?;
                Some(fingenie_core::storage::connect(db_url).await?)
            } else {
                None
            };

            let ticker = services.resolver().resolve(&query).await?;
            let record = services
                .pipeline()
                .run(ticker, &PipelineOptions::full(period, profile))
                .await;

            if let Some(pool) = &pool {
                let provider = services.intelligence.provider().as_str();
                let id = fingenie_core::storage::analyses::persist_record(pool, &record, provider).await?;
                tracing::info!(%id, "analysis stored");
            }

            print_json(&record)?;
            if let Some(error) = &record.error {
                anyhow::bail!("analysis failed: {error}");
            }
            Ok(())
        }
        Command::Portfolio {
            holdings,
            concurrency,
        } => {
            let summary = services
                .portfolio()
                .with_concurrency(concurrency)
                .aggregate(&holdings)
                .await;
            print_json(&summary)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn parse_holding(s: &str) -> Result<Holding, String> {
    let (ticker, shares) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=SHARES, got {s:?}"))?;
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(format!("missing ticker in {s:?}"));
    }
    let shares: f64 = shares
        .trim()
        .parse()
        .map_err(|_| format!("shares must be a number in {s:?}"))?;
    Ok(Holding {
        ticker: ticker.to_string(),
        shares,
    })
}

fn init_sentry(settings: &fingenie_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

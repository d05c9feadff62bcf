use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flight_surety::config::{load_config, AppConfig};
use flight_surety::flights::FlightStatus;
use flight_surety::governance::Admission;
use flight_surety::relay::{FixedStatus, OracleRelay, RandomStatus, StatusOracle};
use flight_surety::{FlightSurety, Principal};

#[derive(Parser)]
#[command(name = "flight-surety")]
#[command(about = "Airline governance and flight status oracle consensus")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run airlines, a flight and a batch of oracle nodes end to end
    Simulate {
        /// Airlines to register besides the founding airline
        #[arg(short, long, default_value_t = 5)]
        airlines: usize,

        /// Oracle nodes to register
        #[arg(short, long, default_value_t = 20)]
        oracles: usize,

        /// Status code every oracle reports (0, 10, 20, 30, 40, 50)
        #[arg(short, long, conflicts_with = "random")]
        status: Option<u8>,

        /// Oracles pick a status at random
        #[arg(short, long)]
        random: bool,

        /// Flight code to register and query
        #[arg(short, long, default_value = "ND1309")]
        flight: String,
    },
    /// Print the effective protocol constants
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The loader runs before the subscriber exists, so report what it used here
    match cli.config.as_deref() {
        Some(path) => info!("Configuration loaded from {:?}", path),
        None => info!("Configuration loaded from defaults and environment"),
    }
    info!(
        "Protocol: threshold {}, quorum {}, {} indexes of {}",
        config.protocol.admission_threshold,
        config.protocol.response_quorum,
        config.protocol.index_set_size,
        config.protocol.index_range
    );

    match cli.command {
        Commands::Simulate {
            airlines,
            oracles,
            status,
            random,
            flight,
        } => {
            let status_source: Arc<dyn StatusOracle> = match (status, random) {
                (_, true) => Arc::new(RandomStatus::default()),
                (Some(code), false) => Arc::new(FixedStatus(FlightStatus::try_from(code)?)),
                (None, false) => Arc::new(FixedStatus(FlightStatus::LateAirline)),
            };
            simulate(&config, airlines, oracles, status_source, &flight).await
        }
        Commands::ShowConfig => {
            println!("{}", config.protocol.to_toml()?);
            Ok(())
        }
    }
}

async fn simulate(
    config: &AppConfig,
    airline_count: usize,
    oracle_count: usize,
    status: Arc<dyn StatusOracle>,
    flight_code: &str,
) -> anyhow::Result<()> {
    if oracle_count == 0 {
        bail!("At least one oracle node is required");
    }

    let system = Arc::new(FlightSurety::new(config));
    let founder = config.founding_airline.clone();
    let funding = config.protocol.min_funding;

    system.fund_member(&founder, funding).await?;

    // Airlines register through the founder; past the threshold every
    // funded airline votes on the newcomer
    let mut airlines: Vec<Principal> = Vec::new();
    for i in 1..=airline_count {
        let candidate = Principal::new(format!("airline-{}", i));
        let admission = system.register_member(&candidate, &founder).await?;
        if admission == Admission::PendingVote {
            for voter in &airlines {
                let receipt = system.cast_vote(&candidate, voter, true).await?;
                if receipt.admitted {
                    break;
                }
            }
        }
        system.fund_member(&candidate, funding).await?;
        airlines.push(candidate);
    }
    info!(
        "{} airlines registered",
        system.get_number_registered_airlines().await
    );

    let owner = airlines.first().cloned().unwrap_or_else(|| founder.clone());
    let departure = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    system.register_flight(flight_code, departure, &owner).await?;

    let mut relay = OracleRelay::register(system.clone(), oracle_count, status).await?;
    // Skip the setup history
    relay.drain().await;

    let opened = system.submit_request(flight_code, &owner, departure).await?;
    info!(
        "Requested status for {} (index {}, key {})",
        flight_code, opened.group_index, opened.key
    );

    let report = relay.drain().await;
    let flight = system.get_flight_info(flight_code, &owner).await;

    let summary = serde_json::json!({
        "relay_session": relay.session(),
        "registered_airlines": system.get_number_registered_airlines().await,
        "oracle_nodes": relay.nodes().len(),
        "request": {
            "key": opened.key,
            "group_index": opened.group_index,
            "state": system.get_request(&opened.key).await.map(|r| r.state),
        },
        "flight": flight,
        "relay": report,
        "event_log": {
            "length": system.events().len().await,
            "head": system.events().head_hash().await,
            "verified": system.events().verify_chain().await,
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

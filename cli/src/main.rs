use anyhow::Context;
use clap::Parser;
use echo_api::{start_server, ApiState, DaoNode, ProposalPolicy};
use echo_cli::{BlockProducer, NodeConfig};
use echo_core::format_units;
use echo_storage::Journal;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "echod")]
#[command(about = "Echo DAO development node")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the API listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Override the journal directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::load(path)?,
        None => {
            tracing::warn!("no config file given, using development defaults");
            NodeConfig::default()
        }
    };
    if let Some(listen) = cli.listen {
        config.api.listen = listen;
    }
    if let Some(dir) = cli.data_dir {
        config.chain.data_dir = Some(dir);
    }

    println!("{}", "Echo DAO Node".cyan().bold());
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".bright_black());

    let genesis = config.genesis_config()?;
    let mut node = DaoNode::bootstrap(&genesis).context("bootstrap failed")?;

    if let Some(dir) = config.data_dir() {
        let journal = Journal::open(&dir)
            .with_context(|| format!("failed to open journal at {}", dir.display()))?;
        let replayed = node.attach_journal(journal)?;
        println!("{} replayed {} journaled operations", "✓".green(), replayed);
    } else {
        println!("{} no data_dir configured, state will not survive a restart", "⚠".yellow());
    }

    println!("{}: {}", "Network".yellow().bold(), config.network.name);
    println!("{}: {}", "Deployer".yellow().bold(), node.deployer());
    println!("{}: {}", "Treasury".yellow().bold(), node.treasury_address());
    println!("{}: {}", "Governance".yellow().bold(), node.governance_address());
    println!("{}: {}", "Genesis".yellow().bold(), node.genesis_fingerprint());
    println!(
        "{}: {}",
        "Treasury balance".yellow().bold(),
        format_units(node.ledger().balance_of(&node.treasury_address())).green()
    );
    println!(
        "{}: {} blocks of {}s",
        "Voting period".yellow().bold(),
        config.chain.voting_period_blocks,
        config.chain.block_time_secs
    );

    let policy = ProposalPolicy::new(config.policy_config()?);
    let state = ApiState::new(node, policy, config.network.name.clone());

    let block_time = Duration::from_secs(config.chain.block_time_secs.max(1));
    let producer = BlockProducer::new(state.node.clone(), block_time).start();

    let addr = config.listen_addr()?;
    println!("\n{} API on http://{}", "✓".green(), addr);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    tokio::select! {
        result = start_server(addr, state) => {
            result.map_err(|e| anyhow::anyhow!("API server failed: {}", e))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    producer.abort();
    Ok(())
}

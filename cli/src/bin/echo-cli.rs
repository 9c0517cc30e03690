//! Echo DAO CLI - query and drive a node over its HTTP API

use anyhow::Result;
use clap::{Parser, Subcommand};
use echo_api::models::{
    ChainInfoResponse, CreateProposalRequest, CreateProposalResponse, DepositRequest,
    ProposalResponse, ProposalStatusResponse, ReceiptResponse, TallyResponse,
    TreasuryInfoResponse, TxResponse, VoteRequest,
};
use echo_cli::config::resolve_account;
use echo_cli::ApiClient;
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "echo-cli")]
#[command(about = "Echo DAO treasury and governance tool", version)]
struct Cli {
    /// API endpoint
    #[arg(short, long, default_value = "http://127.0.0.1:24180")]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chain and deployment information
    Info,

    /// List all proposals, oldest first
    Proposals,

    /// Show one proposal with its ballots
    Proposal { id: u64 },

    /// Propose a treasury release
    Create {
        /// Proposer account (0x address or seed label)
        #[arg(long)]
        from: String,
        /// Recipient of the release
        #[arg(long)]
        recipient: String,
        /// Amount in whole units, e.g. "1.5"
        #[arg(long)]
        amount: String,
        #[arg(long)]
        description: String,
        /// Proposal fee, when the policy asks for one
        #[arg(long)]
        fee: Option<String>,
    },

    /// Cast a vote
    Vote {
        #[arg(long)]
        from: String,
        id: u64,
        /// Vote against instead of for
        #[arg(long)]
        against: bool,
    },

    /// Execute a passed proposal
    Execute {
        id: u64,
        /// Submitting account, defaults to the deployer
        #[arg(long)]
        from: Option<String>,
    },

    /// Deposit funds into the treasury
    Deposit {
        #[arg(long)]
        from: String,
        amount: String,
    },

    /// Show the treasury balance and totals
    Balance,

    /// Show whether an account may create a proposal right now
    Policy { account: String },

    /// Show a transaction receipt
    Tx { hash: String },

    /// Wait for a proposal's voting window to close, then execute it
    Watch {
        id: u64,
        #[arg(long)]
        from: Option<String>,
        /// Poll interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

fn account(value: &str) -> Result<String> {
    Ok(resolve_account("account", value)?.to_string())
}

fn print_proposal(proposal: &ProposalResponse) {
    println!("\n🗳  Proposal #{}", proposal.id);
    println!("═══════════════════════════════════");
    println!("Description:  {}", proposal.description);
    println!("Proposer:     {}", proposal.proposer);
    println!("Status:       {}", proposal.status.to_string().bold());
    if let Some(release) = &proposal.release {
        println!("Release:      {} → {}", release.amount.units, release.recipient);
    } else {
        println!("Target:       {}", proposal.target);
        println!("Value:        {}", proposal.value.units);
    }
    println!("Votes:        {} yes / {} no", proposal.yes_votes, proposal.no_votes);
    println!("Window:       blocks {}..={}", proposal.block_start, proposal.block_end);
    if proposal.blocks_remaining > 0 {
        println!("Remaining:    {} blocks", proposal.blocks_remaining);
    }
}

fn print_tx(label: &str, tx: &TxResponse) {
    println!("{} {}", "✓".green(), label);
    println!("  tx: {}", tx.tx_hash);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api);

    match cli.command {
        Commands::Info => {
            let info: ChainInfoResponse = client.get("/chain/info").await?;
            println!("\n📊 Echo DAO ({})", info.network);
            println!("═══════════════════════════════════");
            println!("Block Height:   {}", info.height);
            println!("Deployer:       {}", info.deployer);
            println!("Treasury:       {}", info.treasury);
            println!("Governance:     {}", info.governance);
            println!("Voting Period:  {} blocks", info.voting_period_blocks);
            println!("Proposals:      {}", info.proposal_count);
            println!("Uptime:         {}s", info.uptime_secs);
        }

        Commands::Proposals => {
            let proposals: Vec<ProposalResponse> = client.get("/proposals").await?;
            if proposals.is_empty() {
                println!("No proposals yet");
            }
            for proposal in proposals {
                println!(
                    "#{:<4} {:<9} {:>3} yes {:>3} no  {}",
                    proposal.id,
                    proposal.status,
                    proposal.yes_votes,
                    proposal.no_votes,
                    proposal.description
                );
            }
        }

        Commands::Proposal { id } => {
            let proposal: ProposalResponse = client.get(&format!("/proposals/{}", id)).await?;
            print_proposal(&proposal);
            let tally: TallyResponse = client.get(&format!("/proposals/{}/tally", id)).await?;
            println!("Approval:     {}%", tally.approval_percentage);
            for ballot in tally.ballots {
                let mark = if ballot.support { "yes".green().to_string() } else { "no".red().to_string() };
                println!("  {} {}", mark, ballot.voter);
            }
        }

        Commands::Create {
            from,
            recipient,
            amount,
            description,
            fee,
        } => {
            let request = CreateProposalRequest {
                from: account(&from)?,
                description,
                recipient: account(&recipient)?,
                amount,
                fee,
            };
            let created: CreateProposalResponse =
                client.post("/proposals/create", &request).await?;
            println!("{} {}", "✓".green(), created.message);
            println!("  proposal: #{}", created.proposal_id);
            println!("  tx:       {}", created.tx_hash);
            if let Some(fee_tx) = created.fee_tx_hash {
                println!("  fee tx:   {}", fee_tx);
            }
        }

        Commands::Vote { from, id, against } => {
            let request = VoteRequest {
                from: account(&from)?,
                proposal_id: id,
                support: !against,
            };
            let tx: TxResponse = client.post("/proposals/vote", &request).await?;
            print_tx(&tx.message, &tx);
        }

        Commands::Execute { id, from } => {
            let tx = execute(&client, id, from.as_deref()).await?;
            print_tx(&tx.message, &tx);
        }

        Commands::Deposit { from, amount } => {
            let request = DepositRequest {
                from: account(&from)?,
                amount,
            };
            let tx: TxResponse = client.post("/funds/deposit", &request).await?;
            print_tx(&tx.message, &tx);
        }

        Commands::Balance => {
            let info: TreasuryInfoResponse = client.get("/funds/treasury").await?;
            println!("\n💰 Treasury {}", info.address);
            println!("═══════════════════════════════════");
            println!("Owner:      {}", info.owner);
            println!("Balance:    {}", info.balance.units.green());
            println!("Deposited:  {}", info.total_deposited.units);
            println!("Released:   {}", info.total_released.units);
        }

        Commands::Policy { account: value } => {
            let decision: Value = client
                .get(&format!("/proposals/policy/{}", account(&value)?))
                .await?;
            let allowed = decision["can_create"].as_bool().unwrap_or(false);
            let mark = if allowed { "✓".green().to_string() } else { "✗".red().to_string() };
            println!("{} {}", mark, decision["message"].as_str().unwrap_or(""));
            println!(
                "  today: {}  total: {}  min fee: {}",
                decision["proposals_today"], decision["total_proposals"], decision["min_fee"]
            );
        }

        Commands::Tx { hash } => {
            let receipt: ReceiptResponse = client.get(&format!("/chain/tx/{}", hash)).await?;
            let status = if receipt.success { "success".green().to_string() } else { "reverted".red().to_string() };
            println!("\n🧾 {}", receipt.tx_hash);
            println!("═══════════════════════════════════");
            println!("From:    {}", receipt.from);
            println!("To:      {}", receipt.to);
            println!("Block:   {}", receipt.block);
            println!("Status:  {}", status);
            if let Some(revert) = &receipt.revert {
                println!("Revert:  {}", revert);
            }
            for event in &receipt.events {
                println!("Event:   {}", serde_json::to_string(event)?);
            }
        }

        Commands::Watch { id, from, interval } => {
            watch(&client, id, from.as_deref(), Duration::from_secs(interval.max(1))).await?;
        }
    }

    Ok(())
}

async fn execute(client: &ApiClient, id: u64, from: Option<&str>) -> Result<TxResponse> {
    let path = match from {
        Some(from) => format!("/proposals/execute/{}?from={}", id, account(from)?),
        None => format!("/proposals/execute/{}", id),
    };
    client.post(&path, &json!({})).await
}

async fn watch(client: &ApiClient, id: u64, from: Option<&str>, interval: Duration) -> Result<()> {
    loop {
        let status: ProposalStatusResponse =
            client.get(&format!("/funds/proposal_status/{}", id)).await?;
        if status.executed {
            println!("{} proposal #{} is already executed", "✓".green(), id);
            return Ok(());
        }

        let info: ChainInfoResponse = client.get("/chain/info").await?;
        if info.height > status.block_end {
            if status.yes_votes <= status.no_votes {
                anyhow::bail!(
                    "proposal #{} did not pass ({} yes / {} no)",
                    id,
                    status.yes_votes,
                    status.no_votes
                );
            }
            let tx = execute(client, id, from).await?;
            print_tx(&format!("executed proposal #{}", id), &tx);
            return Ok(());
        }

        println!(
            "⏳ block {} of {}, {} yes / {} no",
            info.height, status.block_end, status.yes_votes, status.no_votes
        );
        tokio::time::sleep(interval).await;
    }
}

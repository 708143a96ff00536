//! `redpacket` command-line client.
//!
//! ```text
//! .env + config.toml + env overrides
//!     → BlockchainClient (RPC) + SubgraphClient (indexer) + Wallet (signer)
//!     → packets flows (query / create / claim) and history
//!     → stdout, prompts on stderr/stdin
//! ```

use alloy::primitives::{utils::format_ether, Address};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use redpacket_client::blockchain::chains::{self, CHAINS};
use redpacket_client::blockchain::{
    BlockchainClient, BlockchainError, ChainId, ContractWriter, PacketInfo, RedPacketContract,
    TxSender, Wallet, WalletContext,
};
use redpacket_client::config::{load_config, AppConfig};
use redpacket_client::history::HistoryFeed;
use redpacket_client::observability::logging::init_logging;
use redpacket_client::packets::{
    ClaimFlow, ClaimResult, CreateFlow, CreateRequest, LookupState, PacketLookup, Prompt,
    TerminalPrompt, TxAction, TxTracker,
};
use redpacket_client::subgraph::{EventIndex, SubgraphClient};

#[derive(Parser)]
#[command(name = "redpacket")]
#[command(about = "Create, inspect and claim on-chain red packets", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured chain ID
    #[arg(long, global = true)]
    chain_id: Option<u64>,

    /// Read-only identity when no signer key is loaded
    #[arg(long, global = true)]
    address: Option<String>,

    /// Answer "yes" to confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fund a new red packet
    Create {
        /// Total amount in ETH
        #[arg(long)]
        amount: String,
        /// Number of shares
        #[arg(long)]
        count: String,
        /// Random split instead of equal shares
        #[arg(long)]
        random: bool,
    },
    /// Show a packet's on-chain state
    Query { id: String },
    /// Claim a share of a packet
    Claim { id: String },
    /// List packets created and claimed by the current account
    History {
        #[arg(long, conflicts_with = "claimed")]
        created: bool,
        #[arg(long)]
        claimed: bool,
    },
    /// Print the block explorer link for a transaction
    Explorer { tx_hash: String },
    /// List supported chains
    Chains,
}

struct App {
    config: AppConfig,
    ctx: WalletContext,
    client: BlockchainClient,
    wallet: Option<Wallet>,
    index: Arc<dyn EventIndex>,
    prompt: Arc<dyn Prompt>,
}

impl App {
    async fn start(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = load_config(cli.config.as_deref())?;
        if let Some(chain_id) = cli.chain_id {
            config.select_chain(chain_id);
        }
        init_logging(&config.observability.log_level);

        let chain = ChainId(config.chain.chain_id);
        tracing::info!(
            chain_id = chain.0,
            chain = chains::chain_name(Some(chain)),
            rpc_url = %config.chain.rpc_url,
            subgraph = config.active_subgraph_url().unwrap_or("<none>"),
            "Configuration loaded"
        );
        if config.active_subgraph_url().is_none() {
            tracing::warn!(
                chain_id = chain.0,
                "No subgraph URL configured for the active chain; history and claim pre-checks are unavailable"
            );
        }

        let wallet = Wallet::from_env(&config.wallet.private_key_env, chain.0)?;
        let account = match (&wallet, &cli.address) {
            (Some(w), Some(raw)) => {
                let requested: Address = raw.parse()?;
                if requested != w.address() {
                    tracing::warn!(signer = %w.address(), requested = %requested, "--address ignored; using the signer");
                }
                Some(w.address())
            }
            (Some(w), None) => Some(w.address()),
            (None, Some(raw)) => Some(raw.parse::<Address>()?),
            (None, None) => None,
        };

        let client = BlockchainClient::new(config.chain.clone()).await?;
        let index: Arc<dyn EventIndex> = Arc::new(SubgraphClient::new(&config.subgraph, Some(chain))?);
        let prompt: Arc<dyn Prompt> = Arc::new(TerminalPrompt::new(cli.yes));

        Ok(Self {
            ctx: WalletContext::new(Some(chain), account),
            config,
            client,
            wallet,
            index,
            prompt,
        })
    }

    fn contract(&self) -> Result<RedPacketContract, BlockchainError> {
        RedPacketContract::new(self.client.clone(), self.ctx.contract_address())
    }

    fn writer(&self) -> Result<Arc<dyn ContractWriter>, BlockchainError> {
        let wallet = self.wallet.as_ref().ok_or_else(|| {
            BlockchainError::NotAvailable(format!(
                "no signer loaded; set {}",
                self.config.wallet.private_key_env
            ))
        })?;
        let contract = self.contract()?;
        let sender = TxSender::new(self.client.clone(), wallet, contract.address())?;
        Ok(Arc::new(sender))
    }

    fn lookup(&self) -> Result<Arc<PacketLookup>, BlockchainError> {
        Ok(Arc::new(PacketLookup::new(
            Arc::new(self.contract()?),
            Duration::from_millis(self.config.timing.lookup_debounce_ms),
        )))
    }

    async fn query(&self, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let lookup = self.lookup()?;
        let packet = load_packet(&lookup, id).await?;
        print_packet(&packet);

        if let (true, Some(account)) = (packet.exists(), self.ctx.account()) {
            let taken = self.contract()?.claimed_amount(packet.id, account).await?;
            if taken.is_zero() {
                println!("  Your claim: none");
            } else {
                println!("  Your claim: {} ETH", format_ether(taken));
            }
        }
        Ok(())
    }

    async fn create(
        &self,
        amount: &str,
        count: &str,
        random: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let request = match CreateRequest::parse(amount, count, random) {
            Ok(request) => request,
            Err(e) => {
                self.prompt.notify(&e.to_string()).await;
                return Err(e.into());
            }
        };

        let tracker = Arc::new(TxTracker::new(TxAction::Create, self.writer()?));
        let flow = CreateFlow::new(self.ctx, tracker);
        let receipt = flow.create(request).await?;

        println!("Transaction: {}", self.ctx.explorer_url(&receipt.outcome.hash.to_string()));
        match receipt.packet_id {
            Some(id) => println!("Red packet ID: {}", id),
            None => println!("Red packet created; ID not found in the receipt, check `redpacket history --created`"),
        }
        Ok(())
    }

    async fn claim(&self, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let lookup = self.lookup()?;
        let tracker = Arc::new(TxTracker::new(TxAction::Claim, self.writer()?));
        let flow = ClaimFlow::new(
            self.ctx,
            self.index.clone(),
            self.prompt.clone(),
            tracker,
            lookup.clone(),
            Duration::from_millis(self.config.timing.refresh_delay_ms),
        );

        let packet = load_packet(&lookup, id).await?;
        print_packet(&packet);
        if let Some(button) = flow.button_state() {
            if button.disabled {
                println!("{}", button.label);
            }
        }

        match flow.click().await? {
            ClaimResult::Submitted(outcome) => {
                println!("Transaction: {}", self.ctx.explorer_url(&outcome.hash.to_string()));
                if let LookupState::Loaded(updated) = lookup.next_result().await {
                    println!("Claimed: {} / {}", updated.claimed, updated.count);
                }
            }
            ClaimResult::Declined => println!("Claim cancelled"),
            ClaimResult::Blocked(_) | ClaimResult::Ignored => {}
        }
        Ok(())
    }

    async fn history(&self, created: bool, claimed: bool) -> Result<(), Box<dyn std::error::Error>> {
        if self.ctx.account().is_none() {
            self.prompt.notify("Please connect your wallet first").await;
            return Ok(());
        }

        let feed = HistoryFeed::new(
            self.index.clone(),
            self.ctx,
            self.config.subgraph.page_size,
            Duration::from_millis(self.config.timing.history_debounce_ms),
        );
        feed.refresh().await;
        let snapshot = feed.snapshot();
        if let Some(error) = snapshot.error {
            return Err(error.into());
        }

        match self.contract()?.last_packet_id().await {
            Ok(latest) => println!("Latest packet ID on chain: {}", latest),
            Err(e) => tracing::warn!(error = %e, "Could not read the latest packet ID"),
        }

        let show_all = !created && !claimed;
        if created || show_all {
            println!("Created ({})", snapshot.created.len());
            for entry in &snapshot.created {
                let e = &entry.event;
                println!(
                    "  #{} {} ETH x{} {} at {} {}",
                    e.packet_id,
                    e.amount_ether(),
                    e.count,
                    if e.is_random { "random" } else { "equal" },
                    e.block_timestamp,
                    entry.explorer_url
                );
            }
        }
        if claimed || show_all {
            println!("Claimed ({})", snapshot.claimed.len());
            for entry in &snapshot.claimed {
                let e = &entry.event;
                println!(
                    "  #{} {} ETH of {} ETH from {} at {} {}",
                    e.packet_id,
                    e.amount_ether(),
                    e.total_ether(),
                    e.creator,
                    e.block_timestamp,
                    entry.explorer_url
                );
            }
        }
        Ok(())
    }
}

async fn load_packet(lookup: &PacketLookup, id: &str) -> Result<PacketInfo, Box<dyn std::error::Error>> {
    lookup.set_input(id);
    lookup.trigger()?;
    match lookup.next_result().await {
        LookupState::Loaded(packet) => Ok(packet),
        LookupState::Failed(reason) => Err(reason.into()),
        other => Err(format!("lookup ended in unexpected state {:?}", other).into()),
    }
}

fn print_packet(packet: &PacketInfo) {
    if !packet.exists() {
        println!("Red packet {} does not exist", packet.id);
        return;
    }
    println!("Red packet #{}", packet.id);
    println!("  Creator:   {}", packet.creator);
    println!("  Type:      {}", packet.split_kind());
    println!("  Total:     {} ETH", packet.total_ether());
    println!("  Remaining: {} ETH", packet.remain_ether());
    println!(
        "  Progress:  {} / {} ({:.0}%)",
        packet.claimed,
        packet.count,
        packet.progress_percent()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: could not read .env: {}", e);
        }
    }
    let cli = Cli::parse();

    // These two need neither configuration nor network
    match &cli.command {
        Commands::Chains => {
            for chain in CHAINS.iter() {
                let contract = if chain.red_packet == Address::ZERO {
                    "not deployed".to_string()
                } else {
                    chain.red_packet.to_string()
                };
                println!("{:>10}  {:<10} {:<30} {}", chain.id.0, chain.name, chain.explorer, contract);
            }
            return Ok(());
        }
        Commands::Explorer { tx_hash } => {
            println!("{}", chains::explorer_url(cli.chain_id.map(ChainId), tx_hash));
            return Ok(());
        }
        _ => {}
    }

    let app = App::start(&cli).await?;
    match &cli.command {
        Commands::Create { amount, count, random } => app.create(amount, count, *random).await,
        Commands::Query { id } => app.query(id).await,
        Commands::Claim { id } => app.claim(id).await,
        Commands::History { created, claimed } => app.history(*created, *claimed).await,
        Commands::Chains | Commands::Explorer { .. } => Ok(()),
    }
}

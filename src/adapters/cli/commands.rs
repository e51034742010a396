//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the jup-swap client.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::adapters::jupiter::{JupiterClient, PriceRequest, QuoteRequest};
use crate::adapters::solana::{SolanaClient, WalletManager};
use crate::application::{CancelToken, SwapExecutor, SwapOrchestrator};
use crate::config::{load_config, Config};
use crate::domain::{ExecutionReport, ReportStatus, Route, TxOutcome};

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// jup-swap - Jupiter swap client for Solana
#[derive(Parser, Debug)]
#[command(
    name = "jup-swap",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Quote and execute token swaps on Solana through the Jupiter aggregator",
    long_about = "jup-swap fetches the best Jupiter route for a token pair, signs the \
                  returned setup/swap/cleanup transactions with a fresh blockhash each, \
                  and submits them in order, reporting exactly what was committed."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get routes for a token swap
    Quote(QuoteCmd),

    /// Get the price of an amount of one token in another
    Price(PriceCmd),

    /// Show which tokens a mint can be routed to
    RouteMap(RouteMapCmd),

    /// Execute a token swap
    Swap(SwapCmd),
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Quote(cmd) => &cmd.config,
            Command::Price(cmd) => &cmd.config,
            Command::RouteMap(cmd) => &cmd.config,
            Command::Swap(cmd) => &cmd.config,
        }
    }
}

/// Get swap quote
#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input token (SOL, USDC or a mint address)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token (SOL, USDC or a mint address)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount in the input token's base units (lamports for SOL)
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,

    /// Slippage tolerance in percent, overriding the config
    #[arg(long, value_name = "PCT")]
    pub slippage: Option<f64>,

    /// Only use direct routes (no multi-hop)
    #[arg(long)]
    pub direct_only: bool,

    /// Number of routes to show
    #[arg(long, value_name = "N", default_value = "3")]
    pub limit: usize,
}

/// Get price
#[derive(Parser, Debug)]
pub struct PriceCmd {
    /// Input token (SOL, USDC or a mint address)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token (SOL, USDC or a mint address)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount in the input token's base units
    #[arg(value_name = "AMOUNT", default_value = "1")]
    pub amount: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,
}

/// Show route map
#[derive(Parser, Debug)]
pub struct RouteMapCmd {
    /// Token to list destinations for (SOL, USDC or a mint address)
    #[arg(value_name = "TOKEN")]
    pub token: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,

    /// Only direct routes
    #[arg(long)]
    pub direct_only: bool,
}

/// Execute swap
#[derive(Parser, Debug)]
pub struct SwapCmd {
    /// Input token (SOL, USDC or a mint address)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token (SOL, USDC or a mint address)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount in the input token's base units (lamports for SOL)
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/mainnet.toml")]
    pub config: PathBuf,

    /// Slippage tolerance in percent, overriding the config
    #[arg(long, value_name = "PCT")]
    pub slippage: Option<f64>,

    /// Confirm swap without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Only use direct routes (no multi-hop)
    #[arg(long)]
    pub direct_only: bool,

    /// Fetch and decode the transactions without sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_config(app.command.config_path()).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            app.command.config_path().display()
        )
    })?;

    // Initialize logging based on flags, falling back to the config level
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Quote(cmd) => quote_command(cmd, &config).await,
        Command::Price(cmd) => price_command(cmd, &config).await,
        Command::RouteMap(cmd) => route_map_command(cmd, &config).await,
        Command::Swap(cmd) => swap_command(cmd, &config).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Resolve a token symbol or mint address to a mint address
pub fn resolve_mint(token: &str) -> Result<String> {
    match token.to_uppercase().as_str() {
        "SOL" | "WSOL" => Ok(SOL_MINT.to_string()),
        "USDC" => Ok(USDC_MINT.to_string()),
        _ => {
            Pubkey::from_str(token)
                .with_context(|| format!("Unknown token '{}': expected SOL, USDC or a mint address", token))?;
            Ok(token.to_string())
        }
    }
}

fn build_quote_request(
    config: &Config,
    input: &str,
    output: &str,
    amount: u64,
    slippage: Option<f64>,
    direct_only: bool,
) -> Result<QuoteRequest> {
    if amount == 0 {
        bail!("Amount must be greater than zero");
    }

    let slippage = slippage.unwrap_or(config.jupiter.slippage_pct);
    if !(slippage > 0.0 && slippage <= 100.0) {
        bail!("Slippage must be between 0 and 100 percent, got {}", slippage);
    }

    let mut request = QuoteRequest::new(resolve_mint(input)?, resolve_mint(output)?, amount, slippage)
        .with_direct_routes(direct_only || config.jupiter.only_direct_routes);
    if let Some(fee_bps) = config.jupiter.fee_bps {
        request = request.with_fee_bps(fee_bps);
    }
    Ok(request)
}

fn build_orchestrator(config: &Config) -> Result<SwapOrchestrator<JupiterClient, SolanaClient>> {
    let jupiter = JupiterClient::with_config(config.jupiter_config())
        .context("Failed to create Jupiter client")?;
    let solana = SolanaClient::new(config.solana.get_rpc_url())
        .with_poll_interval(config.solana.poll_interval());
    let executor = SwapExecutor::new(solana, config.execution_config());

    Ok(SwapOrchestrator::new(jupiter, executor).with_options(config.swap_options()))
}

/// Load the signing wallet: WALLET_PRIVATE_KEY (base58) first, then the keypair file
fn load_wallet(config: &Config) -> Result<WalletManager> {
    if let Ok(secret) = std::env::var("WALLET_PRIVATE_KEY") {
        if !secret.trim().is_empty() {
            return WalletManager::from_base58(&secret)
                .context("WALLET_PRIVATE_KEY is set but is not a valid base58 keypair");
        }
    }

    let keypair_path = config.solana.get_keypair_path();
    if !Path::new(&keypair_path).exists() {
        bail!(
            "Wallet file not found: {}\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or set WALLET_PRIVATE_KEY, or update 'keypair_path' in your config",
            keypair_path,
            keypair_path
        );
    }

    WalletManager::from_file(&keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path,
            e
        )
    })
}

fn print_route(rank: usize, route: &Route) {
    println!("  #{} {}", rank + 1, route.path_label());
    println!("     In:  {}", route.in_amount);
    println!("     Out: {} (min {} after slippage)", route.out_amount, route.out_amount_with_slippage);
    println!("     Price impact: {:.4}%", route.price_impact_pct * 100.0);
    if route.has_liquidity_gap() {
        println!("     Warning: a hop reports insufficient liquidity");
    }
}

/// Render the per-role outcome of a swap attempt
pub fn format_report(report: &ExecutionReport) -> String {
    let mut out = String::new();
    for entry in report.entries() {
        let line = match &entry.outcome {
            TxOutcome::Confirmed { signature } => format!("confirmed  {}", signature),
            TxOutcome::Failed { stage, error } if error.is_ambiguous() => {
                format!("UNKNOWN    at {} stage: {}", stage, error)
            }
            TxOutcome::Failed { stage, error } => format!("FAILED     at {} stage: {}", stage, error),
            TxOutcome::NotAttempted => "not attempted".to_string(),
        };
        out.push_str(&format!("  [{}] {:<8} {}\n", entry.index, entry.role.as_str(), line));
    }

    let status = match report.status() {
        ReportStatus::Completed => "completed",
        ReportStatus::PartiallyCompleted => "PARTIALLY completed (earlier transactions are committed)",
        ReportStatus::FailedBeforeCommit => "failed before any transaction was committed",
    };
    let elapsed = report.finished_at - report.started_at;
    out.push_str(&format!(
        "Swap {} in {:.1}s\n",
        status,
        elapsed.num_milliseconds() as f64 / 1000.0
    ));
    out
}

/// Handle quote command
async fn quote_command(cmd: QuoteCmd, config: &Config) -> Result<()> {
    tracing::info!("Fetching quote: {} -> {}", cmd.input_token, cmd.output_token);

    let request = build_quote_request(
        config,
        &cmd.input_token,
        &cmd.output_token,
        cmd.amount,
        cmd.slippage,
        cmd.direct_only,
    )?;
    let orchestrator = build_orchestrator(config)?;
    let quote = orchestrator.quote(&request).await.context("Failed to fetch quote")?;

    println!(
        "Quote for {} {} -> {} ({} routes, {:.3}s)",
        cmd.amount,
        cmd.input_token,
        cmd.output_token,
        quote.routes.len(),
        quote.time_taken
    );
    println!("  Slippage: {}%", request.slippage);
    for (rank, route) in quote.routes.iter().take(cmd.limit.max(1)).enumerate() {
        print_route(rank, route);
    }

    Ok(())
}

/// Handle price command
async fn price_command(cmd: PriceCmd, config: &Config) -> Result<()> {
    let request = PriceRequest::new(
        resolve_mint(&cmd.input_token)?,
        resolve_mint(&cmd.output_token)?,
        cmd.amount,
    );
    let orchestrator = build_orchestrator(config)?;
    let price = orchestrator.price(&request).await.context("Failed to fetch price")?;

    let data = price.data;
    let symbol = |reported: &str, given: &str| {
        if reported.is_empty() { given.to_string() } else { reported.to_string() }
    };
    println!(
        "{} {} = {} {}",
        data.amount,
        symbol(&data.input_symbol, &cmd.input_token),
        data.price,
        symbol(&data.output_symbol, &cmd.output_token)
    );

    Ok(())
}

/// Handle route-map command
async fn route_map_command(cmd: RouteMapCmd, config: &Config) -> Result<()> {
    let orchestrator = build_orchestrator(config)?;
    let map = orchestrator
        .route_map(cmd.direct_only)
        .await
        .context("Failed to fetch route map")?;

    match cmd.token {
        Some(token) => {
            let mint = resolve_mint(&token)?;
            let destinations = map.destinations(&mint);
            println!("{} routes to {} mints", token, destinations.len());
            for dest in destinations {
                println!("  {}", dest);
            }
        }
        None => {
            println!("Route map covers {} input mints ({} known mints)", map.len(), map.mint_keys.len());
        }
    }

    Ok(())
}

/// Handle swap command
async fn swap_command(cmd: SwapCmd, config: &Config) -> Result<()> {
    tracing::info!("Preparing swap: {} -> {}", cmd.input_token, cmd.output_token);

    let request = build_quote_request(
        config,
        &cmd.input_token,
        &cmd.output_token,
        cmd.amount,
        cmd.slippage,
        cmd.direct_only,
    )?;
    let wallet = load_wallet(config)?;
    let orchestrator = build_orchestrator(config)?;

    println!("Swap: {} {} -> {}", cmd.amount, cmd.input_token, cmd.output_token);
    println!("  Wallet: {}", wallet.public_key());
    println!("  Slippage: {}%", request.slippage);
    println!("  Commitment: {}", config.solana.commitment);

    if cmd.dry_run {
        let quote = orchestrator.quote(&request).await.context("Failed to fetch quote")?;
        let route = quote
            .best_route()
            .context("Quote returned no routes")?;
        print_route(0, route);

        let bundle = orchestrator
            .prepare(route, &wallet.pubkey())
            .await
            .context("Failed to prepare swap transactions")?;
        println!("\nDRY RUN - {} transaction(s) decoded, nothing sent:", bundle.len());
        for (role, tx) in bundle.iter() {
            println!(
                "  {:<8} {} instruction(s), {} signer(s)",
                role.as_str(),
                tx.instruction_count(),
                tx.required_signers().len()
            );
        }
        return Ok(());
    }

    if !cmd.yes && !confirm_prompt()? {
        println!("Aborted.");
        return Ok(());
    }

    // Ctrl+C stops before the next network call; an in-flight wait is abandoned
    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling swap");
            on_signal.cancel();
        }
    });

    let attempt = orchestrator
        .swap(&request, wallet.pubkey(), &wallet, &cancel)
        .await
        .context("Swap failed before any transaction was sent")?;

    println!("\nRoute: {}", attempt.route.path_label());
    print!("{}", format_report(&attempt.report));

    if let Some(halt) = attempt.report.halt_error() {
        if let Some(signature) = halt.cause.in_flight_signature() {
            println!("  Check {} before retrying; it may still land.", signature);
        }
        return Err(halt).context("Swap halted");
    }

    Ok(())
}

fn confirm_prompt() -> Result<bool> {
    use std::io::{self, Write};

    print!("\nProceed with swap? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

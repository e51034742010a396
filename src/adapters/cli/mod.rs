//! CLI Adapter
//!
//! Command-line interface for the jup-swap client.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    format_report, resolve_mint, CliApp, Command, PriceCmd, QuoteCmd, RouteMapCmd, SwapCmd,
    SOL_MINT, USDC_MINT,
};

use anyhow::Result;

/// Initialize the CLI application
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}

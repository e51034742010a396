//! jup-swap - Jupiter swap client for Solana
//!
//! Quote, price and execute token swaps through the Jupiter aggregator.

use anyhow::Result;

use jup_swap::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}

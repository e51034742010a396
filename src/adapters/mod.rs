//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: DEX aggregator API client
//! - Solana: RPC client and wallet management
//! - CLI: Command-line interface handlers

pub mod jupiter;
pub mod solana;
pub mod cli;

pub use jupiter::JupiterClient;
pub use solana::{SolanaClient, WalletManager};
pub use cli::CliApp;

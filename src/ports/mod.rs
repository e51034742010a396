//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Route and transaction provision (Jupiter)
//! - Blockhash, submission and confirmation (Solana RPC)

pub mod aggregator;
pub mod network;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use aggregator::{AggregatorPort, FetchError};
pub use network::{CommitmentLevel, NetworkError, NetworkPort};

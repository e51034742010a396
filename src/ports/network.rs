use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Transaction failed on-chain: {0}")]
    TransactionFailed(String),
    #[error("Timeout waiting for confirmation")]
    ConfirmationTimeout,
}

/// How settled a transaction must be before it counts as confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl CommitmentLevel {
    pub fn to_config(self) -> CommitmentConfig {
        match self {
            CommitmentLevel::Processed => CommitmentConfig::processed(),
            CommitmentLevel::Confirmed => CommitmentConfig::confirmed(),
            CommitmentLevel::Finalized => CommitmentConfig::finalized(),
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

impl FromStr for CommitmentLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processed" => Ok(CommitmentLevel::Processed),
            "confirmed" => Ok(CommitmentLevel::Confirmed),
            "finalized" => Ok(CommitmentLevel::Finalized),
            other => Err(format!(
                "unknown commitment level '{}' (expected processed, confirmed or finalized)",
                other
            )),
        }
    }
}

/// The slice of the Solana RPC surface the swap pipeline needs
#[async_trait]
pub trait NetworkPort: Send + Sync {
    /// Fetch a blockhash recent enough to sign against
    async fn latest_blockhash(&self, commitment: CommitmentLevel) -> Result<Hash, NetworkError>;

    /// Send a signed transaction; returns its signature.
    /// Preflight runs at `commitment`, the level its blockhash was fetched at.
    async fn submit(
        &self,
        transaction: &VersionedTransaction,
        commitment: CommitmentLevel,
    ) -> Result<Signature, NetworkError>;

    /// Wait until `signature` reaches `commitment`, or give up after `timeout`
    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
        timeout: Duration,
    ) -> Result<(), NetworkError>;
}

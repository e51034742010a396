use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::ports::network::{CommitmentLevel, NetworkError, NetworkPort};

/// Default interval between signature status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
    poll_interval: Duration,
}

impl SolanaClient {
    /// Create a new Solana RPC client
    pub fn new(rpc_url: String) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()));
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the interval between confirmation polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn rpc_url(&self) -> String {
        self.client.url()
    }

    /// Current status of one signature; `None` if the cluster hasn't seen it
    async fn signature_status(
        &self,
        signature: Signature,
    ) -> Result<Option<TransactionStatus>, NetworkError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_signature_statuses(&[signature])
                .map(|response| response.value.into_iter().next().flatten())
                .map_err(|e| NetworkError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| NetworkError::RpcError(format!("Task join error: {}", e)))?
    }
}

/// Preflight must simulate against a bank that knows the blockhash, so it runs
/// at the same commitment the blockhash was fetched at
fn send_config(commitment: CommitmentLevel) -> RpcSendTransactionConfig {
    RpcSendTransactionConfig {
        preflight_commitment: Some(commitment.to_config().commitment),
        ..RpcSendTransactionConfig::default()
    }
}

fn submission_error(err: ClientError) -> NetworkError {
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => NetworkError::RpcError(err.to_string()),
        _ => NetworkError::Rejected(err.to_string()),
    }
}

#[async_trait]
impl NetworkPort for SolanaClient {
    async fn latest_blockhash(&self, commitment: CommitmentLevel) -> Result<Hash, NetworkError> {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_latest_blockhash_with_commitment(commitment.to_config())
                .map(|(blockhash, _last_valid_height)| blockhash)
                .map_err(|e| NetworkError::RpcError(e.to_string()))
        })
        .await
        .map_err(|e| NetworkError::RpcError(format!("Task join error: {}", e)))?
    }

    async fn submit(
        &self,
        transaction: &VersionedTransaction,
        commitment: CommitmentLevel,
    ) -> Result<Signature, NetworkError> {
        let tx = transaction.clone();
        let client = Arc::clone(&self.client);

        // Stale blockhashes and failing simulations are rejected here rather than on-chain
        tokio::task::spawn_blocking(move || {
            client
                .send_transaction_with_config(&tx, send_config(commitment))
                .map_err(submission_error)
        })
        .await
        .map_err(|e| NetworkError::RpcError(format!("Task join error: {}", e)))?
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
        timeout: Duration,
    ) -> Result<(), NetworkError> {
        let deadline = Instant::now() + timeout;
        let target = commitment.to_config();

        loop {
            match self.signature_status(*signature).await {
                Ok(Some(status)) => {
                    if let Some(err) = status.err {
                        return Err(NetworkError::TransactionFailed(err.to_string()));
                    }
                    if status.satisfies_commitment(target) {
                        return Ok(());
                    }
                    tracing::debug!(
                        "{} at {:?}, waiting for {}",
                        signature,
                        status.confirmation_status,
                        commitment
                    );
                }
                Ok(None) => tracing::debug!("{} not yet visible", signature),
                // A failed poll says nothing about the transaction itself
                Err(e) => tracing::warn!("Status poll for {} failed: {}", signature, e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(NetworkError::ConfirmationTimeout);
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

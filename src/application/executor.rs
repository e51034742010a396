//! Swap Executor
//!
//! Drives a decoded bundle through blockhash, sign, submit and confirm,
//! one transaction at a time in role order. The first failure halts the
//! attempt; later roles are reported as not attempted and nothing already
//! committed is undone.

use chrono::Utc;
use solana_sdk::{hash::Hash, signature::Signature};
use std::time::Duration;

use crate::domain::{
    sign_transaction, DecodedTransaction, ExecutionReport, RoleReport, SignerSelector, Stage,
    StepError, SwapTransactions, TxOutcome, TxRole,
};
use crate::ports::network::{CommitmentLevel, NetworkError, NetworkPort};
use super::cancel::CancelToken;

/// Settings for one execution run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Commitment a transaction must reach to count as confirmed
    pub commitment: CommitmentLevel,
    /// Upper bound on each confirmation wait
    pub confirmation_timeout: Duration,
}

impl ExecutionConfig {
    pub fn new(confirmation_timeout: Duration) -> Self {
        Self {
            commitment: CommitmentLevel::default(),
            confirmation_timeout,
        }
    }

    pub fn with_commitment(mut self, commitment: CommitmentLevel) -> Self {
        self.commitment = commitment;
        self
    }
}

/// Where a single transaction is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxState {
    Pending,
    BlockhashFetched { blockhash: Hash },
    Signed { signature: Signature },
    Submitted { signature: Signature },
    Confirmed { signature: Signature },
    Failed { stage: Stage, error: StepError },
}

impl TxState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxState::Confirmed { .. } | TxState::Failed { .. })
    }

    fn failed(stage: Stage, error: StepError) -> Self {
        TxState::Failed { stage, error }
    }
}

/// State machine for one transaction of a bundle.
///
/// Each call to [`step`](Self::step) performs exactly one transition.
/// Terminal states are absorbing.
pub struct TxExecution<'a, N: ?Sized, S: ?Sized> {
    index: usize,
    role: TxRole,
    tx: DecodedTransaction,
    state: TxState,
    network: &'a N,
    signer: &'a S,
    config: &'a ExecutionConfig,
    cancel: &'a CancelToken,
}

impl<'a, N, S> TxExecution<'a, N, S>
where
    N: NetworkPort + ?Sized,
    S: SignerSelector + ?Sized,
{
    pub fn new(
        index: usize,
        role: TxRole,
        tx: DecodedTransaction,
        network: &'a N,
        signer: &'a S,
        config: &'a ExecutionConfig,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            index,
            role,
            tx,
            state: TxState::Pending,
            network,
            signer,
            config,
            cancel,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn role(&self) -> TxRole {
        self.role
    }

    pub fn state(&self) -> &TxState {
        &self.state
    }

    pub fn transaction(&self) -> &DecodedTransaction {
        &self.tx
    }

    /// Advance by one transition and return the new state
    pub async fn step(&mut self) -> &TxState {
        let next = match self.state.clone() {
            TxState::Pending => self.fetch_blockhash().await,
            TxState::BlockhashFetched { blockhash } => self.sign(blockhash),
            TxState::Signed { .. } => self.submit().await,
            TxState::Submitted { signature } => self.confirm(signature).await,
            terminal => terminal,
        };

        tracing::debug!("{} #{}: {:?}", self.role, self.index, next);
        self.state = next;
        &self.state
    }

    /// Step until confirmed or failed
    pub async fn run_to_completion(&mut self) -> TxOutcome {
        loop {
            match self.step().await {
                TxState::Confirmed { signature } => {
                    return TxOutcome::Confirmed { signature: *signature };
                }
                TxState::Failed { stage, error } => {
                    return TxOutcome::Failed {
                        stage: *stage,
                        error: error.clone(),
                    };
                }
                _ => continue,
            }
        }
    }

    async fn fetch_blockhash(&self) -> TxState {
        if self.cancel.is_cancelled() {
            return TxState::failed(Stage::Blockhash, StepError::Cancelled);
        }

        match self.network.latest_blockhash(self.config.commitment).await {
            Ok(blockhash) => TxState::BlockhashFetched { blockhash },
            Err(e) => TxState::failed(Stage::Blockhash, StepError::Fetch(e.to_string())),
        }
    }

    fn sign(&mut self, blockhash: Hash) -> TxState {
        match sign_transaction(&mut self.tx, blockhash, self.signer) {
            Ok(signature) => TxState::Signed { signature },
            Err(e) => TxState::failed(Stage::Sign, e.into()),
        }
    }

    async fn submit(&self) -> TxState {
        if self.cancel.is_cancelled() {
            return TxState::failed(Stage::Submit, StepError::Cancelled);
        }

        match self
            .network
            .submit(self.tx.as_versioned(), self.config.commitment)
            .await
        {
            Ok(signature) => TxState::Submitted { signature },
            Err(e) => TxState::failed(Stage::Submit, StepError::Submission(e.to_string())),
        }
    }

    async fn confirm(&self, signature: Signature) -> TxState {
        let timeout = self.config.confirmation_timeout;
        // The port is asked to honour the timeout; the outer bound holds even if it doesn't
        let wait = tokio::time::timeout(
            timeout,
            self.network
                .await_confirmation(&signature, self.config.commitment, timeout),
        );

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => TxState::failed(
                Stage::Confirm,
                StepError::CancelledAwaitingConfirmation { signature },
            ),
            result = wait => match result {
                Ok(Ok(())) => TxState::Confirmed { signature },
                Ok(Err(NetworkError::ConfirmationTimeout)) | Err(_) => TxState::failed(
                    Stage::Confirm,
                    StepError::ConfirmationTimeout { signature, timeout },
                ),
                Ok(Err(e)) => TxState::failed(Stage::Confirm, StepError::Submission(e.to_string())),
            },
        }
    }
}

/// Sequential executor for decoded swap bundles
pub struct SwapExecutor<N> {
    network: N,
    config: ExecutionConfig,
}

impl<N: NetworkPort> SwapExecutor<N> {
    pub fn new(network: N, config: ExecutionConfig) -> Self {
        Self { network, config }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run every present transaction in role order.
    ///
    /// Never returns early: the report always holds one entry per present
    /// role, so a caller can see exactly what was committed.
    pub async fn execute<S>(
        &self,
        bundle: SwapTransactions<DecodedTransaction>,
        signer: &S,
        cancel: &CancelToken,
    ) -> ExecutionReport
    where
        S: SignerSelector + ?Sized,
    {
        let started_at = Utc::now();
        let total = bundle.len();
        let mut entries = Vec::with_capacity(total);
        let mut halted = false;

        tracing::info!(
            "Executing {} transaction(s) at {} commitment",
            total,
            self.config.commitment
        );

        for (index, (role, tx)) in bundle.into_ordered().into_iter().enumerate() {
            if halted {
                entries.push(RoleReport {
                    index,
                    role,
                    outcome: TxOutcome::NotAttempted,
                });
                continue;
            }

            tracing::info!("[{}/{}] {} transaction", index + 1, total, role);
            let mut execution =
                TxExecution::new(index, role, tx, &self.network, signer, &self.config, cancel);
            let outcome = execution.run_to_completion().await;

            match &outcome {
                TxOutcome::Confirmed { signature } => {
                    tracing::info!("{} transaction confirmed: {}", role, signature);
                }
                TxOutcome::Failed { stage, error } => {
                    halted = true;
                    if error.is_ambiguous() {
                        tracing::warn!("{} transaction outcome unknown ({} stage): {}", role, stage, error);
                    } else {
                        tracing::error!("{} transaction failed at {} stage: {}", role, stage, error);
                    }
                }
                TxOutcome::NotAttempted => {}
            }

            entries.push(RoleReport { index, role, outcome });
        }

        ExecutionReport::new(entries, started_at, Utc::now())
    }
}

//! Execution Outcomes
//!
//! Per-transaction results and the report for one swap attempt. A report is a
//! plain value: it can be built, inspected and tested without running the
//! pipeline that normally produces it.

use chrono::{DateTime, Utc};
use solana_sdk::signature::Signature;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::role::TxRole;
use super::signer::SigningError;

/// Pipeline stage a transaction failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Blockhash,
    Sign,
    Submit,
    Confirm,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Blockhash => "blockhash",
            Stage::Sign => "sign",
            Stage::Submit => "submit",
            Stage::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

/// Why a single transaction stopped
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Blockhash fetch failed: {0}")]
    Fetch(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Confirmation of {signature} not observed within {timeout:?}; transaction may still land")]
    ConfirmationTimeout { signature: Signature, timeout: Duration },

    #[error("Cancelled before submission")]
    Cancelled,

    #[error("Cancelled while awaiting confirmation of {signature}; transaction may still land")]
    CancelledAwaitingConfirmation { signature: Signature },
}

impl StepError {
    /// True when the transaction was sent and its fate is unknown
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            StepError::ConfirmationTimeout { .. } | StepError::CancelledAwaitingConfirmation { .. }
        )
    }

    /// Signature of the in-flight transaction, if it was submitted
    pub fn in_flight_signature(&self) -> Option<&Signature> {
        match self {
            StepError::ConfirmationTimeout { signature, .. }
            | StepError::CancelledAwaitingConfirmation { signature } => Some(signature),
            _ => None,
        }
    }
}

/// Terminal result for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed { signature: Signature },
    Failed { stage: Stage, error: StepError },
    /// An earlier transaction failed, so this one was never started
    NotAttempted,
}

impl TxOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TxOutcome::Confirmed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TxOutcome::Failed { .. })
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            TxOutcome::Confirmed { signature } => Some(signature),
            _ => None,
        }
    }
}

/// Outcome of one role within an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReport {
    /// Position among the present transactions (0-based)
    pub index: usize,
    pub role: TxRole,
    pub outcome: TxOutcome,
}

/// Overall shape of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// Every present transaction confirmed
    Completed,
    /// Some transactions committed on-chain before a later one failed
    PartiallyCompleted,
    /// The first transaction failed; nothing was committed
    FailedBeforeCommit,
}

/// The error handed to the caller when an attempt halts early
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{role} transaction (#{index}) failed at {stage} stage: {cause}")]
pub struct HaltError {
    pub index: usize,
    pub role: TxRole,
    pub stage: Stage,
    #[source]
    pub cause: StepError,
    /// Transactions already committed on-chain, in order
    pub committed: Vec<(TxRole, Signature)>,
    /// Roles after the failing one that were never started
    pub not_attempted: Vec<TxRole>,
}

impl HaltError {
    /// True when earlier transactions were committed before the halt
    pub fn is_partial(&self) -> bool {
        !self.committed.is_empty()
    }
}

/// Ordered outcomes for one swap attempt
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    entries: Vec<RoleReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    pub fn new(entries: Vec<RoleReport>, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        Self {
            entries,
            started_at,
            finished_at,
        }
    }

    pub fn entries(&self) -> &[RoleReport] {
        &self.entries
    }

    pub fn outcome(&self, role: TxRole) -> Option<&TxOutcome> {
        self.entries.iter().find(|e| e.role == role).map(|e| &e.outcome)
    }

    /// The entry that halted the attempt, if any
    pub fn failure(&self) -> Option<&RoleReport> {
        self.entries.iter().find(|e| e.outcome.is_failed())
    }

    pub fn status(&self) -> ReportStatus {
        match self.failure() {
            None => ReportStatus::Completed,
            Some(_) if self.entries.iter().any(|e| e.outcome.is_confirmed()) => {
                ReportStatus::PartiallyCompleted
            }
            Some(_) => ReportStatus::FailedBeforeCommit,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ReportStatus::Completed
    }

    /// Confirmed transactions, in submission order
    pub fn confirmed(&self) -> Vec<(TxRole, Signature)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.signature().map(|s| (e.role, *s)))
            .collect()
    }

    /// Roles not confirmed: the failed one and everything after it.
    ///
    /// This is the suffix a caller may choose to retry. Check
    /// [`StepError::is_ambiguous`] on the failure first; an ambiguous
    /// transaction may already have landed.
    pub fn unconfirmed_roles(&self) -> Vec<TxRole> {
        self.entries
            .iter()
            .filter(|e| !e.outcome.is_confirmed())
            .map(|e| e.role)
            .collect()
    }

    pub fn halt_error(&self) -> Option<HaltError> {
        let failed = self.failure()?;
        let TxOutcome::Failed { stage, error } = &failed.outcome else {
            return None;
        };

        Some(HaltError {
            index: failed.index,
            role: failed.role,
            stage: *stage,
            cause: error.clone(),
            committed: self.confirmed(),
            not_attempted: self
                .entries
                .iter()
                .filter(|e| e.outcome == TxOutcome::NotAttempted)
                .map(|e| e.role)
                .collect(),
        })
    }

    /// Signatures of all transactions, or the halt that stopped them
    pub fn into_result(self) -> Result<Vec<Signature>, HaltError> {
        match self.halt_error() {
            Some(halt) => Err(halt),
            None => Ok(self.confirmed().into_iter().map(|(_, sig)| sig).collect()),
        }
    }
}

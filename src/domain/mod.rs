//! Domain Layer - Core types for the swap execution pipeline
//!
//! Pure types and logic with no network access. All external interactions
//! happen through the ports layer.
//!
//! - `role`: setup/swap/cleanup roles and the role-keyed bundle
//! - `route`: routes and market hops returned by the aggregator
//! - `decoder`: base64 payload to structured transaction
//! - `signer`: blockhash binding and signing
//! - `outcome`: per-transaction outcomes and the attempt report

pub mod role;
pub mod route;
pub mod decoder;
pub mod signer;
pub mod outcome;

pub use role::{SwapTransactions, TxRole};
pub use route::{Fee, MarketInfo, Route};
pub use decoder::{decode_bundle, DecodeError, DecodedTransaction};
pub use signer::{resolve_signers, sign_transaction, SignerSelector, SigningError};
pub use outcome::{
    ExecutionReport, HaltError, ReportStatus, RoleReport, Stage, StepError, TxOutcome,
};

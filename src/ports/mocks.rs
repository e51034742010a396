//! Scripted port implementations and transaction fixtures for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{v0, Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
    transaction::VersionedTransaction,
};

use super::aggregator::{AggregatorPort, FetchError};
use super::network::{CommitmentLevel, NetworkError, NetworkPort};
use crate::adapters::jupiter::{
    IndexedRouteMap, Price, PriceRequest, Quote, QuoteRequest, SwapRequest, SwapResponse,
};

/// Unsigned legacy transaction that each of `signers` must sign, first one paying fees.
pub fn unsigned_transaction(signers: &[&Pubkey]) -> VersionedTransaction {
    let instructions: Vec<Instruction> = signers
        .iter()
        .map(|from| system_instruction::transfer(from, &Pubkey::new_unique(), 1_000))
        .collect();
    let message = Message::new(&instructions, signers.first().copied());
    let required = message.header.num_required_signatures as usize;

    VersionedTransaction {
        signatures: vec![Signature::default(); required],
        message: VersionedMessage::Legacy(message),
    }
}

/// Unsigned v0 transaction paid for and signed by `payer`
pub fn unsigned_v0_transaction(payer: &Pubkey) -> VersionedTransaction {
    let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), 1_000);
    let message = v0::Message::try_compile(payer, &[ix], &[], Hash::default())
        .expect("static v0 fixture compiles");

    VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::V0(message),
    }
}

/// Base64 wire payload, as the swap API would return it
pub fn encode_payload(tx: &VersionedTransaction) -> String {
    STANDARD.encode(bincode::serialize(tx).expect("fixture serializes"))
}

pub fn unsigned_payload(signers: &[&Pubkey]) -> String {
    encode_payload(&unsigned_transaction(signers))
}

/// One recorded call against [`MockNetwork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCall {
    LatestBlockhash { returned: Option<Hash> },
    Submit { signature: Signature, blockhash: Hash, commitment: CommitmentLevel },
    AwaitConfirmation { signature: Signature, commitment: CommitmentLevel },
}

/// How the mock answers a confirmation wait
#[derive(Debug, Clone)]
pub enum ConfirmBehavior {
    Confirm,
    Fail(NetworkError),
    /// Never resolves; the caller's timeout or cancellation must end the wait
    Hang,
}

/// Network mock that records calls and fails on request.
///
/// Failures are scripted by 0-based call index per operation, so
/// `reject_submission_at(1, ..)` rejects the second transaction submitted.
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    calls: Arc<Mutex<Vec<NetworkCall>>>,
    blockhash_failures: Arc<Mutex<HashMap<usize, NetworkError>>>,
    submit_failures: Arc<Mutex<HashMap<usize, NetworkError>>>,
    confirmations: Arc<Mutex<HashMap<usize, ConfirmBehavior>>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_blockhash_at(self, call: usize, error: NetworkError) -> Self {
        self.blockhash_failures.lock().unwrap().insert(call, error);
        self
    }

    pub fn reject_submission_at(self, call: usize, error: NetworkError) -> Self {
        self.submit_failures.lock().unwrap().insert(call, error);
        self
    }

    pub fn confirmation_at(self, call: usize, behavior: ConfirmBehavior) -> Self {
        self.confirmations.lock().unwrap().insert(call, behavior);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<NetworkCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Signatures submitted, in order
    pub fn submitted(&self) -> Vec<Signature> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                NetworkCall::Submit { signature, .. } => Some(signature),
                _ => None,
            })
            .collect()
    }

    /// Blockhashes handed out, in order
    pub fn issued_blockhashes(&self) -> Vec<Hash> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                NetworkCall::LatestBlockhash { returned } => returned,
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&NetworkCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl NetworkPort for MockNetwork {
    async fn latest_blockhash(&self, _commitment: CommitmentLevel) -> Result<Hash, NetworkError> {
        let n = self.count(|c| matches!(c, NetworkCall::LatestBlockhash { .. }));
        let failure = self.blockhash_failures.lock().unwrap().remove(&n);

        let result = match failure {
            Some(err) => Err(err),
            None => Ok(Hash::new_unique()),
        };
        self.calls.lock().unwrap().push(NetworkCall::LatestBlockhash {
            returned: result.as_ref().ok().copied(),
        });
        result
    }

    async fn submit(
        &self,
        transaction: &VersionedTransaction,
        commitment: CommitmentLevel,
    ) -> Result<Signature, NetworkError> {
        let n = self.count(|c| matches!(c, NetworkCall::Submit { .. }));
        let signature = transaction.signatures.first().copied().unwrap_or_default();
        self.calls.lock().unwrap().push(NetworkCall::Submit {
            signature,
            blockhash: *transaction.message.recent_blockhash(),
            commitment,
        });

        if let Some(err) = self.submit_failures.lock().unwrap().remove(&n) {
            return Err(err);
        }
        if !transaction.verify_with_results().iter().all(|ok| *ok) {
            return Err(NetworkError::Rejected("signature verification failure".into()));
        }
        Ok(signature)
    }

    async fn await_confirmation(
        &self,
        signature: &Signature,
        commitment: CommitmentLevel,
        _timeout: Duration,
    ) -> Result<(), NetworkError> {
        let n = self.count(|c| matches!(c, NetworkCall::AwaitConfirmation { .. }));
        self.calls.lock().unwrap().push(NetworkCall::AwaitConfirmation {
            signature: *signature,
            commitment,
        });

        let behavior = self
            .confirmations
            .lock()
            .unwrap()
            .get(&n)
            .cloned()
            .unwrap_or(ConfirmBehavior::Confirm);

        match behavior {
            ConfirmBehavior::Confirm => Ok(()),
            ConfirmBehavior::Fail(err) => Err(err),
            ConfirmBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Aggregator mock serving fixed responses and recording calls
#[derive(Debug, Clone, Default)]
pub struct StaticAggregator {
    quote: Option<Quote>,
    swap: Option<SwapResponse>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_swap_response(mut self, response: SwapResponse) -> Self {
        self.swap = Some(response);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn not_configured() -> FetchError {
        FetchError::ApiError {
            status: 404,
            body: "No response configured".to_string(),
        }
    }
}

#[async_trait]
impl AggregatorPort for StaticAggregator {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("quote {} -> {}", request.input_mint, request.output_mint));
        self.quote.clone().ok_or_else(Self::not_configured)
    }

    async fn get_swap_transactions(&self, request: &SwapRequest) -> Result<SwapResponse, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("swap {}", request.user_public_key));
        self.swap.clone().ok_or_else(Self::not_configured)
    }

    async fn get_price(&self, request: &PriceRequest) -> Result<Price, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("price {} -> {}", request.input_mint, request.output_mint));
        Err(Self::not_configured())
    }

    async fn get_indexed_route_map(&self, _only_direct_routes: bool) -> Result<IndexedRouteMap, FetchError> {
        self.calls.lock().unwrap().push("route-map".to_string());
        Err(Self::not_configured())
    }
}

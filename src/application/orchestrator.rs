//! Swap Orchestrator
//!
//! Wires the aggregator to the executor for one swap attempt:
//! quote, take the first route, fetch its transactions, decode them all,
//! then execute. Nothing touches the network RPC until every payload decodes.

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use crate::adapters::jupiter::{IndexedRouteMap, Price, PriceRequest, Quote, QuoteRequest, SwapRequest};
use crate::domain::{
    decode_bundle, DecodeError, DecodedTransaction, ExecutionReport, HaltError, Route,
    SignerSelector, SwapTransactions, TxRole,
};
use crate::ports::aggregator::{AggregatorPort, FetchError};
use crate::ports::network::NetworkPort;
use super::cancel::CancelToken;
use super::executor::SwapExecutor;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Aggregator request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Failed to decode {role} transaction: {source}")]
    Decode {
        role: TxRole,
        #[source]
        source: DecodeError,
    },
    #[error("Aggregator returned no transactions for the route")]
    EmptyBundle,
    #[error("Cancelled before any transaction was sent")]
    Cancelled,
    #[error(transparent)]
    Halted(#[from] HaltError),
}

/// Optional swap request parameters passed through to the aggregator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwapOptions {
    pub wrap_unwrap_sol: Option<bool>,
    pub fee_account: Option<String>,
    pub token_ledger: Option<String>,
}

impl SwapOptions {
    fn apply(&self, mut request: SwapRequest) -> SwapRequest {
        if let Some(wrap) = self.wrap_unwrap_sol {
            request = request.with_wrap_unwrap_sol(wrap);
        }
        if let Some(account) = &self.fee_account {
            request = request.with_fee_account(account.clone());
        }
        if let Some(ledger) = &self.token_ledger {
            request = request.with_token_ledger(ledger.clone());
        }
        request
    }
}

/// Result of a swap attempt that reached the executor
#[derive(Debug, Clone)]
pub struct SwapAttempt {
    /// The route that was traded
    pub route: Route,
    pub report: ExecutionReport,
}

impl SwapAttempt {
    pub fn into_result(self) -> Result<Vec<Signature>, PipelineError> {
        self.report.into_result().map_err(PipelineError::Halted)
    }
}

fn no_routes(request: &QuoteRequest) -> FetchError {
    FetchError::NoRoutes {
        input_mint: request.input_mint.clone(),
        output_mint: request.output_mint.clone(),
    }
}

pub struct SwapOrchestrator<A, N> {
    aggregator: A,
    executor: SwapExecutor<N>,
    options: SwapOptions,
}

impl<A: AggregatorPort, N: NetworkPort> SwapOrchestrator<A, N> {
    pub fn new(aggregator: A, executor: SwapExecutor<N>) -> Self {
        Self {
            aggregator,
            executor,
            options: SwapOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SwapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    pub fn executor(&self) -> &SwapExecutor<N> {
        &self.executor
    }

    /// Fetch routes; an empty route list is an error
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Quote, PipelineError> {
        let quote = self.aggregator.get_quote(request).await?;
        if quote.routes.is_empty() {
            return Err(no_routes(request).into());
        }
        Ok(quote)
    }

    /// Fetch and decode the transactions for a route
    pub async fn prepare(
        &self,
        route: &Route,
        user_public_key: &Pubkey,
    ) -> Result<SwapTransactions<DecodedTransaction>, PipelineError> {
        let request = self
            .options
            .apply(SwapRequest::new(route.clone(), user_public_key.to_string()));
        let response = self.aggregator.get_swap_transactions(&request).await?;

        let payloads = response.into_bundle();
        if payloads.is_empty() {
            return Err(PipelineError::EmptyBundle);
        }

        decode_bundle(payloads).map_err(|(role, source)| PipelineError::Decode { role, source })
    }

    /// Quote, prepare and execute one swap.
    ///
    /// Returns `Ok` once execution starts, even if it halts; inspect the
    /// report or call [`SwapAttempt::into_result`].
    pub async fn swap<S>(
        &self,
        request: &QuoteRequest,
        user_public_key: Pubkey,
        signer: &S,
        cancel: &CancelToken,
    ) -> Result<SwapAttempt, PipelineError>
    where
        S: SignerSelector + ?Sized,
    {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let quote = self.quote(request).await?;
        let route = quote
            .best_route()
            .cloned()
            .ok_or_else(|| no_routes(request))?;

        tracing::info!(
            "Route: {} ({} -> {} out, {:.4}% impact)",
            route.path_label(),
            route.in_amount,
            route.out_amount,
            route.price_impact_pct * 100.0
        );
        if route.has_liquidity_gap() {
            tracing::warn!("Route reports insufficient liquidity on at least one hop");
        }

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let bundle = self.prepare(&route, &user_public_key).await?;
        tracing::info!(
            "Decoded {} transaction(s): {}",
            bundle.len(),
            bundle.roles().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
        );

        let report = self.executor.execute(bundle, signer, cancel).await;
        Ok(SwapAttempt { route, report })
    }

    pub async fn price(&self, request: &PriceRequest) -> Result<Price, PipelineError> {
        Ok(self.aggregator.get_price(request).await?)
    }

    pub async fn route_map(&self, only_direct_routes: bool) -> Result<IndexedRouteMap, PipelineError> {
        Ok(self.aggregator.get_indexed_route_map(only_direct_routes).await?)
    }
}

use async_trait::async_trait;
use thiserror::Error;

use crate::adapters::jupiter::{
    IndexedRouteMap, Price, PriceRequest, Quote, QuoteRequest, SwapRequest, SwapResponse,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("No route found for {input_mint} -> {output_mint}")]
    NoRoutes { input_mint: String, output_mint: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::ParseError(err.to_string())
        } else {
            FetchError::HttpError(err.to_string())
        }
    }
}

/// Route and transaction provider (Jupiter)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregatorPort: Send + Sync {
    /// Candidate routes for a swap, best first
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, FetchError>;

    /// Unsigned setup/swap/cleanup transactions for a chosen route
    async fn get_swap_transactions(&self, request: &SwapRequest) -> Result<SwapResponse, FetchError>;

    async fn get_price(&self, request: &PriceRequest) -> Result<Price, FetchError>;

    async fn get_indexed_route_map(&self, only_direct_routes: bool) -> Result<IndexedRouteMap, FetchError>;
}

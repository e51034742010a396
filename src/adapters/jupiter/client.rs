//! Jupiter API Client
//!
//! HTTP client for the Jupiter v1 quote API.
//! Handles quotes, swap transaction building, prices and the route map.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::ports::aggregator::{AggregatorPort, FetchError};
use super::price::{IndexedRouteMap, Price, PriceRequest};
use super::quote::{Quote, QuoteRequest};
use super::swap::{SwapRequest, SwapResponse};

const QUOTE_PATH: &str = "/v1/quote";
const SWAP_PATH: &str = "/v1/swap";
const PRICE_PATH: &str = "/v1/price";
const ROUTE_MAP_PATH: &str = "/v1/indexed-route-map";

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for Jupiter API
    pub api_base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://quote-api.jup.ag".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(JupiterConfig::default())
    }

    /// Create a new Jupiter client with custom configuration
    pub fn with_config(config: JupiterConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    /// Get candidate routes for a swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, FetchError> {
        let url = self.url(QUOTE_PATH);
        tracing::debug!("GET {} ({} -> {}, amount {})", url, request.input_mint, request.output_mint, request.amount);

        let response = self.http
            .get(&url)
            .query(&request.query_pairs())
            .send()
            .await?;

        let quote: Quote = self.handle_response(response).await?;
        tracing::debug!("Quote returned {} routes in {:.3}s", quote.routes.len(), quote.time_taken);
        Ok(quote)
    }

    /// Get the unsigned setup/swap/cleanup transactions for a route
    pub async fn get_swap_transactions(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, FetchError> {
        let url = self.url(SWAP_PATH);
        tracing::debug!("POST {} for {}", url, request.user_public_key);

        let response = self.http
            .post(&url)
            .json(request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the price of `amount` input units in output units
    pub async fn get_price(&self, request: &PriceRequest) -> Result<Price, FetchError> {
        let url = self.url(PRICE_PATH);

        let response = self.http
            .get(&url)
            .query(&request.query_pairs())
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the map of which mints route to which
    pub async fn get_indexed_route_map(
        &self,
        only_direct_routes: bool,
    ) -> Result<IndexedRouteMap, FetchError> {
        let url = self.url(ROUTE_MAP_PATH);

        let response = self.http
            .get(&url)
            .query(&[("onlyDirectRoutes", only_direct_routes.to_string())])
            .send()
            .await?;

        let map: IndexedRouteMap = self.handle_response(response).await?;
        tracing::debug!("Route map covers {} input mints", map.len());
        Ok(map)
    }

    /// Handle API response and deserialize
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl AggregatorPort for JupiterClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, FetchError> {
        JupiterClient::get_quote(self, request).await
    }

    async fn get_swap_transactions(&self, request: &SwapRequest) -> Result<SwapResponse, FetchError> {
        JupiterClient::get_swap_transactions(self, request).await
    }

    async fn get_price(&self, request: &PriceRequest) -> Result<Price, FetchError> {
        JupiterClient::get_price(self, request).await
    }

    async fn get_indexed_route_map(&self, only_direct_routes: bool) -> Result<IndexedRouteMap, FetchError> {
        JupiterClient::get_indexed_route_map(self, only_direct_routes).await
    }
}

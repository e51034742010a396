//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter v1 quote API.

use serde::{Deserialize, Serialize};

use crate::domain::Route;

/// Request parameters for getting a swap quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Amount in base units (lamports for SOL)
    pub amount: u64,
    /// Slippage tolerance in percent (1.0 = 1%)
    pub slippage: f64,
    /// Platform fee in basis points (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_bps: Option<u16>,
    /// Only use direct routes (no intermediate tokens)
    #[serde(default)]
    pub only_direct_routes: bool,
}

impl QuoteRequest {
    /// Create a new quote request with required parameters
    pub fn new(input_mint: String, output_mint: String, amount: u64, slippage: f64) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage,
            fee_bps: None,
            only_direct_routes: false,
        }
    }

    /// Set only direct routes flag
    pub fn with_direct_routes(mut self, direct: bool) -> Self {
        self.only_direct_routes = direct;
        self
    }

    /// Set platform fee
    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = Some(fee_bps);
        self
    }

    /// Query string pairs in the order the API documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippage", self.slippage.to_string()),
        ];
        if let Some(fee_bps) = self.fee_bps {
            pairs.push(("feeBps", fee_bps.to_string()));
        }
        pairs.push(("onlyDirectRoutes", self.only_direct_routes.to_string()));
        pairs
    }
}

/// Response from the quote API: candidate routes, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "data")]
    pub routes: Vec<Route>,
    /// Server-side time taken, in seconds
    #[serde(default)]
    pub time_taken: f64,
}

impl Quote {
    /// The route to trade: the first one returned. No re-ranking is done.
    pub fn best_route(&self) -> Option<&Route> {
        self.routes.first()
    }
}

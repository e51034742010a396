//! Route Types
//!
//! Priced paths returned by the Jupiter quote API. A route is read-only once
//! received and is echoed back verbatim to the swap endpoint.
//!
//! Amounts are kept as the JSON numbers the API sent. Fees in particular may be
//! fractional, and re-encoding through a fixed numeric type would alter the
//! route echoed to `/v1/swap`.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;

/// A priced path from one mint to another through one or more venues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Input amount in base units
    pub in_amount: Number,
    /// Expected output amount in base units
    pub out_amount: Number,
    /// Minimum output after slippage tolerance is applied
    pub out_amount_with_slippage: Number,
    /// Price impact percentage
    #[serde(default)]
    pub price_impact_pct: f64,
    /// Venues traversed, in order
    pub market_infos: Vec<MarketInfo>,
    /// Fields we don't model; kept so the route round-trips to /swap intact
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Route {
    /// Number of venues traversed
    pub fn hop_count(&self) -> usize {
        self.market_infos.len()
    }

    /// Venue labels joined for display, e.g. "Orca -> Raydium"
    pub fn path_label(&self) -> String {
        self.market_infos
            .iter()
            .map(|m| m.label.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// True if any hop reports insufficient liquidity
    pub fn has_liquidity_gap(&self) -> bool {
        self.market_infos.iter().any(|m| m.not_enough_liquidity)
    }

    /// Input mint of the first hop
    pub fn input_mint(&self) -> Option<&str> {
        self.market_infos.first().map(|m| m.input_mint.as_str())
    }

    /// Output mint of the last hop
    pub fn output_mint(&self) -> Option<&str> {
        self.market_infos.last().map(|m| m.output_mint.as_str())
    }

    /// Sum of LP fees charged in the given mint
    pub fn lp_fees_in(&self, mint: &str) -> f64 {
        self.market_infos
            .iter()
            .filter(|m| m.lp_fee.mint == mint)
            .filter_map(|m| m.lp_fee.amount.as_f64())
            .sum()
    }
}

/// One venue traversed by a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketInfo {
    /// Venue (AMM) identifier
    pub id: String,
    /// Human-readable venue label, e.g. "Orca"
    pub label: String,
    pub input_mint: String,
    pub output_mint: String,
    #[serde(default)]
    pub not_enough_liquidity: bool,
    pub in_amount: Number,
    pub out_amount: Number,
    #[serde(default)]
    pub price_impact_pct: f64,
    pub lp_fee: Fee,
    pub platform_fee: Fee,
}

/// Fee charged by a venue or the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    #[serde(default = "zero")]
    pub amount: Number,
    #[serde(default)]
    pub mint: String,
    #[serde(default)]
    pub pct: f64,
}

impl Default for Fee {
    fn default() -> Self {
        Self {
            amount: zero(),
            mint: String::new(),
            pct: 0.0,
        }
    }
}

fn zero() -> Number {
    Number::from(0u64)
}

//! Jupiter Price and Route Map Types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request parameters for the price API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub input_mint: String,
    pub output_mint: String,
    /// Amount in base units
    pub amount: u64,
}

impl PriceRequest {
    pub fn new(input_mint: String, output_mint: String, amount: u64) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub data: PriceData,
    #[serde(default)]
    pub time_taken: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub input_mint: String,
    #[serde(default)]
    pub input_symbol: String,
    pub output_mint: String,
    #[serde(default)]
    pub output_symbol: String,
    pub amount: u64,
    /// Output units per input unit
    pub price: f64,
}

/// Which mints can be swapped into which, by index into `mint_keys`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRouteMap {
    pub mint_keys: Vec<String>,
    pub indexed_route_map: HashMap<String, Vec<usize>>,
}

impl IndexedRouteMap {
    /// Number of input mints with at least one route
    pub fn len(&self) -> usize {
        self.indexed_route_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed_route_map.is_empty()
    }

    /// Output mints reachable from `input_mint`
    pub fn destinations(&self, input_mint: &str) -> Vec<&str> {
        let Some(index) = self.mint_keys.iter().position(|m| m == input_mint) else {
            return Vec::new();
        };

        self.indexed_route_map
            .get(&index.to_string())
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(|i| self.mint_keys.get(*i).map(String::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_route(&self, input_mint: &str, output_mint: &str) -> bool {
        self.destinations(input_mint).contains(&output_mint)
    }
}

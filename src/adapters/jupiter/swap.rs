//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter v1 swap API. The response
//! carries up to three unsigned transactions: setup, swap and cleanup.

use serde::{Deserialize, Serialize};

use crate::domain::{Route, SwapTransactions};

/// Request parameters for building swap transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// The route chosen from the quote, echoed back unchanged
    pub route: Route,
    /// Wrap/unwrap native SOL around the swap
    #[serde(rename = "wrapUnwrapSOL", skip_serializing_if = "Option::is_none")]
    pub wrap_unwrap_sol: Option<bool>,
    /// Token account receiving the platform fee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_account: Option<String>,
    /// Token ledger account, for routes that use one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_ledger: Option<String>,
    /// User's public key (wallet address)
    pub user_public_key: String,
}

impl SwapRequest {
    /// Create a new swap request with required parameters
    pub fn new(route: Route, user_public_key: String) -> Self {
        Self {
            route,
            wrap_unwrap_sol: None,
            fee_account: None,
            token_ledger: None,
            user_public_key,
        }
    }

    pub fn with_wrap_unwrap_sol(mut self, enabled: bool) -> Self {
        self.wrap_unwrap_sol = Some(enabled);
        self
    }

    pub fn with_fee_account(mut self, account: String) -> Self {
        self.fee_account = Some(account);
        self
    }

    pub fn with_token_ledger(mut self, ledger: String) -> Self {
        self.token_ledger = Some(ledger);
        self
    }
}

/// Response from the swap API. Absent roles come back missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_transaction: Option<String>,
    #[serde(default)]
    pub swap_transaction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_transaction: Option<String>,
}

impl SwapResponse {
    /// Role-keyed bundle with empty payloads dropped
    pub fn into_bundle(self) -> SwapTransactions<String> {
        SwapTransactions::from_payloads(
            self.setup_transaction,
            Some(self.swap_transaction),
            self.cleanup_transaction,
        )
    }
}

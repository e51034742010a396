//! Jupiter Adapter
//!
//! Implementation of the AggregatorPort for the Jupiter DEX aggregator.
//! Handles quote fetching, swap transaction building, prices and route maps.

mod client;
mod quote;
mod swap;
mod price;

pub use client::{JupiterClient, JupiterConfig};
pub use quote::{Quote, QuoteRequest};
pub use swap::{SwapRequest, SwapResponse};
pub use price::{IndexedRouteMap, Price, PriceData, PriceRequest};

//! jup-swap - Jupiter swap client library
//!
//! Quotes a swap through the Jupiter aggregator and executes the returned
//! setup/swap/cleanup transactions in order, each with its own fresh
//! blockhash, reporting exactly which ones were committed.
//!
//! # Modules
//!
//! - `domain`: Core types (roles, routes, decoding, signing, outcomes)
//! - `ports`: Trait abstractions (AggregatorPort, NetworkPort) and test doubles
//! - `adapters`: External implementations (Jupiter, Solana, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Executor, orchestrator and cancellation

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;

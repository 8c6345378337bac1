//! Constant-product AMM engine with multi-hop routing and bridge-token path finding.
//!
//! This library provides:
//! - Pair reserves with floor-sqrt LP share minting and protocol-fee accrual
//! - A factory registry with fee governance
//! - An atomic router for liquidity and exact-in / exact-out swaps
//! - Single-pool quoting and a single-bridge route search

pub mod aggregator;
pub mod config;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod math;
pub mod pair;
pub mod path_finder;
pub mod router;
pub mod transaction;
pub mod types;

pub use aggregator::RouterAggregator;
pub use config::AmmConfig;
pub use error::AmmError;
pub use factory::{Factory, PairHandle, PairLookup};
pub use ledger::{InMemoryLedger, LedgerChanges, StagedLedger, TokenLedger};
pub use pair::{sort_tokens, Pair, PairId};
pub use path_finder::{BridgeToken, BridgeTokens, PathFinder, PathResults, RouteDecision};
pub use router::{LiquidityAdded, Router};
pub use transaction::{Changeset, Transaction};
pub use types::{Address, Amount, TokenId, BURN_ADDRESS, MINIMUM_LIQUIDITY, U256};

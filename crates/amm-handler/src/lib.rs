//! ABI front end for the AMM router.
//!
//! Transactions addressed to the router predeploy are decoded by selector and
//! executed through the in-memory [`amm::Router`] instead of the EVM.

pub mod config;
pub mod dex;
pub mod selectors;

pub use config::HandlerConfig;
pub use dex::{DexError, DexHandler, DexResult};
pub use selectors::StarkDRouter;

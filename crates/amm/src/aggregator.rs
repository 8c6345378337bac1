//! Single-hop pool check used before any indirect route search.

use crate::config::AmmConfig;
use crate::factory::Factory;
use crate::types::{Amount, TokenId, U256};
use tracing::debug;

/// Answers whether one direct pool can fill a trade.
#[derive(Debug, Clone, Copy)]
pub struct RouterAggregator<'a> {
    factory: &'a Factory,
    config: &'a AmmConfig,
}

impl<'a> RouterAggregator<'a> {
    pub fn new(factory: &'a Factory, config: &'a AmmConfig) -> Self {
        Self { factory, config }
    }

    /// Output of the direct `token_in -> token_out` pool for `amount_in`.
    ///
    /// Zero means "no viable direct pool": the pair is missing, empty, or the
    /// quote rounds down to nothing. Never mutates state.
    pub fn get_single_best_pool(
        &self,
        amount_in: Amount,
        token_in: TokenId,
        token_out: TokenId,
    ) -> Amount {
        if token_in == token_out {
            return U256::ZERO;
        }
        let Some(pair) = self.factory.pair_by_tokens(token_in, token_out) else {
            return U256::ZERO;
        };
        match pair.quote_out(amount_in, token_in, self.config) {
            Ok(amount_out) => amount_out,
            Err(err) => {
                debug!(%token_in, %token_out, %err, "no direct quote");
                U256::ZERO
            }
        }
    }
}

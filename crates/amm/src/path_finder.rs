//! Bridge-token route discovery for pairs without a direct pool.
//!
//! The search space is a fixed quartet of liquidity hubs. Only routes with a
//! single bridge (two hops) are considered; when none exists the search
//! reports no route instead of going deeper.

use crate::aggregator::RouterAggregator;
use crate::types::{Address, Amount, TokenId, U256};
use std::fmt;
use tracing::debug;

/// One of the four bridge tokens, tagged with its wire index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BridgeToken {
    Weth = 1,
    Usdt = 2,
    Dai = 3,
    Usdc = 4,
}

impl BridgeToken {
    /// All bridges in index order.
    pub const ALL: [BridgeToken; 4] = [
        BridgeToken::Weth,
        BridgeToken::Usdt,
        BridgeToken::Dai,
        BridgeToken::Usdc,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(BridgeToken::Weth),
            2 => Some(BridgeToken::Usdt),
            3 => Some(BridgeToken::Dai),
            4 => Some(BridgeToken::Usdc),
            _ => None,
        }
    }
}

impl fmt::Display for BridgeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BridgeToken::Weth => "WETH",
            BridgeToken::Usdt => "USDT",
            BridgeToken::Dai => "DAI",
            BridgeToken::Usdc => "USDC",
        };
        f.write_str(symbol)
    }
}

/// Index to address table for the bridge tokens of one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTokens {
    pub weth: TokenId,
    pub usdt: TokenId,
    pub dai: TokenId,
    pub usdc: TokenId,
}

impl BridgeTokens {
    pub fn new(weth: TokenId, usdt: TokenId, dai: TokenId, usdc: TokenId) -> Self {
        Self {
            weth,
            usdt,
            dai,
            usdc,
        }
    }

    pub fn address(&self, bridge: BridgeToken) -> TokenId {
        match bridge {
            BridgeToken::Weth => self.weth,
            BridgeToken::Usdt => self.usdt,
            BridgeToken::Dai => self.dai,
            BridgeToken::Usdc => self.usdc,
        }
    }

    /// Reverse lookup of a bridge by token address.
    pub fn bridge_for(&self, token: TokenId) -> Option<BridgeToken> {
        BridgeToken::ALL
            .into_iter()
            .find(|bridge| self.address(*bridge) == token)
    }
}

/// Encoded output of [`PathFinder::get_results`].
///
/// Bridges are stored in reverse hop order, destination-adjacent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResults {
    path: Vec<BridgeToken>,
}

impl PathResults {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from bridges listed in hop order (source side first).
    pub fn from_hops(hops: &[BridgeToken]) -> Self {
        Self {
            path: hops.iter().rev().copied().collect(),
        }
    }

    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Bridges in stored (reverse hop) order.
    pub fn bridges(&self) -> &[BridgeToken] {
        &self.path
    }

    /// Wire indices in stored order.
    pub fn encoded(&self) -> Vec<u8> {
        self.path.iter().map(|b| b.index()).collect()
    }

    /// Decode wire indices. Unknown indices are rejected.
    pub fn decode(indices: &[u8]) -> Option<Self> {
        let path = indices
            .iter()
            .map(|i| BridgeToken::from_index(*i))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { path })
    }

    /// Full token path `token_in, bridge.., token_out`, or `None` if empty.
    pub fn to_path(
        &self,
        token_in: TokenId,
        token_out: TokenId,
        bridges: &BridgeTokens,
    ) -> Option<Vec<Address>> {
        if self.path.is_empty() {
            return None;
        }
        let mut path = Vec::with_capacity(self.path.len() + 2);
        path.push(token_in);
        path.extend(self.path.iter().rev().map(|b| bridges.address(*b)));
        path.push(token_out);
        Some(path)
    }
}

/// Terminal states of a route lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// A direct pool fills the trade.
    Direct { amount_out: Amount },
    /// A bridge route fills the trade.
    Indirect { results: PathResults, amount_out: Amount },
    /// Neither a direct pool nor a single bridge works.
    NoRoute,
}

impl RouteDecision {
    /// Explicit token path to hand to the router.
    pub fn path(
        &self,
        token_in: TokenId,
        token_out: TokenId,
        bridges: &BridgeTokens,
    ) -> Option<Vec<Address>> {
        match self {
            RouteDecision::Direct { .. } => Some(vec![token_in, token_out]),
            RouteDecision::Indirect { results, .. } => results.to_path(token_in, token_out, bridges),
            RouteDecision::NoRoute => None,
        }
    }

    pub fn amount_out(&self) -> Amount {
        match self {
            RouteDecision::Direct { amount_out } | RouteDecision::Indirect { amount_out, .. } => {
                *amount_out
            }
            RouteDecision::NoRoute => U256::ZERO,
        }
    }
}

/// Searches single-bridge routes through the bridge tokens.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    aggregator: RouterAggregator<'a>,
    bridges: BridgeTokens,
}

impl<'a> PathFinder<'a> {
    pub fn new(aggregator: RouterAggregator<'a>, bridges: BridgeTokens) -> Self {
        Self {
            aggregator,
            bridges,
        }
    }

    pub fn bridges(&self) -> &BridgeTokens {
        &self.bridges
    }

    /// Two-hop output through `bridge`, zero when either hop is not viable.
    fn quote_via(&self, amount_in: Amount, token_in: TokenId, bridge: TokenId, token_out: TokenId) -> Amount {
        if bridge == token_in || bridge == token_out {
            return U256::ZERO;
        }
        let mid = self.aggregator.get_single_best_pool(amount_in, token_in, bridge);
        if mid.is_zero() {
            return U256::ZERO;
        }
        self.aggregator.get_single_best_pool(mid, bridge, token_out)
    }

    fn best_bridge(&self, amount_in: Amount, token_in: TokenId, token_out: TokenId) -> Option<(BridgeToken, Amount)> {
        let mut best: Option<(BridgeToken, Amount)> = None;
        for bridge in BridgeToken::ALL {
            let amount_out = self.quote_via(amount_in, token_in, self.bridges.address(bridge), token_out);
            if amount_out.is_zero() {
                continue;
            }
            debug!(%bridge, %amount_out, "viable bridge");
            match best {
                Some((_, current)) if current >= amount_out => {}
                _ => best = Some((bridge, amount_out)),
            }
        }
        best
    }

    /// Bridge search for `token_in -> token_out`.
    ///
    /// Returns an empty result when no single-bridge route exists. Otherwise
    /// the bridge with the largest two-hop output, the lower index on ties.
    pub fn get_results(&self, amount_in: Amount, token_in: TokenId, token_out: TokenId) -> PathResults {
        match self.best_bridge(amount_in, token_in, token_out) {
            Some((bridge, _)) => PathResults::from_hops(&[bridge]),
            None => PathResults::empty(),
        }
    }

    /// Direct pool first, then the bridge search.
    pub fn route(&self, amount_in: Amount, token_in: TokenId, token_out: TokenId) -> RouteDecision {
        let direct = self
            .aggregator
            .get_single_best_pool(amount_in, token_in, token_out);
        if !direct.is_zero() {
            return RouteDecision::Direct { amount_out: direct };
        }
        match self.best_bridge(amount_in, token_in, token_out) {
            Some((bridge, amount_out)) => RouteDecision::Indirect {
                results: PathResults::from_hops(&[bridge]),
                amount_out,
            },
            None => RouteDecision::NoRoute,
        }
    }
}

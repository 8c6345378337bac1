//! Router transaction handler.

use super::types::{DexError, DexResult};
use crate::config::HandlerConfig;
use crate::selectors::{selectors, StarkDRouter};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use amm::{BridgeTokens, InMemoryLedger, Router, TokenLedger};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Handler for router predeploy calls.
///
/// State-changing calls take the write lock for their whole execution, views
/// only the read lock.
#[derive(Debug)]
pub struct DexHandler<L = InMemoryLedger> {
    router: RwLock<Router<L>>,
    bridges: BridgeTokens,
}

/// Saturate an ABI deadline into the router's `u64` clock.
fn deadline_secs(deadline: U256) -> u64 {
    u64::try_from(deadline).unwrap_or(u64::MAX)
}

fn decode<C: SolCall>(data: &[u8]) -> Result<C, DexError> {
    C::abi_decode_raw(data).map_err(|e| {
        DexError::InvalidCalldata(format!("failed to decode {}: {}", C::SIGNATURE, e))
    })
}

impl<L: TokenLedger> DexHandler<L> {
    /// Create a new DexHandler over `ledger`.
    pub fn new(config: HandlerConfig, ledger: L) -> Result<Self, DexError> {
        let router = Router::with_config(config.amm, config.fee_to_setter, ledger)?;
        Ok(Self {
            router: RwLock::new(router),
            bridges: config.bridges,
        })
    }

    pub fn bridges(&self) -> &BridgeTokens {
        &self.bridges
    }

    /// Shared access to the router state.
    pub fn router(&self) -> RwLockReadGuard<'_, Router<L>> {
        self.router.read()
    }

    /// Exclusive access to the router state, e.g. to seed token balances.
    pub fn router_mut(&self) -> RwLockWriteGuard<'_, Router<L>> {
        self.router.write()
    }

    /// Handle a transaction to the router predeploy.
    ///
    /// # Arguments
    /// * `caller` - The address calling the router
    /// * `calldata` - The transaction calldata
    /// * `timestamp` - Timestamp of the block the call executes in
    ///
    /// # Returns
    /// * `Ok(DexResult)` - The result of the operation
    /// * `Err(DexError)` - If the operation failed; no state changed
    pub fn handle_transaction(
        &self,
        caller: Address,
        calldata: &Bytes,
        timestamp: u64,
    ) -> Result<DexResult, DexError> {
        if calldata.len() < 4 {
            return Err(DexError::InvalidCalldata(
                "calldata too short for function selector".to_string(),
            ));
        }

        let selector = &calldata[0..4];
        let data = &calldata[4..];

        match selector {
            s if s == selectors::CREATE_PAIR.as_slice() => self.handle_create_pair(data),
            s if s == selectors::GET_PAIR.as_slice() => self.handle_get_pair(data),
            s if s == selectors::SET_FEE_TO.as_slice() => self.handle_set_fee_to(caller, data),
            s if s == selectors::SET_FEE_TO_SETTER.as_slice() => {
                self.handle_set_fee_to_setter(caller, data)
            }
            s if s == selectors::ADD_LIQUIDITY.as_slice() => {
                self.handle_add_liquidity(caller, data, timestamp)
            }
            s if s == selectors::REMOVE_LIQUIDITY.as_slice() => {
                self.handle_remove_liquidity(caller, data, timestamp)
            }
            s if s == selectors::SWAP_EXACT_TOKENS_FOR_TOKENS.as_slice() => {
                self.handle_swap_exact_in(caller, data, timestamp)
            }
            s if s == selectors::SWAP_TOKENS_FOR_EXACT_TOKENS.as_slice() => {
                self.handle_swap_exact_out(caller, data, timestamp)
            }
            s if s == selectors::GET_RESERVES.as_slice() => self.handle_get_reserves(data),
            s if s == selectors::GET_SINGLE_BEST_POOL.as_slice() => {
                self.handle_get_single_best_pool(data)
            }
            s if s == selectors::GET_RESULTS.as_slice() => self.handle_get_results(data),
            s if s == selectors::SORT_TOKENS.as_slice() => self.handle_sort_tokens(data),
            _ => Err(DexError::InvalidCalldata(format!(
                "unknown function selector: 0x{}",
                hex::encode(selector)
            ))),
        }
    }

    /// Handle createPair(address,address)
    fn handle_create_pair(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::createPairCall = decode(data)?;
        debug!(token_a = %call.tokenA, token_b = %call.tokenB, "createPair");

        let mut router = self.router.write();
        let pair = router.create_pair(call.tokenA, call.tokenB)?;
        let (token0, token1) = router.sort_tokens(call.tokenA, call.tokenB)?;

        Ok(DexResult::PairCreated {
            token0,
            token1,
            pair,
        })
    }

    /// Handle getPair(address,address)
    fn handle_get_pair(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::getPairCall = decode(data)?;
        let pair = self
            .router
            .read()
            .get_pair(call.tokenA, call.tokenB)
            .unwrap_or(Address::ZERO);
        Ok(DexResult::Pair { pair })
    }

    /// Handle setFeeTo(address)
    fn handle_set_fee_to(&self, caller: Address, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::setFeeToCall = decode(data)?;
        self.router.write().set_fee_to(caller, call.feeTo)?;
        Ok(DexResult::FeeToUpdated { fee_to: call.feeTo })
    }

    /// Handle setFeeToSetter(address)
    fn handle_set_fee_to_setter(&self, caller: Address, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::setFeeToSetterCall = decode(data)?;
        self.router
            .write()
            .set_fee_to_setter(caller, call.feeToSetter)?;
        Ok(DexResult::FeeToSetterUpdated {
            fee_to_setter: call.feeToSetter,
        })
    }

    /// Handle addLiquidity(address,address,uint256,uint256,uint256,uint256,address,uint256)
    fn handle_add_liquidity(
        &self,
        caller: Address,
        data: &[u8],
        timestamp: u64,
    ) -> Result<DexResult, DexError> {
        let call: StarkDRouter::addLiquidityCall = decode(data)?;

        let mut router = self.router.write();
        router.set_timestamp(timestamp);
        let added = router.add_liquidity(
            caller,
            call.tokenA,
            call.tokenB,
            call.amountADesired,
            call.amountBDesired,
            call.amountAMin,
            call.amountBMin,
            call.to,
            deadline_secs(call.deadline),
        )?;

        info!(%caller, pair = %added.pair, liquidity = %added.liquidity, "addLiquidity executed");
        Ok(DexResult::LiquidityAdded {
            pair: added.pair,
            amount_a: added.amount_a,
            amount_b: added.amount_b,
            liquidity: added.liquidity,
        })
    }

    /// Handle removeLiquidity(address,address,uint256,uint256,uint256,address,uint256)
    fn handle_remove_liquidity(
        &self,
        caller: Address,
        data: &[u8],
        timestamp: u64,
    ) -> Result<DexResult, DexError> {
        let call: StarkDRouter::removeLiquidityCall = decode(data)?;

        let mut router = self.router.write();
        router.set_timestamp(timestamp);
        let (amount_a, amount_b) = router.remove_liquidity(
            caller,
            call.tokenA,
            call.tokenB,
            call.liquidity,
            call.amountAMin,
            call.amountBMin,
            call.to,
            deadline_secs(call.deadline),
        )?;

        info!(%caller, %amount_a, %amount_b, "removeLiquidity executed");
        Ok(DexResult::LiquidityRemoved { amount_a, amount_b })
    }

    /// Handle swapExactTokensForTokens(uint256,uint256,address[],address,uint256)
    fn handle_swap_exact_in(
        &self,
        caller: Address,
        data: &[u8],
        timestamp: u64,
    ) -> Result<DexResult, DexError> {
        let call: StarkDRouter::swapExactTokensForTokensCall = decode(data)?;

        let mut router = self.router.write();
        router.set_timestamp(timestamp);
        let amounts = router.swap_exact_tokens_for_tokens(
            caller,
            call.amountIn,
            call.amountOutMin,
            &call.path,
            call.to,
            deadline_secs(call.deadline),
        )?;

        info!(%caller, hops = call.path.len() - 1, amount_in = %call.amountIn, "swapExactTokensForTokens executed");
        Ok(DexResult::SwapExecuted {
            trader: caller,
            path: call.path,
            amounts,
        })
    }

    /// Handle swapTokensForExactTokens(uint256,uint256,address[],address,uint256)
    fn handle_swap_exact_out(
        &self,
        caller: Address,
        data: &[u8],
        timestamp: u64,
    ) -> Result<DexResult, DexError> {
        let call: StarkDRouter::swapTokensForExactTokensCall = decode(data)?;

        let mut router = self.router.write();
        router.set_timestamp(timestamp);
        let amounts = router.swap_tokens_for_exact_tokens(
            caller,
            call.amountOut,
            call.amountInMax,
            &call.path,
            call.to,
            deadline_secs(call.deadline),
        )?;

        info!(%caller, hops = call.path.len() - 1, amount_out = %call.amountOut, "swapTokensForExactTokens executed");
        Ok(DexResult::SwapExecuted {
            trader: caller,
            path: call.path,
            amounts,
        })
    }

    /// Handle getReserves(address)
    fn handle_get_reserves(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::getReservesCall = decode(data)?;
        let (reserve0, reserve1) = self
            .router
            .read()
            .get_reserves(call.pair)
            .ok_or(DexError::UnknownPair(call.pair))?;
        Ok(DexResult::Reserves { reserve0, reserve1 })
    }

    /// Handle getSingleBestPool(uint256,address,address)
    fn handle_get_single_best_pool(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::getSingleBestPoolCall = decode(data)?;
        let router = self.router.read();
        let amount_out = router
            .aggregator()
            .get_single_best_pool(call.amountIn, call.tokenIn, call.tokenOut);
        Ok(DexResult::BestPool { amount_out })
    }

    /// Handle getResults(uint256,address,address)
    fn handle_get_results(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::getResultsCall = decode(data)?;
        let router = self.router.read();
        let results = router
            .path_finder(self.bridges)
            .get_results(call.amountIn, call.tokenIn, call.tokenOut);

        debug!(token_in = %call.tokenIn, token_out = %call.tokenOut, path_len = results.path_len(), "getResults");
        let path = results.encoded();
        Ok(DexResult::PathResults {
            path_len: path.len() as u8,
            path,
        })
    }

    /// Handle sortTokens(address,address)
    fn handle_sort_tokens(&self, data: &[u8]) -> Result<DexResult, DexError> {
        let call: StarkDRouter::sortTokensCall = decode(data)?;
        let (token0, token1) = self.router.read().sort_tokens(call.tokenA, call.tokenB)?;
        Ok(DexResult::SortedTokens { token0, token1 })
    }
}

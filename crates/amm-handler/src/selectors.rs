//! Router predeploy interface and selectors.

use alloy_sol_macro::sol;

sol! {
    interface StarkDRouter {
        function createPair(address tokenA, address tokenB) external returns (address pair);
        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function setFeeTo(address feeTo) external;
        function setFeeToSetter(address feeToSetter) external;

        function addLiquidity(
            address tokenA,
            address tokenB,
            uint256 amountADesired,
            uint256 amountBDesired,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);

        function removeLiquidity(
            address tokenA,
            address tokenB,
            uint256 liquidity,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB);

        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        ) external returns (uint256[] amounts);

        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            address[] path,
            address to,
            uint256 deadline
        ) external returns (uint256[] amounts);

        function getReserves(address pair) external view returns (uint256 reserve0, uint256 reserve1);
        function getSingleBestPool(uint256 amountIn, address tokenIn, address tokenOut) external view returns (uint256 amountOut);
        function getResults(uint256 amountIn, address tokenIn, address tokenOut) external view returns (uint8 pathLen, uint8[] path);
        function sortTokens(address tokenA, address tokenB) external pure returns (address token0, address token1);
    }
}

pub mod selectors {
    use super::StarkDRouter;
    use alloy_sol_types::SolCall;

    pub const CREATE_PAIR: [u8; 4] = StarkDRouter::createPairCall::SELECTOR;
    pub const GET_PAIR: [u8; 4] = StarkDRouter::getPairCall::SELECTOR;
    pub const SET_FEE_TO: [u8; 4] = StarkDRouter::setFeeToCall::SELECTOR;
    pub const SET_FEE_TO_SETTER: [u8; 4] = StarkDRouter::setFeeToSetterCall::SELECTOR;
    pub const ADD_LIQUIDITY: [u8; 4] = StarkDRouter::addLiquidityCall::SELECTOR;
    pub const REMOVE_LIQUIDITY: [u8; 4] = StarkDRouter::removeLiquidityCall::SELECTOR;
    pub const SWAP_EXACT_TOKENS_FOR_TOKENS: [u8; 4] =
        StarkDRouter::swapExactTokensForTokensCall::SELECTOR;
    pub const SWAP_TOKENS_FOR_EXACT_TOKENS: [u8; 4] =
        StarkDRouter::swapTokensForExactTokensCall::SELECTOR;
    pub const GET_RESERVES: [u8; 4] = StarkDRouter::getReservesCall::SELECTOR;
    pub const GET_SINGLE_BEST_POOL: [u8; 4] = StarkDRouter::getSingleBestPoolCall::SELECTOR;
    pub const GET_RESULTS: [u8; 4] = StarkDRouter::getResultsCall::SELECTOR;
    pub const SORT_TOKENS: [u8; 4] = StarkDRouter::sortTokensCall::SELECTOR;
}

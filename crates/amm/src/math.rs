//! Constant-product arithmetic.
//!
//! Every helper works on full-width `U256` values with checked operations.
//! Overflow surfaces as [`AmmError::Overflow`]; divisions floor.

use crate::config::AmmConfig;
use crate::error::AmmError;
use crate::types::{Amount, U256};

pub(crate) fn mul(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_mul(b).ok_or(AmmError::Overflow)
}

pub(crate) fn add(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_add(b).ok_or(AmmError::Overflow)
}

pub(crate) fn sub(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_sub(b).ok_or(AmmError::Overflow)
}

pub(crate) fn div(a: U256, b: U256) -> Result<U256, AmmError> {
    a.checked_div(b).ok_or(AmmError::Overflow)
}

/// Integer square root (Babylonian method). Returns `floor(sqrt(y))`.
pub fn sqrt(y: U256) -> U256 {
    let two = U256::from(2);
    if y > U256::from(3) {
        let mut z = y;
        let mut x = y / two + U256::from(1);
        while x < z {
            z = x;
            x = (y / x + x) / two;
        }
        z
    } else if !y.is_zero() {
        U256::from(1)
    } else {
        U256::ZERO
    }
}

/// Given some amount of an asset and pair reserves, return the equivalent
/// amount of the other asset at the current price.
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, AmmError> {
    if amount_a.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    div(mul(amount_a, reserve_b)?, reserve_a)
}

/// Maximum output for an exact input, after the swap fee.
///
/// With the default 30 bps fee this is
/// `amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997)`.
pub fn get_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    config: &AmmConfig,
) -> Result<Amount, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let amount_in_with_fee = mul(amount_in, config.fee_multiplier())?;
    let numerator = mul(amount_in_with_fee, reserve_out)?;
    let denominator = add(mul(reserve_in, config.fee_denominator())?, amount_in_with_fee)?;
    div(numerator, denominator)
}

/// Minimum input needed for an exact output, after the swap fee.
/// Rounds up by one unit so the forward swap always covers `amount_out`.
pub fn get_amount_in(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    config: &AmmConfig,
) -> Result<Amount, AmmError> {
    if amount_out.is_zero() {
        return Err(AmmError::InsufficientOutputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    let numerator = mul(mul(reserve_in, amount_out)?, config.fee_denominator())?;
    let denominator = mul(sub(reserve_out, amount_out)?, config.fee_multiplier())?;
    add(div(numerator, denominator)?, U256::from(1))
}

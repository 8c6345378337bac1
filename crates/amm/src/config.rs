//! AMM configuration parameters.

use crate::error::AmmError;
use crate::types::{address, Address, U256};

/// Basis point denominator used by the fee arithmetic.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Spender identity the router uses when pulling tokens with `transfer_from`.
pub const DEFAULT_ROUTER_ADDRESS: Address = address!("4200000000000000000000000000000000000042");

/// Configuration for the AMM.
#[derive(Debug, Clone)]
pub struct AmmConfig {
    /// Fee charged on swap input in basis points (1 bp = 0.01%).
    /// For example, 30 = 0.30%, the 997/1000 constant-product fee.
    pub fee_bps: u32,

    /// Address users approve so the router can move their tokens.
    pub router_address: Address,
}

impl Default for AmmConfig {
    fn default() -> Self {
        Self {
            fee_bps: 30, // 0.30% default fee
            router_address: DEFAULT_ROUTER_ADDRESS,
        }
    }
}

impl AmmConfig {
    /// Create a new configuration with custom fee.
    pub fn with_fee_bps(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Create a new configuration with a custom router spender address.
    pub fn with_router_address(mut self, router_address: Address) -> Self {
        self.router_address = router_address;
        self
    }

    /// Check the configuration before it is handed to a router.
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.fee_bps >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidConfig("fee_bps must be below 10000"));
        }
        if self.router_address.is_zero() {
            return Err(AmmError::InvalidConfig("router address must be non-zero"));
        }
        Ok(())
    }

    /// `10000 - fee_bps`: the share of the input that counts toward the output.
    pub fn fee_multiplier(&self) -> U256 {
        U256::from(BPS_DENOMINATOR.saturating_sub(self.fee_bps))
    }

    /// The fee denominator as a U256.
    pub fn fee_denominator(&self) -> U256 {
        U256::from(BPS_DENOMINATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fee_matches_997() {
        let config = AmmConfig::default();

        // 9970 / 10000 == 997 / 1000
        assert_eq!(config.fee_multiplier(), U256::from(9970));
        assert_eq!(config.fee_denominator(), U256::from(10_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_fee() {
        let config = AmmConfig::default().with_fee_bps(100); // 1%

        assert_eq!(config.fee_multiplier(), U256::from(9900));
    }

    #[test]
    fn test_invalid_configs() {
        assert!(AmmConfig::default().with_fee_bps(10_000).validate().is_err());
        assert!(AmmConfig::default()
            .with_router_address(Address::ZERO)
            .validate()
            .is_err());
    }
}

//! Handler configuration.

use alloy_primitives::Address;
use amm::{AmmConfig, BridgeTokens};

/// Everything needed to stand up a [`crate::DexHandler`].
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Initial governance account of the factory.
    pub fee_to_setter: Address,
    /// Fee and router-spender settings.
    pub amm: AmmConfig,
    /// Bridge tokens searched by `getResults`.
    pub bridges: BridgeTokens,
}

impl HandlerConfig {
    pub fn new(fee_to_setter: Address, bridges: BridgeTokens) -> Self {
        Self {
            fee_to_setter,
            amm: AmmConfig::default(),
            bridges,
        }
    }

    /// Create a new configuration with custom AMM settings.
    pub fn with_amm_config(mut self, amm: AmmConfig) -> Self {
        self.amm = amm;
        self
    }
}

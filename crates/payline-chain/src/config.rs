use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, ChainResult};

/// Configuration for the live-transfer path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Token contract the transfers are sent through.
    pub token_address: String,
    /// Token decimals; must be at least 2 so a cent is representable.
    pub decimals: u32,
    /// Upper bound, in seconds, for each wallet client call.
    pub call_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            // USDC on Sepolia
            token_address: "0x1c7D4B196Cb0C7AeD2fa9DAB76B76e95D9BA9A02".into(),
            decimals: 6,
            call_timeout_secs: 30,
        }
    }
}

impl ChainConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Convert cents to token base units: `cents * 10^(decimals - 2)`.
    /// Negative shares cannot be transferred.
    pub fn base_units(&self, cents: i64) -> ChainResult<u128> {
        base_units(cents, self.decimals)
    }
}

pub(crate) fn base_units(cents: i64, decimals: u32) -> ChainResult<u128> {
    let cents = u64::try_from(cents).map_err(|_| ChainError::NegativeAmount(cents))?;
    let exponent = decimals
        .checked_sub(2)
        .ok_or(ChainError::UnsupportedDecimals(decimals))?;
    10u128
        .checked_pow(exponent)
        .and_then(|scale| u128::from(cents).checked_mul(scale))
        .ok_or(ChainError::AmountOverflow { cents, decimals })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ChainConfig::default();
        assert_eq!(c.decimals, 6);
        assert_eq!(c.call_timeout(), Duration::from_secs(30));
        assert!(c.token_address.starts_with("0x"));
    }

    #[test]
    fn base_units_scale_by_decimals() {
        let c = ChainConfig::default();
        assert_eq!(c.base_units(3333).unwrap(), 33_330_000);
        assert_eq!(base_units(7, 2).unwrap(), 7);
        assert_eq!(base_units(1, 18).unwrap(), 10_000_000_000_000_000);
    }

    #[test]
    fn negative_cents_rejected() {
        assert_eq!(base_units(-1, 6), Err(ChainError::NegativeAmount(-1)));
        assert_eq!(base_units(0, 6), Ok(0));
    }

    #[test]
    fn sub_cent_decimals_rejected() {
        assert_eq!(base_units(1, 1), Err(ChainError::UnsupportedDecimals(1)));
    }

    #[test]
    fn overflow_detected() {
        assert_eq!(
            base_units(i64::MAX, 40),
            Err(ChainError::AmountOverflow {
                cents: i64::MAX as u64,
                decimals: 40
            })
        );
    }
}

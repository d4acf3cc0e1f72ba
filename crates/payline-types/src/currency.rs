use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Currency an input amount is denominated in.
///
/// Transfers always settle in the accounting unit. A foreign amount is
/// converted by multiplying with the caller-supplied exchange rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// The settlement token (USDC).
    #[default]
    #[serde(rename = "USDC", alias = "accounting")]
    Accounting,
    /// A display currency that needs an exchange rate (USD).
    #[serde(rename = "USD", alias = "foreign")]
    Foreign,
}

impl Currency {
    /// Short code used in reports and on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Accounting => "USDC",
            Self::Foreign => "USD",
        }
    }

    /// Returns `true` if amounts in this currency need conversion.
    pub fn requires_conversion(&self) -> bool {
        matches!(self, Self::Foreign)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usdc" | "accounting" => Ok(Self::Accounting),
            "usd" | "foreign" => Ok(Self::Foreign),
            _ => Err(TypeError::UnknownCurrency(s.to_string())),
        }
    }
}

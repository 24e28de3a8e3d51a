//! Market codes and currencies.
//!
//! The screener supports two markets: US equities (USD) and the Saudi
//! exchange (SAR). Market-specific behavior is resolved through a flat
//! enum lookup, never through per-market types.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketCode {
    Us,
    Sr,
}

impl MarketCode {
    pub const ALL: [MarketCode; 2] = [MarketCode::Us, MarketCode::Sr];

    pub fn as_str(self) -> &'static str {
        match self {
            MarketCode::Us => "US",
            MarketCode::Sr => "SR",
        }
    }

    /// The currency every monetary field is quoted in for this market.
    pub fn currency(self) -> Currency {
        match self {
            MarketCode::Us => Currency::Usd,
            MarketCode::Sr => Currency::Sar,
        }
    }
}

impl Default for MarketCode {
    fn default() -> Self {
        MarketCode::Us
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "US" => Ok(MarketCode::Us),
            "SR" => Ok(MarketCode::Sr),
            other => Err(format!("unknown market '{}': expected US or SR", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Sar,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Sar => "SAR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_market_codes() {
        assert_eq!("US".parse::<MarketCode>().unwrap(), MarketCode::Us);
        assert_eq!("us".parse::<MarketCode>().unwrap(), MarketCode::Us);
        assert_eq!("SR".parse::<MarketCode>().unwrap(), MarketCode::Sr);
        assert_eq!("sr".parse::<MarketCode>().unwrap(), MarketCode::Sr);
    }

    #[test]
    fn parse_unknown_market_fails() {
        let err = "UK".parse::<MarketCode>().unwrap_err();
        assert!(err.contains("UK"));
    }

    #[test]
    fn default_market_is_us() {
        assert_eq!(MarketCode::default(), MarketCode::Us);
    }

    #[test]
    fn market_currency() {
        assert_eq!(MarketCode::Us.currency(), Currency::Usd);
        assert_eq!(MarketCode::Sr.currency(), Currency::Sar);
    }

    #[test]
    fn display_round_trip() {
        for market in MarketCode::ALL {
            assert_eq!(market.to_string().parse::<MarketCode>().unwrap(), market);
        }
    }
}

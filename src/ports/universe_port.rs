//! Universe access port trait.

use crate::domain::error::ScreenerError;
use crate::domain::market::MarketCode;
use crate::domain::security::SecurityUniverse;

pub trait UniversePort {
    /// Load the full security universe for a market.
    fn securities_for(&self, market: MarketCode) -> Result<SecurityUniverse, ScreenerError>;

    fn list_tickers(&self, market: MarketCode) -> Result<Vec<String>, ScreenerError> {
        Ok(self
            .securities_for(market)?
            .iter()
            .map(|s| s.ticker.clone())
            .collect())
    }
}

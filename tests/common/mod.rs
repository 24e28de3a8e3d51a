#![allow(dead_code)]

use chrono::NaiveDate;
use finscreen::domain::error::ScreenerError;
use finscreen::domain::field::FieldId;
use finscreen::domain::market::MarketCode;
use finscreen::domain::security::{Security, SecurityUniverse};
use finscreen::ports::universe_port::UniversePort;
use std::collections::HashMap;

pub struct MockUniversePort {
    pub universes: HashMap<MarketCode, SecurityUniverse>,
    pub errors: HashMap<MarketCode, String>,
}

impl MockUniversePort {
    pub fn new() -> Self {
        Self {
            universes: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_universe(mut self, universe: SecurityUniverse) -> Self {
        self.universes.insert(universe.market, universe);
        self
    }

    pub fn with_error(mut self, market: MarketCode, reason: &str) -> Self {
        self.errors.insert(market, reason.to_string());
        self
    }
}

impl UniversePort for MockUniversePort {
    fn securities_for(&self, market: MarketCode) -> Result<SecurityUniverse, ScreenerError> {
        if let Some(reason) = self.errors.get(&market) {
            return Err(ScreenerError::Universe {
                reason: reason.clone(),
            });
        }
        self.universes
            .get(&market)
            .cloned()
            .ok_or_else(|| ScreenerError::Universe {
                reason: format!("no universe for market {}", market),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_security(ticker: &str, sector: &str, market_cap: f64) -> Security {
    Security::new(ticker)
        .with_text(FieldId::Sector, sector)
        .with_number(FieldId::MarketCap, market_cap)
}

/// A small US universe with known market caps and sectors:
/// 500M / 1.2B / 50B tech names plus non-tech names for contrast.
pub fn us_fixture_universe() -> SecurityUniverse {
    SecurityUniverse::new(
        MarketCode::Us,
        date(2025, 6, 30),
        vec![
            make_security("TINY", "Technology", 5e8).with_number(FieldId::PeRatio, 45.0),
            make_security("MIDCO", "Technology", 1.2e9)
                .with_number(FieldId::PeRatio, 22.0)
                .with_number(FieldId::DividendYield, 1.5),
            make_security("GIANT", "Technology", 5e10)
                .with_number(FieldId::PeRatio, 30.0)
                .with_number(FieldId::Beta, 1.2),
            make_security("OILCO", "Energy", 4e11)
                .with_number(FieldId::PeRatio, 12.0)
                .with_number(FieldId::DividendYield, 4.0),
            make_security("PHARM", "Healthcare", 8e10)
                .with_number(FieldId::PeRatio, 18.0)
                .with_number(FieldId::DividendYield, 2.8),
        ],
    )
}

pub fn sr_fixture_universe() -> SecurityUniverse {
    SecurityUniverse::new(
        MarketCode::Sr,
        date(2025, 6, 30),
        vec![
            make_security("2222.SR", "Energy", 7e12).with_number(FieldId::DividendYield, 4.5),
            make_security("1120.SR", "Financial Services", 2.5e11)
                .with_number(FieldId::PeRatio, 16.0),
            make_security("7010.SR", "Communication Services", 1.8e11)
                .with_number(FieldId::PeRatio, 14.0),
        ],
    )
}

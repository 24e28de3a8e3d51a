//! Securities and the per-request universe.
//!
//! A `Security` is a read-only snapshot of one tradable instrument: its
//! ticker plus whatever field values the data source supplied. Fields may
//! be missing; the execution engine treats a missing field as a non-match,
//! never as an error. The core never mutates or caches a universe.

use crate::domain::field::FieldId;
use crate::domain::market::MarketCode;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Security {
    pub ticker: String,
    fields: HashMap<FieldId, FieldValue>,
}

impl Security {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_number(mut self, field: FieldId, value: f64) -> Self {
        self.fields.insert(field, FieldValue::Number(value));
        self
    }

    pub fn with_text(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.fields.insert(field, FieldValue::Text(value.into()));
        self
    }

    pub fn value(&self, field: FieldId) -> Option<&FieldValue> {
        self.fields.get(&field)
    }
}

/// All securities for one market at query time.
#[derive(Debug, Clone)]
pub struct SecurityUniverse {
    pub market: MarketCode,
    pub as_of: NaiveDate,
    securities: Vec<Security>,
}

impl SecurityUniverse {
    pub fn new(market: MarketCode, as_of: NaiveDate, securities: Vec<Security>) -> Self {
        Self {
            market,
            as_of,
            securities,
        }
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Security> {
        self.securities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let security = Security::new("AAPL")
            .with_number(FieldId::MarketCap, 3e12)
            .with_text(FieldId::Sector, "Technology");

        assert_eq!(security.ticker, "AAPL");
        assert_eq!(
            security.value(FieldId::MarketCap),
            Some(&FieldValue::Number(3e12))
        );
        assert_eq!(
            security.value(FieldId::Sector),
            Some(&FieldValue::Text("Technology".into()))
        );
        assert_eq!(security.value(FieldId::PeRatio), None);
    }

    #[test]
    fn universe_iteration() {
        let universe = SecurityUniverse::new(
            MarketCode::Us,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            vec![Security::new("AAPL"), Security::new("MSFT")],
        );
        assert_eq!(universe.len(), 2);
        assert!(!universe.is_empty());
        let tickers: Vec<&str> = universe.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }
}

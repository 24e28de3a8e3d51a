//! CSV universe adapter.
//!
//! Loads per-market security universes from CSV snapshots. The header row
//! drives column mapping: a `ticker` column is required, every other
//! recognized column name binds to a screenable field, and unrecognized
//! columns are ignored so feeds can carry extra data. Blank cells mean the
//! field is missing for that security.

use crate::domain::error::ScreenerError;
use crate::domain::field::{FieldId, ValueKind};
use crate::domain::market::MarketCode;
use crate::domain::security::{Security, SecurityUniverse};
use crate::ports::universe_port::UniversePort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvUniverseAdapter {
    paths: HashMap<MarketCode, PathBuf>,
    as_of: NaiveDate,
}

impl CsvUniverseAdapter {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            paths: HashMap::new(),
            as_of,
        }
    }

    pub fn with_market(mut self, market: MarketCode, path: PathBuf) -> Self {
        self.paths.insert(market, path);
        self
    }

    fn path_for(&self, market: MarketCode) -> Result<&PathBuf, ScreenerError> {
        self.paths.get(&market).ok_or_else(|| ScreenerError::Universe {
            reason: format!("no universe file configured for market {}", market),
        })
    }
}

impl UniversePort for CsvUniverseAdapter {
    fn securities_for(&self, market: MarketCode) -> Result<SecurityUniverse, ScreenerError> {
        let path = self.path_for(market)?;
        let content = fs::read_to_string(path).map_err(|e| ScreenerError::Universe {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| ScreenerError::Universe {
            reason: format!("CSV header error: {}", e),
        })?;

        let mut ticker_col = None;
        let mut field_cols: Vec<(usize, FieldId)> = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            let name = name.trim();
            if name.eq_ignore_ascii_case("ticker") {
                ticker_col = Some(idx);
            } else if let Some(field) = FieldId::from_name(name) {
                field_cols.push((idx, field));
            }
        }
        let ticker_col = ticker_col.ok_or_else(|| ScreenerError::Universe {
            reason: format!("{}: missing 'ticker' column", path.display()),
        })?;

        let mut securities = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| ScreenerError::Universe {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ticker = record
                .get(ticker_col)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ScreenerError::Universe {
                    reason: format!("{}: row {}: empty ticker", path.display(), row + 2),
                })?;

            let mut security = Security::new(ticker);
            for &(idx, field) in &field_cols {
                let Some(cell) = record.get(idx).map(str::trim) else {
                    continue;
                };
                if cell.is_empty() {
                    continue;
                }
                if field.kind() == ValueKind::Categorical {
                    security = security.with_text(field, cell);
                } else {
                    let value: f64 = cell.parse().map_err(|_| ScreenerError::Universe {
                        reason: format!(
                            "{}: row {}: invalid {} value '{}'",
                            path.display(),
                            row + 2,
                            field,
                            cell
                        ),
                    })?;
                    security = security.with_number(field, value);
                }
            }
            securities.push(security);
        }

        Ok(SecurityUniverse::new(market, self.as_of, securities))
    }
}

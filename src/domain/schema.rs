//! Market schema registry.
//!
//! Declares, per market, which fields are screenable and how their values
//! are expressed. Schemas are built once per process and never mutated;
//! [`normalize`] validates a filter expression against a schema and rebuilds
//! it in market-canonical form (currency hints checked and cleared).

use crate::domain::error::ScreenerError;
use crate::domain::field::{FieldId, ValueKind};
use crate::domain::filter::{FilterExpression, Operator, Predicate, Value};
use crate::domain::market::{Currency, MarketCode};
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: ValueKind,
    /// Quote currency for monetary fields, `None` otherwise.
    pub currency: Option<Currency>,
}

#[derive(Debug)]
pub struct MarketSchema {
    market: MarketCode,
    fields: HashMap<FieldId, FieldSpec>,
}

impl MarketSchema {
    fn build(market: MarketCode) -> Self {
        let mut fields = HashMap::new();
        for field in FieldId::ALL {
            // The Saudi data feed does not carry these metrics.
            if market == MarketCode::Sr
                && matches!(
                    field,
                    FieldId::Beta | FieldId::PegRatio | FieldId::EpsGrowth
                )
            {
                continue;
            }
            let kind = field.kind();
            let currency = (kind == ValueKind::Monetary).then(|| market.currency());
            fields.insert(field, FieldSpec { kind, currency });
        }
        Self { market, fields }
    }

    pub fn market(&self) -> MarketCode {
        self.market
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn spec(&self, field: FieldId) -> Option<&FieldSpec> {
        self.fields.get(&field)
    }

    /// Screenable fields in canonical name order.
    pub fn fields(&self) -> Vec<FieldId> {
        let mut fields: Vec<FieldId> = self.fields.keys().copied().collect();
        fields.sort_by_key(|f| f.name());
        fields
    }
}

/// Schema for a market, built on first use and shared for the process
/// lifetime.
pub fn schema_for(market: MarketCode) -> &'static MarketSchema {
    static US: OnceLock<MarketSchema> = OnceLock::new();
    static SR: OnceLock<MarketSchema> = OnceLock::new();
    match market {
        MarketCode::Us => US.get_or_init(|| MarketSchema::build(MarketCode::Us)),
        MarketCode::Sr => SR.get_or_init(|| MarketSchema::build(MarketCode::Sr)),
    }
}

/// Validate an expression against a schema and return its normalized form.
///
/// Checks every predicate: the field must be screenable in the market, the
/// value must agree with the field's kind, `BETWEEN` bounds must be ordered,
/// and a monetary currency hint must match the market's currency. Hints are
/// cleared in the output so normalized trees are market-canonical.
pub fn normalize(
    expr: &FilterExpression,
    schema: &MarketSchema,
) -> Result<FilterExpression, ScreenerError> {
    match expr {
        FilterExpression::Predicate(p) => normalize_predicate(p, schema),
        FilterExpression::And(children) => Ok(FilterExpression::And(normalize_children(
            children, schema,
        )?)),
        FilterExpression::Or(children) => Ok(FilterExpression::Or(normalize_children(
            children, schema,
        )?)),
        FilterExpression::Not(inner) => Ok(FilterExpression::Not(Box::new(normalize(
            inner, schema,
        )?))),
    }
}

fn normalize_children(
    children: &[FilterExpression],
    schema: &MarketSchema,
) -> Result<Vec<FilterExpression>, ScreenerError> {
    children.iter().map(|c| normalize(c, schema)).collect()
}

fn normalize_predicate(
    predicate: &Predicate,
    schema: &MarketSchema,
) -> Result<FilterExpression, ScreenerError> {
    let spec = schema
        .spec(predicate.field)
        .ok_or(ScreenerError::UnsupportedField {
            field: predicate.field,
            market: schema.market(),
        })?;

    match (&predicate.value, predicate.op) {
        (Value::Range { low, high }, Operator::Between) => {
            if spec.kind == ValueKind::Categorical {
                return Err(ScreenerError::TypeMismatch {
                    field: predicate.field,
                    expected: spec.kind,
                });
            }
            if low > high {
                return Err(ScreenerError::InvalidRange {
                    low: *low,
                    high: *high,
                });
            }
        }
        (Value::Range { .. }, _) | (_, Operator::Between) => {
            return Err(ScreenerError::TypeMismatch {
                field: predicate.field,
                expected: spec.kind,
            });
        }
        (Value::Number(_), _) => {
            if spec.kind == ValueKind::Categorical {
                return Err(ScreenerError::TypeMismatch {
                    field: predicate.field,
                    expected: spec.kind,
                });
            }
        }
        (Value::Text(_), _) => {
            if spec.kind != ValueKind::Categorical {
                return Err(ScreenerError::TypeMismatch {
                    field: predicate.field,
                    expected: spec.kind,
                });
            }
        }
    }

    if let (Some(implied), Some(market_currency)) = (predicate.currency_hint, spec.currency) {
        if implied != market_currency {
            return Err(ScreenerError::CurrencyMismatch {
                implied,
                market: market_currency,
            });
        }
    }

    Ok(FilterExpression::Predicate(Predicate::new(
        predicate.field,
        predicate.op,
        predicate.value.clone(),
    )))
}

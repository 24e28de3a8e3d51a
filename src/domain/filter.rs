//! Filter expression AST.
//!
//! A compiled query is an immutable tree of predicates combined with
//! `AND`/`OR`/`NOT`. The tree is built bottom-up by the interpreter (or the
//! canonical-form parser), validated once by the schema registry, and then
//! only read. `Display` renders the canonical textual form, e.g.
//!
//! ```text
//! AND(GT(market_cap, 1000000000), EQ(sector, "Technology"))
//! ```
//!
//! which [`crate::domain::filter_parser::parse`] reconstructs into a
//! structurally equal tree.

use crate::domain::field::FieldId;
use crate::domain::market::Currency;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::Between => "BETWEEN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Range { low: f64, high: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: FieldId,
    pub op: Operator,
    pub value: Value,
    /// Currency the query implied for a monetary value. Set by the
    /// interpreter, checked against the market and cleared by the schema
    /// registry; normalized expressions carry `None`.
    pub currency_hint: Option<Currency>,
}

impl Predicate {
    pub fn new(field: FieldId, op: Operator, value: Value) -> Self {
        Self {
            field,
            op,
            value,
            currency_hint: None,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency_hint = Some(currency);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Predicate(Predicate),
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    pub fn predicate(field: FieldId, op: Operator, value: Value) -> Self {
        FilterExpression::Predicate(Predicate::new(field, op, value))
    }

    /// Number of predicate leaves in the tree.
    pub fn predicate_count(&self) -> usize {
        match self {
            FilterExpression::Predicate(_) => 1,
            FilterExpression::And(children) | FilterExpression::Or(children) => {
                children.iter().map(FilterExpression::predicate_count).sum()
            }
            FilterExpression::Not(inner) => inner.predicate_count(),
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Predicate(p) => match &p.value {
                Value::Number(n) => write!(f, "{}({}, {})", p.op.name(), p.field, n),
                Value::Text(t) => write!(f, "{}({}, \"{}\")", p.op.name(), p.field, t),
                Value::Range { low, high } => {
                    write!(f, "{}({}, {}, {})", p.op.name(), p.field, low, high)
                }
            },
            FilterExpression::And(children) => write_connective(f, "AND", children),
            FilterExpression::Or(children) => write_connective(f, "OR", children),
            FilterExpression::Not(inner) => write!(f, "NOT({})", inner),
        }
    }
}

fn write_connective(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    children: &[FilterExpression],
) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_numeric_predicate() {
        let expr =
            FilterExpression::predicate(FieldId::MarketCap, Operator::Gt, Value::Number(1e9));
        assert_eq!(expr.to_string(), "GT(market_cap, 1000000000)");
    }

    #[test]
    fn display_text_predicate() {
        let expr = FilterExpression::predicate(
            FieldId::Sector,
            Operator::Eq,
            Value::Text("Technology".into()),
        );
        assert_eq!(expr.to_string(), "EQ(sector, \"Technology\")");
    }

    #[test]
    fn display_between_predicate() {
        let expr = FilterExpression::predicate(
            FieldId::PeRatio,
            Operator::Between,
            Value::Range {
                low: 10.0,
                high: 20.5,
            },
        );
        assert_eq!(expr.to_string(), "BETWEEN(pe_ratio, 10, 20.5)");
    }

    #[test]
    fn display_nested_connectives() {
        let expr = FilterExpression::And(vec![
            FilterExpression::predicate(FieldId::MarketCap, Operator::Gt, Value::Number(1e9)),
            FilterExpression::Not(Box::new(FilterExpression::predicate(
                FieldId::Sector,
                Operator::Eq,
                Value::Text("Energy".into()),
            ))),
        ]);
        assert_eq!(
            expr.to_string(),
            "AND(GT(market_cap, 1000000000), NOT(EQ(sector, \"Energy\")))"
        );
    }

    #[test]
    fn currency_hint_does_not_affect_equality_of_display() {
        let plain =
            FilterExpression::predicate(FieldId::Revenue, Operator::Gte, Value::Number(5e8));
        let hinted = FilterExpression::Predicate(
            Predicate::new(FieldId::Revenue, Operator::Gte, Value::Number(5e8))
                .with_currency(Currency::Usd),
        );
        assert_eq!(plain.to_string(), hinted.to_string());
    }

    #[test]
    fn predicate_count() {
        let expr = FilterExpression::And(vec![
            FilterExpression::predicate(FieldId::MarketCap, Operator::Gt, Value::Number(1e9)),
            FilterExpression::Or(vec![
                FilterExpression::predicate(FieldId::PeRatio, Operator::Lt, Value::Number(25.0)),
                FilterExpression::predicate(
                    FieldId::DividendYield,
                    Operator::Gte,
                    Value::Number(3.0),
                ),
            ]),
        ]);
        assert_eq!(expr.predicate_count(), 3);
    }
}

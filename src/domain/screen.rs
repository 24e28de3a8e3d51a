//! Screening execution engine.
//!
//! Evaluates a normalized filter expression against every security in the
//! universe independently: O(N·P) for N securities and P predicates, with
//! each loop body bounded by one security so an external cancellation
//! signal can take effect between securities.
//!
//! # Evaluation Semantics
//!
//! - `AND` short-circuits on first `false`, `OR` on first `true`.
//! - A security missing a referenced field fails that predicate (`false`),
//!   never errors. This is deliberate policy: universes come from
//!   heterogeneous feeds and sparse coverage must not abort a screen.
//! - `BETWEEN` is inclusive on both bounds.
//! - Numeric `EQ` compares within an epsilon; text `EQ` ignores ASCII case.
//!
//! The engine is failure-free by construction; all request errors surface
//! earlier in the pipeline.

use crate::domain::filter::{FilterExpression, Operator, Predicate, Value};
use crate::domain::security::{FieldValue, Security, SecurityUniverse};
use std::collections::HashSet;

const EPSILON: f64 = 1e-9;

/// Tickers matching a filter expression. Unordered; the formatter imposes
/// the output order.
pub type MatchSet = HashSet<String>;

pub fn evaluate(expr: &FilterExpression, universe: &SecurityUniverse) -> MatchSet {
    let mut matches = MatchSet::new();
    for security in universe.iter() {
        if satisfies(expr, security) {
            matches.insert(security.ticker.clone());
        }
    }
    matches
}

/// Whether a single security satisfies the expression.
pub fn satisfies(expr: &FilterExpression, security: &Security) -> bool {
    match expr {
        FilterExpression::Predicate(p) => eval_predicate(p, security),
        FilterExpression::And(children) => {
            for child in children {
                if !satisfies(child, security) {
                    return false;
                }
            }
            true
        }
        FilterExpression::Or(children) => {
            for child in children {
                if satisfies(child, security) {
                    return true;
                }
            }
            false
        }
        FilterExpression::Not(inner) => !satisfies(inner, security),
    }
}

fn eval_predicate(predicate: &Predicate, security: &Security) -> bool {
    let Some(actual) = security.value(predicate.field) else {
        return false;
    };

    match (&predicate.value, actual) {
        (Value::Number(expected), FieldValue::Number(actual)) => match predicate.op {
            Operator::Eq => (actual - expected).abs() < EPSILON,
            Operator::Lt => actual < expected,
            Operator::Lte => actual <= expected,
            Operator::Gt => actual > expected,
            Operator::Gte => actual >= expected,
            Operator::Between => false,
        },
        (Value::Range { low, high }, FieldValue::Number(actual)) => {
            predicate.op == Operator::Between && *actual >= *low && *actual <= *high
        }
        (Value::Text(expected), FieldValue::Text(actual)) => {
            predicate.op == Operator::Eq && actual.eq_ignore_ascii_case(expected)
        }
        // Kind mismatches are rejected by the schema registry; anything
        // that still disagrees here is a non-match.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldId;
    use crate::domain::market::MarketCode;
    use chrono::NaiveDate;

    fn universe(securities: Vec<Security>) -> SecurityUniverse {
        SecurityUniverse::new(
            MarketCode::Us,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            securities,
        )
    }

    fn gt(field: FieldId, value: f64) -> FilterExpression {
        FilterExpression::predicate(field, Operator::Gt, Value::Number(value))
    }

    fn cap(ticker: &str, market_cap: f64) -> Security {
        Security::new(ticker).with_number(FieldId::MarketCap, market_cap)
    }

    #[test]
    fn greater_than_filters_universe() {
        let u = universe(vec![
            cap("AAA", 5e8),
            cap("BBB", 1.2e9),
            cap("CCC", 5e10),
        ]);
        let matches = evaluate(&gt(FieldId::MarketCap, 1e9), &u);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains("BBB"));
        assert!(matches.contains("CCC"));
    }

    #[test]
    fn missing_field_is_a_non_match() {
        let u = universe(vec![cap("AAA", 2e9), Security::new("NOF")]);
        let matches = evaluate(&gt(FieldId::MarketCap, 1e9), &u);
        assert_eq!(matches.len(), 1);
        assert!(matches.contains("AAA"));
    }

    #[test]
    fn missing_field_under_not_matches() {
        // NOT(pred) is true when pred is false, including the
        // missing-field case.
        let u = universe(vec![Security::new("NOF")]);
        let expr = FilterExpression::Not(Box::new(gt(FieldId::MarketCap, 1e9)));
        let matches = evaluate(&expr, &u);
        assert!(matches.contains("NOF"));
    }

    #[test]
    fn between_is_inclusive_on_both_bounds() {
        let expr = FilterExpression::predicate(
            FieldId::PeRatio,
            Operator::Between,
            Value::Range {
                low: 10.0,
                high: 20.0,
            },
        );
        let at = |pe: f64| Security::new("X").with_number(FieldId::PeRatio, pe);

        assert!(satisfies(&expr, &at(10.0)));
        assert!(satisfies(&expr, &at(20.0)));
        assert!(satisfies(&expr, &at(15.0)));
        assert!(!satisfies(&expr, &at(10.0 - 1e-6)));
        assert!(!satisfies(&expr, &at(20.0 + 1e-6)));
    }

    #[test]
    fn numeric_comparisons() {
        let s = Security::new("X").with_number(FieldId::PeRatio, 15.0);
        let pred = |op, v| FilterExpression::predicate(FieldId::PeRatio, op, Value::Number(v));

        assert!(satisfies(&pred(Operator::Eq, 15.0), &s));
        assert!(!satisfies(&pred(Operator::Eq, 15.1), &s));
        assert!(satisfies(&pred(Operator::Lt, 16.0), &s));
        assert!(!satisfies(&pred(Operator::Lt, 15.0), &s));
        assert!(satisfies(&pred(Operator::Lte, 15.0), &s));
        assert!(satisfies(&pred(Operator::Gt, 14.0), &s));
        assert!(!satisfies(&pred(Operator::Gt, 15.0), &s));
        assert!(satisfies(&pred(Operator::Gte, 15.0), &s));
    }

    #[test]
    fn text_equality_ignores_case() {
        let expr = FilterExpression::predicate(
            FieldId::Sector,
            Operator::Eq,
            Value::Text("Technology".into()),
        );
        let s = Security::new("X").with_text(FieldId::Sector, "technology");
        assert!(satisfies(&expr, &s));

        let other = Security::new("Y").with_text(FieldId::Sector, "Energy");
        assert!(!satisfies(&expr, &other));
    }

    #[test]
    fn and_requires_all_predicates() {
        let expr = FilterExpression::And(vec![
            gt(FieldId::MarketCap, 1e9),
            FilterExpression::predicate(
                FieldId::Sector,
                Operator::Eq,
                Value::Text("Technology".into()),
            ),
        ]);

        let both = Security::new("A")
            .with_number(FieldId::MarketCap, 2e9)
            .with_text(FieldId::Sector, "Technology");
        let cap_only = Security::new("B").with_number(FieldId::MarketCap, 2e9);
        let sector_only = Security::new("C").with_text(FieldId::Sector, "Technology");

        assert!(satisfies(&expr, &both));
        assert!(!satisfies(&expr, &cap_only));
        assert!(!satisfies(&expr, &sector_only));
    }

    #[test]
    fn or_requires_any_predicate() {
        let expr = FilterExpression::Or(vec![
            gt(FieldId::MarketCap, 1e9),
            gt(FieldId::DividendYield, 5.0),
        ]);

        let big = Security::new("A").with_number(FieldId::MarketCap, 2e9);
        let payer = Security::new("B").with_number(FieldId::DividendYield, 6.0);
        let neither = Security::new("C")
            .with_number(FieldId::MarketCap, 1e8)
            .with_number(FieldId::DividendYield, 1.0);

        assert!(satisfies(&expr, &big));
        assert!(satisfies(&expr, &payer));
        assert!(!satisfies(&expr, &neither));
    }

    #[test]
    fn empty_universe_yields_empty_matches() {
        let matches = evaluate(&gt(FieldId::MarketCap, 1e9), &universe(vec![]));
        assert!(matches.is_empty());
    }

    #[test]
    fn scenario_tech_over_one_billion() {
        let u = universe(vec![
            Security::new("SML")
                .with_number(FieldId::MarketCap, 5e8)
                .with_text(FieldId::Sector, "Technology"),
            Security::new("MID")
                .with_number(FieldId::MarketCap, 1.2e9)
                .with_text(FieldId::Sector, "Technology"),
            Security::new("BIG")
                .with_number(FieldId::MarketCap, 5e10)
                .with_text(FieldId::Sector, "Technology"),
            Security::new("OIL")
                .with_number(FieldId::MarketCap, 5e10)
                .with_text(FieldId::Sector, "Energy"),
        ]);
        let expr = FilterExpression::And(vec![
            gt(FieldId::MarketCap, 1e9),
            FilterExpression::predicate(
                FieldId::Sector,
                Operator::Eq,
                Value::Text("Technology".into()),
            ),
        ]);
        let matches = evaluate(&expr, &u);
        assert_eq!(matches.len(), 2);
        assert!(matches.contains("MID"));
        assert!(matches.contains("BIG"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn evaluation_is_deterministic(caps in proptest::collection::vec(0.0f64..1e12, 0..40)) {
                let securities: Vec<Security> = caps
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| cap(&format!("T{:03}", i), c))
                    .collect();
                let u = universe(securities);
                let expr = gt(FieldId::MarketCap, 1e9);

                let first = evaluate(&expr, &u);
                let second = evaluate(&expr, &u);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn not_is_complement_over_present_fields(caps in proptest::collection::vec(0.0f64..1e12, 1..40)) {
                let securities: Vec<Security> = caps
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| cap(&format!("T{:03}", i), c))
                    .collect();
                let u = universe(securities);
                let expr = gt(FieldId::MarketCap, 1e9);
                let negated = FilterExpression::Not(Box::new(expr.clone()));

                let matched = evaluate(&expr, &u);
                let complement = evaluate(&negated, &u);
                prop_assert_eq!(matched.len() + complement.len(), u.len());
                prop_assert!(matched.is_disjoint(&complement));
            }
        }
    }
}

//! Screening pipeline.
//!
//! Wires the stages end to end: free text is interpreted into a filter
//! expression, normalized against the market schema, executed over the
//! universe, and formatted into an ordered ticker list. Each stage is
//! also usable on its own; this module only composes them.
//!
//! A request either completes every stage or fails with the first
//! error encountered. There is no partial output.

use crate::domain::error::ScreenerError;
use crate::domain::filter::FilterExpression;
use crate::domain::format::format_matches;
use crate::domain::interpreter::interpret;
use crate::domain::market::MarketCode;
use crate::domain::schema::{normalize, schema_for};
use crate::domain::screen::evaluate;
use crate::domain::security::SecurityUniverse;

/// Interpret a free-text query and normalize it for the market.
///
/// The returned expression is market-canonical: every field is screenable
/// in the market, values agree with their field kinds, and currency hints
/// have been checked and cleared.
pub fn compile(query: &str, market: MarketCode) -> Result<FilterExpression, ScreenerError> {
    let expr = interpret(query, market)?;
    normalize(&expr, schema_for(market))
}

/// Run a full screen: compile the query, evaluate it over the universe,
/// and return the ordered ticker list.
pub fn screen(
    query: &str,
    market: MarketCode,
    universe: &SecurityUniverse,
) -> Result<Vec<String>, ScreenerError> {
    let expr = compile(query, market)?;
    let matches = evaluate(&expr, universe);
    Ok(format_matches(&matches))
}

//! Natural-language query interpreter.
//!
//! Turns a free-text request like "find tech companies with market cap
//! greater than 1 billion" into a [`FilterExpression`]. The strategy is
//! deterministic vocabulary matching, not a learned model: clauses are split
//! on commas and "and" (keeping the "and" inside a `between X and Y` range),
//! then each clause is matched against synonym tables for metrics, sectors
//! and comparative phrases, and its numeric amounts are scanned for
//! magnitude, percent and currency markers.
//!
//! Conventions, fixed and never mixed:
//!
//! - Multi-clause queries combine with `AND`.
//! - Magnitudes resolve to absolute units: "1 billion" is `1_000_000_000`.
//! - Percentages are whole-number percent: "10%" is `10.0`.
//! - A bare number for a monetary field ("market cap above 10") is
//!   ambiguous and rejected; ratio, percentage and count fields accept
//!   bare numbers.
//! - Monetary values carry a currency hint: an explicit marker ("$",
//!   "riyals") if present, otherwise the selected market's currency. The
//!   schema registry checks the hint against the market.
//!
//! Partial understanding is never executed: one unresolvable clause fails
//! the whole request with that clause identified.

use crate::domain::error::ScreenerError;
use crate::domain::field::{FieldId, ValueKind};
use crate::domain::filter::{FilterExpression, Operator, Predicate, Value};
use crate::domain::market::{Currency, MarketCode};

/// Metric synonym table. Matching picks the longest phrase present in the
/// clause, so "price to earnings" wins over "price".
const METRIC_SYNONYMS: &[(&str, FieldId)] = &[
    ("market capitalization", FieldId::MarketCap),
    ("market cap", FieldId::MarketCap),
    ("market value", FieldId::MarketCap),
    ("price to earnings ratio", FieldId::PeRatio),
    ("price to earnings", FieldId::PeRatio),
    ("p/e ratio", FieldId::PeRatio),
    ("p/e", FieldId::PeRatio),
    ("pe ratio", FieldId::PeRatio),
    ("earnings multiple", FieldId::PeRatio),
    ("peg ratio", FieldId::PegRatio),
    ("peg", FieldId::PegRatio),
    ("price to book ratio", FieldId::PriceToBook),
    ("price to book", FieldId::PriceToBook),
    ("p/b", FieldId::PriceToBook),
    ("dividend yield", FieldId::DividendYield),
    ("yield", FieldId::DividendYield),
    ("revenue growth", FieldId::RevenueGrowth),
    ("sales growth", FieldId::RevenueGrowth),
    ("earnings per share growth", FieldId::EpsGrowth),
    ("eps growth", FieldId::EpsGrowth),
    ("earnings growth", FieldId::EpsGrowth),
    ("net profit margin", FieldId::ProfitMargin),
    ("net income margin", FieldId::ProfitMargin),
    ("profit margin", FieldId::ProfitMargin),
    ("net margin", FieldId::ProfitMargin),
    ("gross profit margin", FieldId::GrossMargin),
    ("gross margin", FieldId::GrossMargin),
    ("return on equity", FieldId::ReturnOnEquity),
    ("roe", FieldId::ReturnOnEquity),
    ("total revenue", FieldId::Revenue),
    ("revenues", FieldId::Revenue),
    ("revenue", FieldId::Revenue),
    ("sales", FieldId::Revenue),
    ("net income", FieldId::NetIncome),
    ("earnings", FieldId::NetIncome),
    ("profit", FieldId::NetIncome),
    ("ebitda", FieldId::Ebitda),
    ("trading volume", FieldId::Volume),
    ("average volume", FieldId::Volume),
    ("volume", FieldId::Volume),
    ("beta", FieldId::Beta),
    ("share price", FieldId::Price),
    ("stock price", FieldId::Price),
    ("price per share", FieldId::Price),
    ("price", FieldId::Price),
];

/// Sector adjectives compile to `EQ(sector, ...)` predicates.
const SECTOR_SYNONYMS: &[(&str, &str)] = &[
    ("technology", "Technology"),
    ("tech", "Technology"),
    ("software", "Technology"),
    ("health care", "Healthcare"),
    ("healthcare", "Healthcare"),
    ("energy", "Energy"),
    ("financial services", "Financial Services"),
    ("financials", "Financial Services"),
    ("financial", "Financial Services"),
    ("banking", "Financial Services"),
    ("utilities", "Utilities"),
    ("utility", "Utilities"),
    ("real estate", "Real Estate"),
    ("industrials", "Industrials"),
    ("industrial", "Industrials"),
    ("basic materials", "Basic Materials"),
    ("materials", "Basic Materials"),
    ("communication services", "Communication Services"),
    ("telecom", "Communication Services"),
    ("consumer cyclical", "Consumer Cyclical"),
    ("consumer defensive", "Consumer Defensive"),
];

/// Comparative phrases in priority order: longer phrases first so
/// "greater than or equal to" is not read as "greater than".
const OPERATOR_PHRASES: &[(&str, Operator)] = &[
    ("greater than or equal to", Operator::Gte),
    ("less than or equal to", Operator::Lte),
    ("no more than", Operator::Lte),
    ("no less than", Operator::Gte),
    ("at least", Operator::Gte),
    ("at most", Operator::Lte),
    ("greater than", Operator::Gt),
    ("more than", Operator::Gt),
    ("higher than", Operator::Gt),
    ("larger than", Operator::Gt),
    ("bigger than", Operator::Gt),
    ("less than", Operator::Lt),
    ("lower than", Operator::Lt),
    ("smaller than", Operator::Lt),
    ("equal to", Operator::Eq),
    ("equals", Operator::Eq),
    ("exactly", Operator::Eq),
    ("between", Operator::Between),
    ("above", Operator::Gt),
    ("over", Operator::Gt),
    ("exceeding", Operator::Gt),
    ("exceeds", Operator::Gt),
    ("under", Operator::Lt),
    ("below", Operator::Lt),
];

/// Words carrying no filter meaning, stripped when reconstructing the
/// metric phrase of an unresolvable clause.
const FILLER_WORDS: &[&str] = &[
    "find", "show", "give", "get", "list", "screen", "search", "me", "all", "any", "some",
    "companies", "company", "stocks", "stock", "shares", "firms", "firm", "names",
    "with", "that", "which", "whose", "where", "have", "has", "having", "are", "is",
    "a", "an", "the", "in", "of", "for", "and",
];

/// A numeric token with its unit markers, before field-kind resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Amount {
    raw: f64,
    scale: Option<f64>,
    percent: bool,
    currency: Option<Currency>,
}

impl Amount {
    fn value(&self) -> f64 {
        self.raw * self.scale.unwrap_or(1.0)
    }
}

/// Compile free text into a filter expression for the given market.
pub fn interpret(text: &str, market: MarketCode) -> Result<FilterExpression, ScreenerError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScreenerError::EmptyQuery);
    }

    let tokens = tokenize(trimmed);
    let clauses = split_clauses(&tokens);

    let mut predicates = Vec::new();
    for clause in &clauses {
        interpret_clause(clause, market, &mut predicates)?;
    }

    match predicates.len() {
        0 => Err(ScreenerError::UnrecognizedMetric {
            clause: trimmed.to_string(),
        }),
        1 => Ok(predicates.into_iter().next().unwrap()),
        _ => Ok(FilterExpression::And(predicates)),
    }
}

/// Lowercase and split into word tokens. Commas become their own tokens
/// (clause separators) unless they sit between digits, hyphens become
/// spaces so "price-to-earnings" matches "price to earnings" — except a
/// hyphen opening a number, which is a minus sign and stays attached.
fn tokenize(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            ',' => {
                let between_digits = i > 0
                    && chars[i - 1].is_ascii_digit()
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                if !between_digits {
                    cleaned.push(' ');
                    cleaned.push(',');
                    cleaned.push(' ');
                }
            }
            '-' => {
                let minus_sign = chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
                    && (i == 0 || !chars[i - 1].is_alphanumeric());
                if minus_sign {
                    cleaned.push('-');
                } else {
                    cleaned.push(' ');
                }
            }
            _ => cleaned.push(ch.to_ascii_lowercase()),
        }
    }

    cleaned
        .split_whitespace()
        .map(|t| t.trim_end_matches(['.', '?', '!', ';']).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split tokens into clauses on "," and "and". The first "and" after a
/// "between" belongs to the range and stays inside the clause.
fn split_clauses(tokens: &[String]) -> Vec<Vec<String>> {
    let mut clauses = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut range_pending = false;

    for token in tokens {
        match token.as_str() {
            "," => {
                range_pending = false;
                if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            }
            "and" => {
                if range_pending {
                    current.push(token.clone());
                    range_pending = false;
                } else if !current.is_empty() {
                    clauses.push(std::mem::take(&mut current));
                }
            }
            _ => {
                if token == "between" {
                    range_pending = true;
                }
                current.push(token.clone());
            }
        }
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    clauses
}

fn interpret_clause(
    clause: &[String],
    market: MarketCode,
    out: &mut Vec<FilterExpression>,
) -> Result<(), ScreenerError> {
    let sector = find_phrase_value(clause, SECTOR_SYNONYMS);
    let metric = find_metric(clause);
    let operator = find_operator(clause);
    let amounts = scan_amounts(clause);

    if let Some(sector_name) = sector {
        out.push(FilterExpression::predicate(
            FieldId::Sector,
            Operator::Eq,
            Value::Text(sector_name.to_string()),
        ));
    }

    let Some(field) = metric else {
        // A clause with comparison language or numbers but no known metric
        // is a failed clause, not ignorable filler.
        if operator.is_some() || !amounts.is_empty() {
            return Err(ScreenerError::UnrecognizedMetric {
                clause: metric_phrase(clause),
            });
        }
        return Ok(());
    };

    let clause_text = clause.join(" ");
    let op = operator.ok_or_else(|| ScreenerError::AmbiguousValue {
        clause: clause_text.clone(),
    })?;

    let predicate = if op == Operator::Between {
        let [low, high] = two_amounts(&amounts, &clause_text)?;
        build_range_predicate(field, low, high, market, &clause_text)?
    } else {
        let amount = one_amount(&amounts, &clause_text)?;
        build_comparison_predicate(field, op, amount, market, &clause_text)?
    };

    out.push(FilterExpression::Predicate(predicate));
    Ok(())
}

fn build_comparison_predicate(
    field: FieldId,
    op: Operator,
    amount: Amount,
    market: MarketCode,
    clause: &str,
) -> Result<Predicate, ScreenerError> {
    let (value, currency) = resolve_number(field.kind(), amount, market, clause)?;
    let mut predicate = Predicate::new(field, op, Value::Number(value));
    if let Some(c) = currency {
        predicate = predicate.with_currency(c);
    }
    Ok(predicate)
}

fn build_range_predicate(
    field: FieldId,
    mut low: Amount,
    high: Amount,
    market: MarketCode,
    clause: &str,
) -> Result<Predicate, ScreenerError> {
    // "between 1 and 5 billion": the upper bound's magnitude distributes
    // to a bare lower bound.
    if low.scale.is_none() && high.scale.is_some() {
        low.scale = high.scale;
    }
    if low.currency.is_none() {
        low.currency = high.currency;
    }
    if low.currency.is_some() && high.currency.is_some() && low.currency != high.currency {
        return Err(ScreenerError::AmbiguousValue {
            clause: clause.to_string(),
        });
    }

    let (low_value, currency) = resolve_number(field.kind(), low, market, clause)?;
    let (high_value, _) = resolve_number(field.kind(), high, market, clause)?;

    let mut predicate = Predicate::new(
        field,
        Operator::Between,
        Value::Range {
            low: low_value,
            high: high_value,
        },
    );
    if let Some(c) = currency {
        predicate = predicate.with_currency(c);
    }
    Ok(predicate)
}

/// Apply the field's value kind to an amount. Returns the resolved number
/// and, for monetary fields, the currency hint.
fn resolve_number(
    kind: ValueKind,
    amount: Amount,
    market: MarketCode,
    clause: &str,
) -> Result<(f64, Option<Currency>), ScreenerError> {
    let ambiguous = || ScreenerError::AmbiguousValue {
        clause: clause.to_string(),
    };
    match kind {
        ValueKind::Monetary => {
            if amount.percent {
                return Err(ambiguous());
            }
            if amount.scale.is_none() && amount.currency.is_none() {
                return Err(ambiguous());
            }
            let hint = amount.currency.unwrap_or(market.currency());
            Ok((amount.value(), Some(hint)))
        }
        ValueKind::Percentage => {
            if amount.scale.is_some() {
                return Err(ambiguous());
            }
            Ok((amount.raw, None))
        }
        ValueKind::Ratio => {
            if amount.percent || amount.scale.is_some() {
                return Err(ambiguous());
            }
            Ok((amount.raw, None))
        }
        ValueKind::Count => {
            if amount.percent {
                return Err(ambiguous());
            }
            Ok((amount.value(), None))
        }
        ValueKind::Categorical => Err(ambiguous()),
    }
}

fn one_amount(amounts: &[Amount], clause: &str) -> Result<Amount, ScreenerError> {
    match amounts {
        [single] => Ok(*single),
        _ => Err(ScreenerError::AmbiguousValue {
            clause: clause.to_string(),
        }),
    }
}

fn two_amounts(amounts: &[Amount], clause: &str) -> Result<[Amount; 2], ScreenerError> {
    match amounts {
        [low, high] => Ok([*low, *high]),
        _ => Err(ScreenerError::AmbiguousValue {
            clause: clause.to_string(),
        }),
    }
}

/// Find the position of a word phrase inside the clause tokens.
fn find_phrase(tokens: &[String], phrase: &str) -> Option<usize> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return None;
    }
    (0..=tokens.len() - words.len())
        .find(|&i| words.iter().zip(&tokens[i..]).all(|(w, t)| *w == t.as_str()))
}

fn find_phrase_value<'a, T: Copy>(tokens: &[String], table: &'a [(&str, T)]) -> Option<T> {
    let mut best: Option<(usize, T)> = None;
    for (phrase, value) in table {
        if find_phrase(tokens, phrase).is_some() {
            let len = phrase.split_whitespace().count();
            if best.is_none_or(|(best_len, _)| len > best_len) {
                best = Some((len, *value));
            }
        }
    }
    best.map(|(_, value)| value)
}

fn find_metric(tokens: &[String]) -> Option<FieldId> {
    find_phrase_value(tokens, METRIC_SYNONYMS)
}

fn find_operator(tokens: &[String]) -> Option<Operator> {
    OPERATOR_PHRASES
        .iter()
        .find(|(phrase, _)| find_phrase(tokens, phrase).is_some())
        .map(|(_, op)| *op)
}

/// Scan the clause for numeric amounts with their unit markers.
fn scan_amounts(tokens: &[String]) -> Vec<Amount> {
    let mut amounts = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Some((amount, used)) = parse_amount_at(tokens, i) {
            amounts.push(amount);
            i += used;
        } else {
            i += 1;
        }
    }
    amounts
}

fn parse_amount_at(tokens: &[String], index: usize) -> Option<(Amount, usize)> {
    let token = tokens[index].as_str();
    let mut currency = None;
    let mut rest = token;

    if let Some(stripped) = rest.strip_prefix('$') {
        currency = Some(Currency::Usd);
        rest = stripped;
    }

    let mut percent = false;
    let mut scale = None;
    if let Some(stripped) = rest.strip_suffix('%') {
        percent = true;
        rest = stripped;
    } else {
        let digits_end = rest
            .rfind(|c: char| c.is_ascii_digit() || c == '.')
            .map(|p| p + 1)?;
        let suffix = &rest[digits_end..];
        if !suffix.is_empty() {
            scale = Some(magnitude_suffix(suffix)?);
            rest = &rest[..digits_end];
        }
    }

    let raw: f64 = rest.parse().ok()?;
    let mut used = 1;

    // Unit words may follow the number: "1 billion", "10 percent",
    // "500 million dollars".
    if !percent && scale.is_none() {
        if let Some(next) = tokens.get(index + used) {
            if next == "percent" {
                percent = true;
                used += 1;
            } else if let Some(word_scale) = magnitude_word(next) {
                scale = Some(word_scale);
                used += 1;
            }
        }
    }
    if currency.is_none() {
        if let Some(next) = tokens.get(index + used) {
            if let Some(word_currency) = currency_word(next) {
                currency = Some(word_currency);
                used += 1;
            }
        }
    }

    Some((
        Amount {
            raw,
            scale,
            percent,
            currency,
        },
        used,
    ))
}

fn magnitude_suffix(suffix: &str) -> Option<f64> {
    match suffix {
        "k" => Some(1e3),
        "m" => Some(1e6),
        "b" | "bn" => Some(1e9),
        "t" | "tn" => Some(1e12),
        _ => None,
    }
}

fn magnitude_word(word: &str) -> Option<f64> {
    match word {
        "thousand" => Some(1e3),
        "million" | "millions" => Some(1e6),
        "billion" | "billions" => Some(1e9),
        "trillion" | "trillions" => Some(1e12),
        _ => None,
    }
}

fn currency_word(word: &str) -> Option<Currency> {
    match word {
        "dollar" | "dollars" | "usd" => Some(Currency::Usd),
        "riyal" | "riyals" | "sar" => Some(Currency::Sar),
        _ => None,
    }
}

/// Best-effort reconstruction of the metric phrase of a failed clause:
/// strip operator words, numbers with their unit markers, and filler.
fn metric_phrase(tokens: &[String]) -> String {
    let mut keep = vec![true; tokens.len()];

    for (phrase, _) in OPERATOR_PHRASES {
        if let Some(start) = find_phrase(tokens, phrase) {
            let len = phrase.split_whitespace().count();
            keep[start..start + len].fill(false);
        }
    }

    let mut i = 0;
    while i < tokens.len() {
        if let Some((_, used)) = parse_amount_at(tokens, i) {
            keep[i..i + used].fill(false);
            i += used;
        } else {
            i += 1;
        }
    }

    let phrase: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|&(i, token)| keep[i] && !FILLER_WORDS.contains(&token.as_str()))
        .map(|(_, token)| token.as_str())
        .collect();

    if phrase.is_empty() {
        tokens.join(" ")
    } else {
        phrase.join(" ")
    }
}

//! Domain error types.
//!
//! Any interpreter or schema-registry failure aborts the whole request:
//! a partially understood query is never executed. The execution engine
//! itself produces no errors (missing fields evaluate to non-matches).

use crate::domain::field::{FieldId, ValueKind};
use crate::domain::market::{Currency, MarketCode};

/// A parse error with position information for canonical filter expressions.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for finscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("unrecognized metric in clause '{clause}'")]
    UnrecognizedMetric { clause: String },

    #[error("ambiguous value in clause '{clause}'")]
    AmbiguousValue { clause: String },

    #[error("field {field} is not screenable in market {market}")]
    UnsupportedField { field: FieldId, market: MarketCode },

    #[error("currency mismatch: query implies {implied}, market uses {market}")]
    CurrencyMismatch { implied: Currency, market: Currency },

    #[error("invalid range: lower bound {low} exceeds upper bound {high}")]
    InvalidRange { low: f64, high: f64 },

    #[error("field {field} expects a {expected} value")]
    TypeMismatch { field: FieldId, expected: ValueKind },

    #[error(transparent)]
    FilterParse(#[from] ParseError),

    #[error("universe error: {reason}")]
    Universe { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. } | ScreenerError::ConfigMissing { .. } => 2,
            ScreenerError::Universe { .. } => 3,
            ScreenerError::FilterParse(_) => 4,
            ScreenerError::EmptyQuery
            | ScreenerError::UnrecognizedMetric { .. }
            | ScreenerError::AmbiguousValue { .. }
            | ScreenerError::UnsupportedField { .. }
            | ScreenerError::CurrencyMismatch { .. }
            | ScreenerError::InvalidRange { .. }
            | ScreenerError::TypeMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! Core screening domain: query interpretation, market schemas, filter
//! execution, and result formatting.

pub mod market;
pub mod field;
pub mod filter;
pub mod filter_parser;
pub mod interpreter;
pub mod schema;
pub mod security;
pub mod screen;
pub mod format;
pub mod pipeline;
pub mod error;

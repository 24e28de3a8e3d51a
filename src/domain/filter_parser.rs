//! Canonical filter expression parser.
//!
//! Recursive descent parser for the textual form produced by
//! `FilterExpression`'s `Display` impl. Errors carry a character offset and
//! render with a caret via [`ParseError::display_with_context`].
//!
//! Grammar:
//!
//! ```text
//! expr    := AND(expr, expr, ...) | OR(expr, expr, ...) | NOT(expr) | pred
//! pred    := EQ|LT|LTE|GT|GTE (field, number | "text")
//!          | BETWEEN(field, number, number)
//! field   := snake_case field name
//! ```

use crate::domain::error::ParseError;
use crate::domain::field::FieldId;
use crate::domain::filter::{FilterExpression, Operator, Value};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && (remaining.len() == keyword.len()
                || !remaining[keyword.len()..]
                    .chars()
                    .next()
                    .map(|c| c.is_alphanumeric() || c == '_')
                    .unwrap_or(false))
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_field(&mut self) -> Result<FieldId, ParseError> {
        self.skip_whitespace();
        let word = self.peek_word();
        match FieldId::from_name(&word) {
            Some(field) => {
                self.pos += word.len();
                Ok(field)
            }
            None => Err(ParseError {
                message: format!("unknown field '{}'", word),
                position: self.pos,
            }),
        }
    }

    fn parse_text(&mut self) -> Result<String, ParseError> {
        self.expect_char('"')?;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '"' {
                let text = self.input[start..self.pos].to_string();
                self.advance();
                return Ok(text);
            }
            self.advance();
        }
        Err(ParseError {
            message: "unterminated string literal".to_string(),
            position: start,
        })
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();
        if self.peek() == Some('"') {
            return Ok(Value::Text(self.parse_text()?));
        }
        Ok(Value::Number(self.parse_number()?))
    }

    fn parse_comparison(&mut self, op: Operator) -> Result<FilterExpression, ParseError> {
        self.expect_char('(')?;
        let field = self.parse_field()?;
        self.expect_char(',')?;
        let value = self.parse_value()?;
        self.expect_char(')')?;
        Ok(FilterExpression::predicate(field, op, value))
    }

    fn parse_between(&mut self) -> Result<FilterExpression, ParseError> {
        self.expect_char('(')?;
        let field = self.parse_field()?;
        self.expect_char(',')?;
        let low = self.parse_number()?;
        self.expect_char(',')?;
        let high = self.parse_number()?;
        self.expect_char(')')?;
        Ok(FilterExpression::predicate(
            field,
            Operator::Between,
            Value::Range { low, high },
        ))
    }

    fn parse_connective(&mut self, name: &str) -> Result<Vec<FilterExpression>, ParseError> {
        self.expect_char('(')?;

        let mut children = Vec::new();
        children.push(self.parse_expr()?);

        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                break;
            }
            self.expect_char(',')?;
            children.push(self.parse_expr()?);
        }

        if children.len() < 2 {
            return Err(ParseError {
                message: format!("{} requires at least 2 expressions", name),
                position: self.pos,
            });
        }

        Ok(children)
    }

    fn parse_expr(&mut self) -> Result<FilterExpression, ParseError> {
        self.skip_whitespace();

        if self.consume_keyword("AND") {
            return Ok(FilterExpression::And(self.parse_connective("AND")?));
        }
        if self.consume_keyword("OR") {
            return Ok(FilterExpression::Or(self.parse_connective("OR")?));
        }
        if self.consume_keyword("NOT") {
            self.expect_char('(')?;
            let inner = self.parse_expr()?;
            self.expect_char(')')?;
            return Ok(FilterExpression::Not(Box::new(inner)));
        }

        if self.consume_keyword("BETWEEN") {
            return self.parse_between();
        }
        // LTE/GTE before LT/GT is irrelevant here since peek_keyword checks
        // word boundaries, but keep the two-char forms explicit.
        for (kw, op) in [
            ("EQ", Operator::Eq),
            ("LTE", Operator::Lte),
            ("LT", Operator::Lt),
            ("GTE", Operator::Gte),
            ("GT", Operator::Gt),
        ] {
            if self.consume_keyword(kw) {
                return self.parse_comparison(op);
            }
        }

        let word = self.peek_word();
        Err(ParseError {
            message: format!("expected expression, found '{}'", word),
            position: self.pos,
        })
    }

    fn parse(&mut self) -> Result<FilterExpression, ParseError> {
        let expr = self.parse_expr()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after expression: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(expr)
    }
}

pub fn parse(input: &str) -> Result<FilterExpression, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}

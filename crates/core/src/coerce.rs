//! Numeric coercion for form input.
//!
//! Every numeric field that reaches persistence goes through this rule:
//! empty/null input becomes `0`, numbers pass through, text is parsed as a
//! decimal with either `,` or `.` as the separator, and unparsable text
//! becomes `0`. Coercion never fails.

use serde::{Deserialize, Serialize};

/// A numeric field as it arrives from a form: a number, free text, or
/// nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl From<f64> for NumericInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for NumericInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

pub fn coerce_decimal(input: &NumericInput) -> f64 {
    match input {
        NumericInput::Number(n) => *n,
        NumericInput::Text(s) => coerce_text(s),
        NumericInput::Empty => 0.0,
    }
}

fn coerce_text(s: &str) -> f64 {
    let normalized = s.replace(',', ".");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

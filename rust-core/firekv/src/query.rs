// SPDX-License-Identifier: PMPL-1.0-or-later
//! Single-field predicates evaluated against decoded documents.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FireKvError;

/// Comparison operator of a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl Operator {
    /// All operators, in symbol order.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    /// The textual symbol, e.g. `">="`.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = FireKvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| FireKvError::UnknownOperator(s.to_string()))
    }
}

/// The result of looking a field up in a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// The document has no such field (or is not an object).
    Missing,
    Present(&'a Value),
}

impl<'a> Field<'a> {
    /// Look `name` up in `document`.
    pub fn lookup(document: &'a Value, name: &str) -> Self {
        match document.get(name) {
            Some(value) => Field::Present(value),
            None => Field::Missing,
        }
    }
}

/// Whether `document[field] <operator> value` holds.
///
/// Equality is structural, with numbers compared by value (`1 == 1.0`).
/// Ordering applies to number/number, string/string and bool/bool pairs; any
/// other pairing, including a missing field, never satisfies an ordering
/// operator. A missing field is unequal to every value.
pub fn matches(document: &Value, field: &str, operator: Operator, value: &Value) -> bool {
    let actual = match Field::lookup(document, field) {
        Field::Present(actual) => actual,
        Field::Missing => return operator == Operator::Neq,
    };

    match operator {
        Operator::Eq => values_equal(actual, value),
        Operator::Neq => !values_equal(actual, value),
        Operator::Gt => compare(actual, value) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            compare(actual, value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => compare(actual, value) == Some(Ordering::Less),
        Operator::Lte => matches!(
            compare(actual, value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

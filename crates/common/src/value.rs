// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::de::Error;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum ValNumber {
    I64(i64),
    F64(f64),
}

impl ValNumber {
    pub fn as_f64(&self) -> f64 {
        match self {
            ValNumber::I64(n) => *n as f64,
            ValNumber::F64(n) => *n,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ValNumber::I64(n) => Some(*n),
            ValNumber::F64(_) => None,
        }
    }
}

impl Display for ValNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValNumber::I64(n) => write!(f, "{n}"),
            ValNumber::F64(n) => write!(f, "{n}"),
        }
    }
}

/// Ordering across integer and float values, so that filters such as
/// `lt`/`gte` work regardless of how a number literal was written.
impl PartialOrd for ValNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (ValNumber::I64(left), ValNumber::I64(right)) => left.partial_cmp(right),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl TryFrom<serde_json::Number> for ValNumber {
    type Error = ();

    fn try_from(value: serde_json::Number) -> Result<Self, Self::Error> {
        if let Some(n) = value.as_i64() {
            Ok(ValNumber::I64(n))
        } else if let Some(n) = value.as_f64() {
            Ok(ValNumber::F64(n))
        } else {
            Err(())
        }
    }
}

impl TryFrom<ValNumber> for serde_json::Number {
    type Error = ();

    fn try_from(value: ValNumber) -> Result<Self, Self::Error> {
        match value {
            ValNumber::I64(n) => Ok(serde_json::Number::from(n)),
            ValNumber::F64(n) => serde_json::Number::from_f64(n).ok_or(()),
        }
    }
}

impl From<i32> for ValNumber {
    fn from(value: i32) -> Self {
        ValNumber::I64(value as i64)
    }
}

impl From<i64> for ValNumber {
    fn from(value: i64) -> Self {
        ValNumber::I64(value)
    }
}

impl From<f64> for ValNumber {
    fn from(value: f64) -> Self {
        ValNumber::F64(value)
    }
}

/// Represents a value that can be used in:
/// - operation arguments (filters, order directives, mutation data)
/// - stored item columns
/// - session values
///
/// `Object` preserves insertion order, since argument declaration order is
/// significant for filter and order-by resolution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Val {
    Bool(bool),
    Number(ValNumber),
    String(String),
    List(Vec<Val>),
    Object(IndexMap<String, Val>),
    Enum(String),
    Null,
}

pub const TRUE: Val = Val::Bool(true);
pub const FALSE: Val = Val::Bool(false);

impl Val {
    pub fn get(&self, key: &str) -> Option<&Val> {
        match self {
            Val::Object(o) => o.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Val::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Val>> {
        match self {
            Val::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Ordering between two values of compatible shape (`None` otherwise).
    pub fn compare(&self, other: &Val) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Val::Number(left), Val::Number(right)) => left.partial_cmp(right),
            (Val::String(left), Val::String(right)) => Some(left.cmp(right)),
            (Val::Bool(left), Val::Bool(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

impl Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Val::Bool(b) => write!(f, "{b}"),
            Val::Number(n) => write!(f, "{n}"),
            Val::String(s) => write!(f, "\"{s}\""),
            Val::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Val::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Val::Enum(e) => write!(f, "{e}"),
            Val::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for Val {
    fn from(value: bool) -> Self {
        Val::Bool(value)
    }
}

impl From<i32> for Val {
    fn from(value: i32) -> Self {
        Val::Number(value.into())
    }
}

impl From<i64> for Val {
    fn from(value: i64) -> Self {
        Val::Number(value.into())
    }
}

impl From<f64> for Val {
    fn from(value: f64) -> Self {
        Val::Number(value.into())
    }
}

impl From<&str> for Val {
    fn from(value: &str) -> Self {
        Val::String(value.to_owned())
    }
}

impl From<String> for Val {
    fn from(value: String) -> Self {
        Val::String(value)
    }
}

impl TryFrom<serde_json::Value> for Val {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Val::Null),
            serde_json::Value::Bool(b) => Ok(Val::Bool(b)),
            serde_json::Value::Number(n) => Ok(Val::Number(
                n.try_into()
                    .map_err(|_| serde_json::Error::custom("Invalid number"))?,
            )),
            serde_json::Value::String(s) => Ok(Val::String(s)),
            serde_json::Value::Array(l) => Ok(Val::List(
                l.into_iter()
                    .map(Val::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            serde_json::Value::Object(o) => Ok(Val::Object(
                o.into_iter()
                    .map(|(k, v)| Ok((k, Val::try_from(v)?)))
                    .collect::<Result<_, _>>()?,
            )),
        }
    }
}

impl TryFrom<Val> for serde_json::Value {
    type Error = serde_json::Error;

    fn try_from(value: Val) -> Result<Self, Self::Error> {
        match value {
            Val::Null => Ok(serde_json::Value::Null),
            Val::Bool(b) => Ok(serde_json::Value::Bool(b)),
            Val::Number(n) => Ok(serde_json::Value::Number(
                n.try_into()
                    .map_err(|_| serde_json::Error::custom("Invalid number"))?,
            )),
            Val::String(s) => Ok(serde_json::Value::String(s)),
            Val::List(l) => Ok(serde_json::Value::Array(
                l.into_iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            Val::Object(o) => Ok(serde_json::Value::Object(
                o.into_iter()
                    .map(|(k, v)| Ok((k, serde_json::Value::try_from(v)?)))
                    .collect::<Result<_, _>>()?,
            )),
            Val::Enum(e) => Ok(serde_json::Value::String(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_object_order() {
        let json = serde_json::json!({"b": 1, "a": {"nested": true}, "c": [1, 2.5, "x", null]});
        let val = Val::try_from(json.clone()).unwrap();

        let Val::Object(o) = &val else {
            panic!("expected object")
        };
        assert_eq!(o.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);

        let back: serde_json::Value = val.try_into().unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn number_comparison_across_kinds() {
        assert_eq!(
            Val::from(1).compare(&Val::from(2)),
            Some(std::cmp::Ordering::Less)
        );
        assert_eq!(
            Val::from(2).compare(&Val::from(2.0)),
            Some(std::cmp::Ordering::Equal)
        );
        assert!(Val::from(2.5).compare(&Val::from(3)) == Some(std::cmp::Ordering::Less));
        assert_eq!(Val::from("a").compare(&Val::from(1)), None);
    }
}

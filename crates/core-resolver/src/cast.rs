// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use chrono::DateTime;
use common::value::{Val, ValNumber};
use core_model::field::ScalarKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastError {
    #[error("Expected a {1} value, got '{0}'")]
    Invalid(String, &'static str),

    #[error("Invalid date-time '{0}': {1}")]
    DateTime(String, chrono::ParseError),
}

/// Coerce a literal operand to a field's declared scalar kind. `Null`
/// passes through; equality against null is meaningful, and non-null
/// operators treat null rows as non-matching.
pub fn cast_value(value: &Val, scalar: ScalarKind) -> Result<Val, CastError> {
    if value.is_null() {
        return Ok(Val::Null);
    }

    match scalar {
        ScalarKind::Int => match value {
            Val::Number(n) if n.as_i64().is_some() => Ok(value.clone()),
            _ => Err(CastError::Invalid(value.to_string(), "Int")),
        },
        ScalarKind::Float => match value {
            Val::Number(n) => Ok(Val::Number(ValNumber::F64(n.as_f64()))),
            _ => Err(CastError::Invalid(value.to_string(), "Float")),
        },
        ScalarKind::Boolean => match value {
            Val::Bool(_) => Ok(value.clone()),
            _ => Err(CastError::Invalid(value.to_string(), "Boolean")),
        },
        ScalarKind::String => match value {
            Val::String(_) => Ok(value.clone()),
            _ => Err(CastError::Invalid(value.to_string(), "String")),
        },
        ScalarKind::DateTime => match value {
            Val::String(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|_| value.clone())
                .map_err(|e| CastError::DateTime(raw.clone(), e)),
            _ => Err(CastError::Invalid(value.to_string(), "DateTime")),
        },
        ScalarKind::Json => Ok(value.clone()),
    }
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::value::Val;
use core_model::field::{DbField, ScalarKind};
use core_model::list::ListDescriptor;
use lattice_store::{FieldCond, StoreFilter};

use crate::cast::cast_value;
use crate::execution_error::ExecutionError;
use crate::request_context::RequestContext;

/// A validated single-row selector: exactly one unique field paired with a
/// non-null value of the field's scalar type.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueFilter {
    pub field_key: String,
    pub value: Val,
}

impl UniqueFilter {
    pub fn to_filter(&self) -> StoreFilter {
        StoreFilter::Cond(
            self.field_key.clone(),
            FieldCond::Equals(self.value.clone()),
        )
    }
}

/// Validates a unique selector against a list. The selector must carry
/// exactly one key; the key must name a unique field; the value must be
/// non-null and castable. Only String and Int scalar db fields can back a
/// unique selector.
pub fn map_unique_where_to_where(
    unique_where: &Val,
    list: &ListDescriptor,
) -> Result<UniqueFilter, ExecutionError> {
    let input_name = &list.names().where_unique_input;

    let Val::Object(entries) = unique_where else {
        return Err(ExecutionError::validation(
            input_name.clone(),
            "A unique selector must be an object",
        ));
    };
    if entries.len() != 1 {
        return Err(ExecutionError::validation(
            input_name.clone(),
            format!("Exactly one key must be passed in a unique where input, received {}", entries.len()),
        ));
    }
    let (key, value) = entries.iter().next().unwrap();

    let field = list.field(key).ok_or_else(|| {
        ExecutionError::validation(key, format!("Field does not exist on {input_name}"))
    })?;
    if !field.unique {
        return Err(ExecutionError::validation(
            key,
            "Field is not unique and cannot select a single item",
        ));
    }
    if value.is_null() {
        return Err(ExecutionError::validation(
            key,
            "The unique value provided in a unique where input must not be null",
        ));
    }

    match &field.db_field {
        DbField::Scalar { scalar } if matches!(scalar, ScalarKind::String | ScalarKind::Int) => {
            let value = cast_value(value, *scalar).map_err(|_| {
                let expected = match scalar {
                    ScalarKind::String => "a String value",
                    _ => "an Int value",
                };
                ExecutionError::TypeMismatch {
                    field: key.clone(),
                    expected,
                }
            })?;
            Ok(UniqueFilter {
                field_key: key.clone(),
                value,
            })
        }
        db_field => Err(ExecutionError::Configuration(format!(
            "Currently only String and Int scalar db fields can provide a unique where input, received {}",
            db_field.kind_name()
        ))),
    }
}

/// Applies the field's configured unique-input resolver, if any, before
/// validation. Lets a field re-shape its unique selector value (case
/// folding, identifier parsing) the same way regular inputs are resolved.
pub async fn resolve_unique_where_input(
    unique_where: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<UniqueFilter, ExecutionError> {
    let resolved = match unique_where {
        Val::Object(entries) if entries.len() == 1 => {
            let (key, value) = entries.iter().next().unwrap();
            match list.field(key).and_then(|f| f.unique_input.as_ref()) {
                Some(resolver) => {
                    let value = resolver.resolve(value.clone(), ctx.session()).await?;
                    let mut entries = entries.clone();
                    entries[0] = value;
                    Val::Object(entries)
                }
                None => unique_where.clone(),
            }
        }
        _ => unique_where.clone(),
    };
    map_unique_where_to_where(&resolved, list)
}

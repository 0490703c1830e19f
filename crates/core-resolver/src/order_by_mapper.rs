// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::value::Val;
use core_model::field::{DbField, multi_column_key};
use core_model::list::ListDescriptor;
use futures::future::try_join_all;
use lattice_store::{Direction, OrderClause};

use crate::execution_error::ExecutionError;
use crate::request_context::RequestContext;

/// Resolves an ordering directive list into store-native order clauses.
///
/// Each directive is an object carrying exactly one field key. Directives
/// are resolved concurrently; clause order is fixed by directive position,
/// not completion order, since stores apply multi-key sorts positionally.
pub async fn resolve_order_by(
    order_by: &[Val],
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Vec<OrderClause>, ExecutionError> {
    try_join_all(
        order_by
            .iter()
            .map(|directive| resolve_directive(directive, list, ctx)),
    )
    .await
}

async fn resolve_directive(
    directive: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<OrderClause, ExecutionError> {
    let input_name = &list.names().order_by_input;

    let Val::Object(entries) = directive else {
        return Err(ExecutionError::validation(
            input_name.clone(),
            "An ordering directive must be an object",
        ));
    };
    if entries.len() != 1 {
        return Err(ExecutionError::validation(
            input_name.clone(),
            format!("Only a single key must be passed to {input_name}"),
        ));
    }
    let (key, value) = entries.iter().next().unwrap();
    if value.is_null() {
        return Err(ExecutionError::validation(
            key,
            "null cannot be passed as an order direction",
        ));
    }

    let field = list.field(key).ok_or_else(|| {
        ExecutionError::validation(key, format!("Field does not exist on {input_name}"))
    })?;
    if !field.orderable {
        return Err(ExecutionError::validation(
            key,
            "Field cannot be used for ordering",
        ));
    }

    let resolved = match &field.order_input {
        Some(resolver) => resolver.resolve(value.clone(), ctx.session()).await?,
        None => value.clone(),
    };

    match &field.db_field {
        // Multi fields sort by one of their sub-columns; the resolved value
        // must name exactly which one.
        DbField::Multi { .. } => {
            let Val::Object(sub_directives) = &resolved else {
                return Err(ExecutionError::Configuration(format!(
                    "The order input resolver for field '{key}' must return an object"
                )));
            };
            if sub_directives.len() != 1 {
                return Err(ExecutionError::Configuration(format!(
                    "Only a single key must be returned from the order input resolver for field '{key}'"
                )));
            }
            let (sub_key, sub_value) = sub_directives.iter().next().unwrap();
            Ok(OrderClause::new(
                multi_column_key(key, sub_key),
                parse_direction(key, sub_value)?,
            ))
        }
        DbField::Scalar { .. } => {
            Ok(OrderClause::new(key.clone(), parse_direction(key, &resolved)?))
        }
        db_field => Err(ExecutionError::Configuration(format!(
            "A {} db field cannot be ordered by",
            db_field.kind_name()
        ))),
    }
}

fn parse_direction(key: &str, value: &Val) -> Result<Direction, ExecutionError> {
    let raw = match value {
        Val::String(s) => s.as_str(),
        Val::Enum(s) => s.as_str(),
        _ => {
            return Err(ExecutionError::validation(
                key,
                "An order direction must be 'asc' or 'desc'",
            ));
        }
    };
    match raw {
        "asc" => Ok(Direction::Asc),
        "desc" => Ok(Direction::Desc),
        other => Err(ExecutionError::validation(
            key,
            format!("Unknown order direction '{other}'"),
        )),
    }
}

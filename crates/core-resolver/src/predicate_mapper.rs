// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_recursion::async_recursion;
use common::value::Val;
use core_model::field::{DbField, RelationCardinality, ScalarKind};
use core_model::list::ListDescriptor;
use lattice_store::{FieldCond, ID_COLUMN, StoreFilter};

use crate::cast::cast_value;
use crate::execution_error::ExecutionError;
use crate::request_context::RequestContext;

/// Translates a filter expression into a store-native predicate.
///
/// The expression is a tree of `AND`/`OR`/`NOT` combinators over per-field
/// leaf filters, or a bare `true`/`false` sentinel (produced by the
/// access-control gate, never by end users). Combinator children are
/// resolved strictly in declaration order, sequentially: leaf resolution
/// may run queries (relationship filters), and evaluation order is part of
/// the contract.
#[async_recursion]
pub async fn resolve_where_input(
    where_: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<StoreFilter, ExecutionError> {
    match where_ {
        Val::Null => Ok(StoreFilter::True),
        Val::Bool(b) => Ok((*b).into()),
        Val::Object(entries) => {
            let mut resolved = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                resolved.push(resolve_entry(key, value, list, ctx).await?);
            }
            Ok(conjoin(resolved))
        }
        _ => Err(ExecutionError::validation(
            list.names().where_input.clone(),
            "A filter must be an object",
        )),
    }
}

fn conjoin(mut filters: Vec<StoreFilter>) -> StoreFilter {
    match filters.len() {
        0 => StoreFilter::True,
        1 => filters.pop().unwrap(),
        _ => StoreFilter::And(filters),
    }
}

async fn resolve_entry(
    key: &str,
    value: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<StoreFilter, ExecutionError> {
    if matches!(key, "AND" | "OR" | "NOT") {
        let Val::List(children) = value else {
            return Err(ExecutionError::validation(
                list.names().where_input.clone(),
                format!("'{key}' must be a list of filters"),
            ));
        };
        let mut resolved = Vec::with_capacity(children.len());
        for child in children {
            resolved.push(resolve_where_input(child, list, ctx).await?);
        }
        return Ok(match key {
            "AND" => StoreFilter::And(resolved),
            "OR" => StoreFilter::Or(resolved),
            _ => StoreFilter::Not(resolved),
        });
    }

    let field = list.field(key).ok_or_else(|| {
        ExecutionError::validation(
            key,
            format!("Field does not exist on {}", list.names().where_input),
        )
    })?;
    if !field.filterable {
        return Err(ExecutionError::validation(
            key,
            "Field cannot be used in a filter",
        ));
    }

    match &field.db_field {
        DbField::Scalar { scalar } => scalar_filter(key, *scalar, value),
        DbField::Relationship {
            list: target,
            cardinality,
            foreign_key,
        } => relationship_filter(key, target, *cardinality, foreign_key, value, ctx).await,
        db_field => Err(ExecutionError::validation(
            key,
            format!("A {} db field cannot be filtered", db_field.kind_name()),
        )),
    }
}

fn scalar_filter(key: &str, scalar: ScalarKind, value: &Val) -> Result<StoreFilter, ExecutionError> {
    let Val::Object(operators) = value else {
        return Err(ExecutionError::validation(
            key,
            "Malformed filter; expected an object of operators",
        ));
    };

    let mut conds = Vec::with_capacity(operators.len());
    for (op, operand) in operators {
        let cond = match op.as_str() {
            "equals" => FieldCond::Equals(cast_value(operand, scalar)?),
            "in" => FieldCond::In(cast_operand_list(key, op, operand, scalar)?),
            "notIn" => FieldCond::NotIn(cast_operand_list(key, op, operand, scalar)?),
            "lt" => FieldCond::Lt(cast_value(operand, scalar)?),
            "lte" => FieldCond::Lte(cast_value(operand, scalar)?),
            "gt" => FieldCond::Gt(cast_value(operand, scalar)?),
            "gte" => FieldCond::Gte(cast_value(operand, scalar)?),
            "contains" => FieldCond::Contains(string_operand(key, op, operand, scalar)?),
            "startsWith" => FieldCond::StartsWith(string_operand(key, op, operand, scalar)?),
            "endsWith" => FieldCond::EndsWith(string_operand(key, op, operand, scalar)?),
            "not" => {
                let inner = scalar_filter(key, scalar, operand)?;
                conds.push(StoreFilter::Not(vec![inner]));
                continue;
            }
            _ => {
                return Err(ExecutionError::validation(
                    key,
                    format!("Unknown filter operator '{op}'"),
                ));
            }
        };
        conds.push(StoreFilter::Cond(key.to_string(), cond));
    }

    Ok(conjoin(conds))
}

fn cast_operand_list(
    key: &str,
    op: &str,
    operand: &Val,
    scalar: ScalarKind,
) -> Result<Vec<Val>, ExecutionError> {
    let Val::List(operands) = operand else {
        return Err(ExecutionError::validation(
            key,
            format!("'{op}' expects a list of values"),
        ));
    };
    operands
        .iter()
        .map(|operand| Ok(cast_value(operand, scalar)?))
        .collect()
}

fn string_operand(
    key: &str,
    op: &str,
    operand: &Val,
    scalar: ScalarKind,
) -> Result<String, ExecutionError> {
    if scalar != ScalarKind::String {
        return Err(ExecutionError::validation(
            key,
            format!("'{op}' is only supported on String fields"),
        ));
    }
    match operand {
        Val::String(s) => Ok(s.clone()),
        _ => Err(ExecutionError::validation(
            key,
            format!("'{op}' expects a string value"),
        )),
    }
}

/// Relationship leaves cannot be expressed as a single-column condition, so
/// the nested filter is resolved against the target list and the target
/// store is queried for the linking column's values. Access filters of the
/// target list are deliberately not applied here; relation filters narrow
/// by data shape, not by visibility.
async fn relationship_filter(
    key: &str,
    target_key: &str,
    cardinality: RelationCardinality,
    foreign_key: &str,
    value: &Val,
    ctx: &RequestContext<'_>,
) -> Result<StoreFilter, ExecutionError> {
    let target = ctx.schema().list(target_key).ok_or_else(|| {
        ExecutionError::Configuration(format!(
            "Relationship field '{key}' references unknown list '{target_key}'"
        ))
    })?;

    match cardinality {
        // To-one: the nested filter selects target rows; the owning row's
        // foreign key must point at one of them.
        RelationCardinality::One => {
            let target_filter = resolve_where_input(value, target, ctx).await?;
            let ids = linked_column_values(target_key, &target_filter, ID_COLUMN, ctx).await?;
            Ok(StoreFilter::Cond(foreign_key.to_string(), FieldCond::In(ids)))
        }
        RelationCardinality::Many => {
            let Val::Object(operators) = value else {
                return Err(ExecutionError::validation(
                    key,
                    "Malformed filter; expected some/every/none",
                ));
            };
            if operators.is_empty() {
                return Err(ExecutionError::validation(
                    key,
                    "Malformed filter; expected some/every/none",
                ));
            }

            let mut resolved = Vec::with_capacity(operators.len());
            for (op, nested) in operators {
                let filter = match op.as_str() {
                    "some" => some_filter(target_key, target, nested, foreign_key, ctx).await?,
                    "none" => StoreFilter::Not(vec![
                        some_filter(target_key, target, nested, foreign_key, ctx).await?,
                    ]),
                    // every f == no related row violating f
                    "every" => {
                        let target_filter = resolve_where_input(nested, target, ctx).await?;
                        let violating = StoreFilter::Not(vec![target_filter]);
                        let owner_ids =
                            linked_column_values(target_key, &violating, foreign_key, ctx).await?;
                        StoreFilter::Not(vec![StoreFilter::Cond(
                            ID_COLUMN.to_string(),
                            FieldCond::In(owner_ids),
                        )])
                    }
                    _ => {
                        return Err(ExecutionError::validation(
                            key,
                            format!("Unknown relationship filter operator '{op}'"),
                        ));
                    }
                };
                resolved.push(filter);
            }
            Ok(conjoin(resolved))
        }
    }
}

async fn some_filter(
    target_key: &str,
    target: &ListDescriptor,
    nested: &Val,
    foreign_key: &str,
    ctx: &RequestContext<'_>,
) -> Result<StoreFilter, ExecutionError> {
    let target_filter = resolve_where_input(nested, target, ctx).await?;
    let owner_ids = linked_column_values(target_key, &target_filter, foreign_key, ctx).await?;
    Ok(StoreFilter::Cond(
        ID_COLUMN.to_string(),
        FieldCond::In(owner_ids),
    ))
}

async fn linked_column_values(
    target_key: &str,
    filter: &StoreFilter,
    column: &str,
    ctx: &RequestContext<'_>,
) -> Result<Vec<Val>, ExecutionError> {
    let model = ctx.model(target_key)?;
    let rows = model.find_many(filter, &[], None, 0).await?;

    let mut values: Vec<Val> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(value) = row.get(column) {
            if !value.is_null() && !values.contains(value) {
                values.push(value.clone());
            }
        }
    }
    Ok(values)
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Write operations. Unlike reads, a denied mutation fails loudly with
//! [`ExecutionError::AccessDenied`]; there is no neutral value to hide
//! behind once a caller asks to change data.

use common::value::Val;
use core_model::access::{AccessFilters, OperationKind};
use core_model::field::{DbField, DefaultValue, FieldDescriptor, multi_column_key};
use core_model::list::ListDescriptor;
use futures::future::try_join_all;
use lattice_store::{ID_COLUMN, Item, StoreFilter};
use tracing::instrument;

use crate::auth_util::{access_controlled_filter, check_operation_access, get_access_filters};
use crate::cast::cast_value;
use crate::execution_error::{ExecutionError, WithContext};
use crate::request_context::RequestContext;
use crate::unique_where_mapper::resolve_unique_where_input;

/// Creates one item. Fields absent from `data` fall back to their default
/// value, when one is configured.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn create_one(
    data: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Item, ExecutionError> {
    if !check_operation_access(list, OperationKind::Create, ctx).await? {
        return Err(ExecutionError::AccessDenied(
            list.names().create_one.clone(),
        ));
    }

    let data = expect_object(data, &list.names().create_one)?;
    reject_unknown_keys(data, list, &list.names().create_one)?;

    // Per-field input resolution is independent; run it concurrently and
    // assemble columns in field declaration order afterwards.
    let resolved = try_join_all(list.fields().iter().map(|(key, field)| async move {
        match data.get(key.as_str()) {
            Some(raw) => {
                let raw = match &field.create_input {
                    Some(resolver) => resolver.resolve(raw.clone(), ctx.session()).await?,
                    None => raw.clone(),
                };
                Ok::<_, ExecutionError>(Some((key, field, raw)))
            }
            None => Ok(default_for(field, ctx)
                .await?
                .map(|value| (key, field, value))),
        }
    }))
    .await?;

    let mut item = Item::new();
    for (key, field, value) in resolved.into_iter().flatten() {
        write_field_value(&mut item, key, field, &value)?;
    }

    ctx.model(list.list_key())?
        .create(item)
        .await
        .map_err(ExecutionError::from)
        .with_context(format!("While creating an item in '{}'", list.list_key()))
}

/// Updates the single item selected by a unique-where input. The target is
/// located through the access-composed filter; a miss reads as access
/// denied whether the item is hidden or absent.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn update_one(
    unique_where: &Val,
    data: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Item, ExecutionError> {
    let existing = locate_for_mutation(
        unique_where,
        list,
        OperationKind::Update,
        &list.names().update_one,
        ctx,
    )
    .await?;

    let data = expect_object(data, &list.names().update_one)?;
    let mut values = Item::new();
    for (key, raw) in data {
        let field = list.field(key).ok_or_else(|| {
            ExecutionError::validation(
                key.clone(),
                format!("Field does not exist on {}", list.names().update_one),
            )
        })?;
        let raw = match &field.update_input {
            Some(resolver) => resolver.resolve(raw.clone(), ctx.session()).await?,
            None => raw.clone(),
        };
        write_field_value(&mut values, key, field, &raw)?;
    }

    let updated = ctx
        .model(list.list_key())?
        .update(&id_filter(&existing, list)?, values)
        .await?;
    updated.ok_or_else(|| ExecutionError::AccessDenied(list.names().update_one.clone()))
}

/// Deletes the single item selected by a unique-where input, returning the
/// deleted item.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn delete_one(
    unique_where: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Item, ExecutionError> {
    let existing = locate_for_mutation(
        unique_where,
        list,
        OperationKind::Delete,
        &list.names().delete_one,
        ctx,
    )
    .await?;

    let deleted = ctx
        .model(list.list_key())?
        .delete(&id_filter(&existing, list)?)
        .await?;
    deleted.ok_or_else(|| ExecutionError::AccessDenied(list.names().delete_one.clone()))
}

/// Checks access, resolves the unique selector, composes it with the
/// operation's row filters, and fetches the target. Denial is checked
/// before the selector is looked at; denial and nonexistence produce the
/// same error, so a caller cannot tell hidden items from missing ones.
async fn locate_for_mutation(
    unique_where: &Val,
    list: &ListDescriptor,
    operation: OperationKind,
    operation_name: &str,
    ctx: &RequestContext<'_>,
) -> Result<Item, ExecutionError> {
    let access = get_access_filters(list, operation, ctx).await?;
    if access == AccessFilters::DenyAll {
        return Err(ExecutionError::AccessDenied(operation_name.to_string()));
    }

    let unique_filter = resolve_unique_where_input(unique_where, list, ctx).await?;
    let Some(filter) =
        access_controlled_filter(unique_filter.to_filter(), &access, list, ctx).await?
    else {
        return Err(ExecutionError::AccessDenied(operation_name.to_string()));
    };

    ctx.model(list.list_key())?
        .find_first(&filter)
        .await?
        .ok_or_else(|| ExecutionError::AccessDenied(operation_name.to_string()))
}

fn id_filter(item: &Item, list: &ListDescriptor) -> Result<StoreFilter, ExecutionError> {
    let id = item.get(ID_COLUMN).ok_or_else(|| {
        ExecutionError::Configuration(format!(
            "Items of list '{}' must carry an '{ID_COLUMN}' column",
            list.list_key()
        ))
    })?;
    Ok(StoreFilter::equals(ID_COLUMN, id.clone()))
}

fn expect_object<'a>(
    data: &'a Val,
    operation_name: &str,
) -> Result<&'a indexmap::IndexMap<String, Val>, ExecutionError> {
    match data {
        Val::Object(entries) => Ok(entries),
        _ => Err(ExecutionError::validation(
            operation_name,
            "The data argument must be an object",
        )),
    }
}

/// Lowers a resolved field value onto storage columns. Scalars write one
/// column; multi fields expand sub-keys to their composite columns.
/// Relationship and computed fields have no direct column and cannot be
/// written through the data argument.
fn write_field_value(
    item: &mut Item,
    key: &str,
    field: &FieldDescriptor,
    value: &Val,
) -> Result<(), ExecutionError> {
    match &field.db_field {
        DbField::Scalar { scalar } => {
            item.insert(key.to_string(), cast_value(value, *scalar)?);
            Ok(())
        }
        DbField::Multi { columns } => {
            let Val::Object(sub_values) = value else {
                return Err(ExecutionError::validation(
                    key,
                    "A composite field value must be an object of sub-values",
                ));
            };
            for (sub_key, sub_value) in sub_values {
                let scalar = columns.get(sub_key).ok_or_else(|| {
                    ExecutionError::validation(
                        key,
                        format!("Unknown sub-field '{sub_key}'"),
                    )
                })?;
                item.insert(
                    multi_column_key(key, sub_key),
                    cast_value(sub_value, *scalar)?,
                );
            }
            Ok(())
        }
        db_field => Err(ExecutionError::validation(
            key,
            format!("A {} db field cannot be written directly", db_field.kind_name()),
        )),
    }
}

async fn default_for(
    field: &FieldDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Option<Val>, ExecutionError> {
    match &field.default_value {
        Some(DefaultValue::Static(value)) => Ok(Some(value.clone())),
        Some(DefaultValue::Dynamic(default)) => Ok(default.resolve(ctx.session()).await?),
        None => Ok(None),
    }
}

fn reject_unknown_keys(
    data: &indexmap::IndexMap<String, Val>,
    list: &ListDescriptor,
    operation_name: &str,
) -> Result<(), ExecutionError> {
    for key in data.keys() {
        if list.field(key).is_none() {
            return Err(ExecutionError::validation(
                key.clone(),
                format!("Field does not exist on {operation_name}"),
            ));
        }
    }
    Ok(())
}

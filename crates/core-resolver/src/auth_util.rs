// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::access::{AccessFilters, OperationKind};
use core_model::list::ListDescriptor;
use lattice_store::StoreFilter;

use crate::execution_error::ExecutionError;
use crate::predicate_mapper::resolve_where_input;
use crate::request_context::RequestContext;

/// Operation-level gate. A `false` here means the whole operation is off
/// limits for the session, before any row is considered.
pub async fn check_operation_access(
    list: &ListDescriptor,
    operation: OperationKind,
    ctx: &RequestContext<'_>,
) -> Result<bool, ExecutionError> {
    Ok(list
        .access()
        .operation_allowed(operation, ctx.session())
        .await?)
}

/// Row-level access for an operation. An operation-level denial collapses
/// to `DenyAll` without consulting the row policy.
pub async fn get_access_filters(
    list: &ListDescriptor,
    operation: OperationKind,
    ctx: &RequestContext<'_>,
) -> Result<AccessFilters, ExecutionError> {
    if !check_operation_access(list, operation, ctx).await? {
        return Ok(AccessFilters::DenyAll);
    }
    Ok(list.access().row_filters(operation, ctx.session()).await?)
}

/// Conjoins a resolved request filter with the session's access filter.
/// Returns `None` on full denial; the caller answers with the operation's
/// neutral value and never reaches the store. The access expression is
/// resolved through the same filter pipeline as user input, so it may use
/// the full filter language including relationship traversal.
pub async fn access_controlled_filter(
    resolved_where: StoreFilter,
    filters: &AccessFilters,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<Option<StoreFilter>, ExecutionError> {
    match filters {
        AccessFilters::DenyAll => Ok(None),
        AccessFilters::AllowAll => Ok(Some(resolved_where)),
        AccessFilters::Filter(expr) => {
            let access_filter = resolve_where_input(expr, list, ctx).await?;
            Ok(Some(StoreFilter::And(vec![resolved_where, access_filter])))
        }
    }
}

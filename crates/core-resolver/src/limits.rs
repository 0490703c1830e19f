// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::list::ListDescriptor;

use crate::execution_error::{ExecutionError, LimitExceeded, LimitKind};
use crate::request_context::RequestContext;

/// Rejects a `take` that already exceeds the per-list cap, before the
/// store is touched. A negative `take` selects from the tail; its
/// magnitude is what counts against the cap.
pub fn apply_early_max_results(
    take: Option<i64>,
    list: &ListDescriptor,
) -> Result<(), ExecutionError> {
    let max_results = list.max_results();
    if let Some(take) = take {
        if take.unsigned_abs() > max_results {
            return Err(ExecutionError::LimitExceeded(LimitExceeded {
                list: list.list_key().to_string(),
                kind: LimitKind::MaxResults,
                limit: max_results,
            }));
        }
    }
    Ok(())
}

/// Enforces the per-list and per-request caps against rows actually
/// returned. A batch passing the per-list cap counts against the request
/// budget even when the budget check then rejects it.
pub fn apply_max_results(
    returned: u64,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
) -> Result<(), ExecutionError> {
    let max_results = list.max_results();
    if returned > max_results {
        return Err(ExecutionError::LimitExceeded(LimitExceeded {
            list: list.list_key().to_string(),
            kind: LimitKind::MaxResults,
            limit: max_results,
        }));
    }

    let total = ctx.add_returned(returned);
    if total > ctx.max_total_results() {
        return Err(ExecutionError::LimitExceeded(LimitExceeded {
            list: list.list_key().to_string(),
            kind: LimitKind::MaxTotalResults,
            limit: ctx.max_total_results(),
        }));
    }

    Ok(())
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Read operations: single-item lookup, filtered list retrieval, and
//! filtered counting. Access denial on a read never surfaces as an error;
//! each operation answers with its neutral value (`None`, an empty list,
//! zero) so callers cannot distinguish "denied" from "nothing there".

use common::value::Val;
use core_model::access::{AccessFilters, OperationKind};
use core_model::cache::CacheHintParams;
use core_model::list::ListDescriptor;
use lattice_store::{Item, StoreFilter};
use tracing::instrument;

use crate::auth_util::{access_controlled_filter, get_access_filters};
use crate::execution_error::ExecutionError;
use crate::limits::{apply_early_max_results, apply_max_results};
use crate::order_by_mapper::resolve_order_by;
use crate::predicate_mapper::resolve_where_input;
use crate::request_context::RequestContext;
use crate::resolve_info::ResolveInfo;
use crate::unique_where_mapper::resolve_unique_where_input;

/// Fetches the single item selected by a unique-where input, or `None` when
/// no such item exists or access rules hide it. Denial is checked before
/// the selector is even looked at, so a denied session learns nothing from
/// its shape.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn find_one(
    unique_where: &Val,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
    _info: ResolveInfo<'_>,
) -> Result<Option<Item>, ExecutionError> {
    let access = get_access_filters(list, OperationKind::Query, ctx).await?;
    if access == AccessFilters::DenyAll {
        return Ok(None);
    }

    let unique_filter = resolve_unique_where_input(unique_where, list, ctx).await?;
    let Some(filter) =
        access_controlled_filter(unique_filter.to_filter(), &access, list, ctx).await?
    else {
        return Ok(None);
    };

    Ok(ctx.model(list.list_key())?.find_first(&filter).await?)
}

/// Fetches items matching a filter, ordered and paged.
///
/// Ordering directives are resolved before access is consulted, so a
/// malformed `orderBy` fails even for a session that would have been
/// denied. The per-list `maxResults` cap is checked twice: against `take`
/// before the store runs, and against the rows actually returned after.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn find_many(
    where_: &Val,
    order_by: &[Val],
    take: Option<i64>,
    skip: u64,
    extra_filter: Option<&StoreFilter>,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
    info: ResolveInfo<'_>,
) -> Result<Vec<Item>, ExecutionError> {
    let order = resolve_order_by(order_by, list, ctx).await?;

    let access = get_access_filters(list, OperationKind::Query, ctx).await?;
    if access == AccessFilters::DenyAll {
        return Ok(Vec::new());
    }

    apply_early_max_results(take, list)?;

    let resolved_where = resolve_where_input(where_, list, ctx).await?;
    let Some(filter) = access_controlled_filter(resolved_where, &access, list, ctx).await? else {
        return Ok(Vec::new());
    };
    let filter = and_extra(filter, extra_filter);

    let items = ctx
        .model(list.list_key())?
        .find_many(&filter, &order, take, skip)
        .await?;
    apply_max_results(items.len() as u64, list, ctx)?;

    apply_cache_hint(list, info, items.len() as u64, false);
    Ok(items)
}

/// Counts items matching a filter. Counts do not consume the request's
/// result budget; only materialized rows do.
#[instrument(skip_all, fields(list = list.list_key()))]
pub async fn count(
    where_: &Val,
    extra_filter: Option<&StoreFilter>,
    list: &ListDescriptor,
    ctx: &RequestContext<'_>,
    info: ResolveInfo<'_>,
) -> Result<u64, ExecutionError> {
    let access = get_access_filters(list, OperationKind::Query, ctx).await?;
    if access == AccessFilters::DenyAll {
        return Ok(0);
    }

    let resolved_where = resolve_where_input(where_, list, ctx).await?;
    let Some(filter) = access_controlled_filter(resolved_where, &access, list, ctx).await? else {
        return Ok(0);
    };
    let filter = and_extra(filter, extra_filter);

    let count = ctx.model(list.list_key())?.count(&filter).await?;

    apply_cache_hint(list, info, count, true);
    Ok(count)
}

/// Caller-supplied narrowing used by relationship-traversal call sites.
/// Not reachable from end-user input.
fn and_extra(filter: StoreFilter, extra_filter: Option<&StoreFilter>) -> StoreFilter {
    match extra_filter {
        Some(extra) => StoreFilter::And(vec![filter, extra.clone()]),
        None => filter,
    }
}

fn apply_cache_hint(list: &ListDescriptor, info: ResolveInfo<'_>, results: u64, meta: bool) {
    if let (Some(hint_fn), Some(cache_control)) = (list.cache_hint(), info.cache_control) {
        let hint = hint_fn(CacheHintParams {
            results,
            operation_name: info.operation_name,
            meta,
        });
        cache_control.set_cache_hint(hint);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use common::session::Session;
    use core_model::cache::{CacheHint, CacheScope};
    use serde_json::json;

    use super::*;
    use crate::execution_error::LimitKind;
    use crate::test_util::{
        CollectingCacheControl, DenyOperations, RowFilterAccess, system, system_with_user_list,
        val,
    };

    fn ids(items: &[Item]) -> Vec<i64> {
        items
            .iter()
            .map(|item| match item.get("id") {
                Some(Val::Number(n)) => n.as_i64().unwrap(),
                _ => panic!("missing id"),
            })
            .collect()
    }

    #[test_log::test(tokio::test)]
    async fn find_one_by_unique_key() {
        let system = system();
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        let by_email = val(json!({"email": "bob@example.com"}));
        let item = find_one(&by_email, users, &ctx, ResolveInfo::anonymous())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.get("name"), Some(&Val::from("bob")));

        let missing = find_one(&val(json!({"id": 99})), users, &ctx, ResolveInfo::anonymous())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn reads_are_silently_empty_when_denied() {
        let system = system_with_user_list(|list| {
            list.with_access(Arc::new(DenyOperations(vec![OperationKind::Query])))
        });
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();
        let info = ResolveInfo::anonymous();

        assert!(find_one(&val(json!({"id": 1})), users, &ctx, info)
            .await
            .unwrap()
            .is_none());
        assert!(find_many(&Val::Null, &[], None, 0, None, users, &ctx, info)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(count(&Val::Null, None, users, &ctx, info).await.unwrap(), 0);

        // Inputs that would fail validation for an allowed session must not
        // leak an error shape to a denied one; the gate runs first.
        let bad_where = val(json!({"no_such_field": {"equals": 1}}));
        assert!(find_many(&bad_where, &[], None, 0, None, users, &ctx, info)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(count(&bad_where, None, users, &ctx, info).await.unwrap(), 0);

        let two_keys = val(json!({"id": 1, "email": "alice@example.com"}));
        assert!(find_one(&two_keys, users, &ctx, info)
            .await
            .unwrap()
            .is_none());
    }

    #[test_log::test(tokio::test)]
    async fn denied_reads_skip_the_take_cap() {
        let system = system_with_user_list(|list| {
            list.with_max_results(10)
                .with_access(Arc::new(DenyOperations(vec![OperationKind::Query])))
        });
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        // A take beyond the cap is rejected for an allowed session; a denied
        // one gets the same empty result as any other denied read.
        let items = find_many(
            &Val::Null,
            &[],
            Some(11),
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await
        .unwrap();
        assert!(items.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn find_many_filters_orders_and_pages() {
        let system = system();
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();
        let info = ResolveInfo::anonymous();

        let items = find_many(
            &val(json!({"age": {"gte": 28}})),
            &[val(json!({"age": "asc"})), val(json!({"name": "desc"}))],
            None,
            0,
            None,
            users,
            &ctx,
            info,
        )
        .await
        .unwrap();
        assert_eq!(ids(&items), vec![3, 1, 4]);

        let by_id = [val(json!({"id": "asc"}))];
        let items = find_many(&Val::Null, &by_id, Some(2), 1, None, users, &ctx, info)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![2, 3]);

        // Negative take keeps the tail.
        let items = find_many(&Val::Null, &by_id, Some(-2), 0, None, users, &ctx, info)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![3, 4]);
    }

    #[test_log::test(tokio::test)]
    async fn ordering_by_a_composite_field() {
        let system = system();
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        let items = find_many(
            &Val::Null,
            &[val(json!({"avatar": "desc"}))],
            None,
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await
        .unwrap();
        assert_eq!(ids(&items), vec![4, 3, 2, 1]);
    }

    #[test_log::test(tokio::test)]
    async fn malformed_order_by_fails_even_for_a_denied_session() {
        let system = system_with_user_list(|list| {
            list.with_access(Arc::new(DenyOperations(vec![OperationKind::Query])))
        });
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        let result = find_many(
            &Val::Null,
            &[val(json!({"age": null}))],
            None,
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await;
        assert!(matches!(result, Err(ExecutionError::Validation(_, _))));
    }

    #[test_log::test(tokio::test)]
    async fn access_filter_narrows_results() {
        let system = system();
        let posts_access = RowFilterAccess(val(json!({"published": {"equals": true}})));
        let schema = core_model::schema::Schema::new([
            system
                .schema
                .list("Post")
                .unwrap()
                .clone()
                .with_access(Arc::new(posts_access)),
            system.schema.list("User").unwrap().clone(),
        ]);
        let ctx = RequestContext::with_max_total_results(
            Session::anonymous(),
            &schema,
            &system.stores,
            u64::MAX,
        );
        let posts = schema.list("Post").unwrap();
        let info = ResolveInfo::anonymous();

        let items = find_many(&Val::Null, &[], None, 0, None, posts, &ctx, info)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![1, 3, 4]);

        // The hidden draft is unreachable through the unique path too.
        assert!(find_one(&val(json!({"id": 2})), posts, &ctx, info)
            .await
            .unwrap()
            .is_none());
        assert_eq!(count(&Val::Null, None, posts, &ctx, info).await.unwrap(), 3);
    }

    #[test_log::test(tokio::test)]
    async fn take_beyond_the_list_cap_fails_before_the_store() {
        let system = system_with_user_list(|list| list.with_max_results(10));
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        let result = find_many(
            &Val::Null,
            &[],
            Some(11),
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await;
        assert!(matches!(
            result,
            Err(ExecutionError::LimitExceeded(limit)) if limit.kind == LimitKind::MaxResults
        ));
        assert_eq!(ctx.total_results(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn unbounded_query_beyond_the_list_cap_fails_after_the_store() {
        let system = system_with_user_list(|list| list.with_max_results(3));
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        // Four seeded users, no take: the store returns them all and the
        // post-check rejects the batch.
        let result = find_many(
            &Val::Null,
            &[],
            None,
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await;
        assert!(matches!(
            result,
            Err(ExecutionError::LimitExceeded(limit)) if limit.kind == LimitKind::MaxResults
        ));
    }

    #[test_log::test(tokio::test)]
    async fn request_budget_accumulates_across_queries() {
        let system = system();
        let ctx = system.ctx_with(Session::anonymous(), 6);
        let users = system.schema.list("User").unwrap();
        let info = ResolveInfo::anonymous();

        // 4 users fit the budget of 6.
        find_many(&Val::Null, &[], None, 0, None, users, &ctx, info)
            .await
            .unwrap();
        assert_eq!(ctx.total_results(), 4);

        // The next 4 push the running total past the budget.
        let result = find_many(&Val::Null, &[], None, 0, None, users, &ctx, info).await;
        assert!(matches!(
            result,
            Err(ExecutionError::LimitExceeded(limit)) if limit.kind == LimitKind::MaxTotalResults
        ));
        assert_eq!(ctx.total_results(), 8);

        // Counts are free.
        assert_eq!(count(&Val::Null, None, users, &ctx, info).await.unwrap(), 4);
        assert_eq!(ctx.total_results(), 8);
    }

    #[test_log::test(tokio::test)]
    async fn cache_hints_report_result_shape() {
        let system = system_with_user_list(|list| {
            list.with_cache_hint(Arc::new(|params: CacheHintParams| CacheHint {
                max_age: Duration::from_secs(if params.meta { 10 } else { params.results }),
                scope: CacheScope::Public,
            }))
        });
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();
        let sink = CollectingCacheControl::default();
        let info = ResolveInfo {
            operation_name: Some("users"),
            cache_control: Some(&sink),
        };

        find_many(&Val::Null, &[], None, 0, None, users, &ctx, info)
            .await
            .unwrap();
        count(&Val::Null, None, users, &ctx, info).await.unwrap();

        let hints = sink.hints();
        assert_eq!(hints.len(), 2);
        assert_eq!(hints[0].max_age, Duration::from_secs(4));
        assert_eq!(hints[1].max_age, Duration::from_secs(10));
    }

    #[test_log::test(tokio::test)]
    async fn extra_filter_narrows_below_the_input_language() {
        let system = system();
        let ctx = system.ctx();
        let posts = system.schema.list("Post").unwrap();
        let info = ResolveInfo::anonymous();

        let extra = StoreFilter::equals("author_id", 1);
        let items = find_many(&Val::Null, &[], None, 0, Some(&extra), posts, &ctx, info)
            .await
            .unwrap();
        assert_eq!(ids(&items), vec![1, 2]);
        assert_eq!(count(&Val::Null, Some(&extra), posts, &ctx, info).await.unwrap(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn relationship_filter_end_to_end() {
        let system = system();
        let ctx = system.ctx();
        let users = system.schema.list("User").unwrap();

        // Users with at least one published post: alice, bob, carol.
        let items = find_many(
            &val(json!({"posts": {"some": {"published": {"equals": true}}}})),
            &[],
            None,
            0,
            None,
            users,
            &ctx,
            ResolveInfo::anonymous(),
        )
        .await
        .unwrap();
        assert_eq!(ids(&items), vec![1, 2, 3]);

        // Sub-lookups never consume the request budget.
        assert_eq!(ctx.total_results(), 3);
    }
}

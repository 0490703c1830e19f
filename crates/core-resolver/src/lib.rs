// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The resolution core: turns raw operation arguments into store-native
//! queries, enforcing access control and result-shape limits along the way.
//!
//! The transport layer hands parsed, type-checked arguments to
//! [`query_resolver`] (and [`mutation_resolver`]) together with a
//! [`RequestContext`]; everything below that call is this crate.

pub use execution_error::{ExecutionError, LimitExceeded, LimitKind, WithContext};
pub use request_context::RequestContext;
pub use resolve_info::ResolveInfo;

mod auth_util;
mod cast;
mod execution_error;
mod limits;
mod order_by_mapper;
mod predicate_mapper;
mod request_context;
mod resolve_info;
mod unique_where_mapper;

pub mod mutation_resolver;
pub mod query_resolver;

pub use auth_util::{access_controlled_filter, check_operation_access, get_access_filters};
pub use cast::{CastError, cast_value};
pub use order_by_mapper::resolve_order_by;
pub use predicate_mapper::resolve_where_input;
pub use unique_where_mapper::{UniqueFilter, map_unique_where_to_where, resolve_unique_where_input};

#[cfg(test)]
mod test_util;

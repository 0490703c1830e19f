// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use common::session::Session;
use common::value::Val;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

/// Row-level narrowing returned by [`AccessControl::row_filters`].
///
/// `Filter` carries a filter expression in the same input language as a
/// caller-supplied where argument; the resolvers AND it into the operation
/// filter before it reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessFilters {
    DenyAll,
    AllowAll,
    Filter(Val),
}

#[derive(Error, Debug)]
#[error("Access rule failed: {0}")]
pub struct AccessError(pub String);

/// Per-list authorization hooks.
///
/// `operation_allowed` is the coarse check: a `false` answer makes read
/// operations return an empty/neutral result without touching storage.
/// `row_filters` is the fine-grained check, letting partial access compose
/// with user-supplied filters. Both default to full access.
#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn operation_allowed(
        &self,
        _operation: OperationKind,
        _session: &Session,
    ) -> Result<bool, AccessError> {
        Ok(true)
    }

    async fn row_filters(
        &self,
        _operation: OperationKind,
        _session: &Session,
    ) -> Result<AccessFilters, AccessError> {
        Ok(AccessFilters::AllowAll)
    }
}

/// Everyone may do everything. The default for lists without access rules.
pub struct PublicAccess;

#[async_trait]
impl AccessControl for PublicAccess {}

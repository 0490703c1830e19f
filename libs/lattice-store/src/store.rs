// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Item, OrderClause, StoreFilter};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Generic(String),

    #[error("Unknown list '{0}'")]
    UnknownList(String),

    #[error("Cannot compare column '{0}' with the supplied value")]
    Incomparable(String),
}

/// The per-list "model" handle the resolution core calls into.
///
/// `find_many` honors Prisma-style paging: `skip` drops leading rows, a
/// non-negative `take` keeps the first `take` rows, a negative `take` keeps
/// the last `|take|` rows, and `None` is unbounded.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn find_first(&self, filter: &StoreFilter) -> Result<Option<Item>, StoreError>;

    async fn find_many(
        &self,
        filter: &StoreFilter,
        order_by: &[OrderClause],
        take: Option<i64>,
        skip: u64,
    ) -> Result<Vec<Item>, StoreError>;

    async fn count(&self, filter: &StoreFilter) -> Result<u64, StoreError>;

    async fn create(&self, item: Item) -> Result<Item, StoreError>;

    /// Updates the first row matching `filter`, returning the updated row,
    /// or `None` when nothing matched.
    async fn update(&self, filter: &StoreFilter, values: Item) -> Result<Option<Item>, StoreError>;

    /// Deletes the first row matching `filter`, returning the deleted row,
    /// or `None` when nothing matched.
    async fn delete(&self, filter: &StoreFilter) -> Result<Option<Item>, StoreError>;
}

/// Resolves a list key to its backing model handle.
pub trait StoreRegistry: Send + Sync {
    fn model(&self, list_key: &str) -> Option<&dyn ModelStore>;
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::atomic::{AtomicU64, Ordering};

use common::env::{EnvError, Environment, LATTICE_MAX_TOTAL_RESULTS};
use common::session::Session;
use core_model::schema::Schema;
use lattice_store::{ModelStore, StoreError, StoreRegistry};

use crate::execution_error::ExecutionError;

pub const DEFAULT_MAX_TOTAL_RESULTS: u64 = 100_000;

/// State scoped to one logical operation: the calling actor's session,
/// handles to the schema and backing stores, and the cumulative
/// result-count ceiling shared by every query the operation runs
/// (including nested relationship traversal).
///
/// A context must not be shared across concurrently executing operations:
/// the counter is only coherent for a sequential await chain.
pub struct RequestContext<'a> {
    session: Session,
    schema: &'a Schema,
    stores: &'a dyn StoreRegistry,
    max_total_results: u64,
    total_results: AtomicU64,
}

impl<'a> RequestContext<'a> {
    pub fn new(
        session: Session,
        schema: &'a Schema,
        stores: &'a dyn StoreRegistry,
        env: &dyn Environment,
    ) -> Result<Self, EnvError> {
        let max_total_results =
            env.get_u64(LATTICE_MAX_TOTAL_RESULTS, DEFAULT_MAX_TOTAL_RESULTS)?;
        Ok(Self::with_max_total_results(
            session,
            schema,
            stores,
            max_total_results,
        ))
    }

    pub fn with_max_total_results(
        session: Session,
        schema: &'a Schema,
        stores: &'a dyn StoreRegistry,
        max_total_results: u64,
    ) -> Self {
        Self {
            session,
            schema,
            stores,
            max_total_results,
            total_results: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn model(&self, list_key: &str) -> Result<&'a dyn ModelStore, ExecutionError> {
        self.stores
            .model(list_key)
            .ok_or_else(|| StoreError::UnknownList(list_key.to_string()).into())
    }

    pub fn max_total_results(&self) -> u64 {
        self.max_total_results
    }

    pub fn total_results(&self) -> u64 {
        self.total_results.load(Ordering::Relaxed)
    }

    /// Adds rows returned by a store call, returning the new running total.
    /// Called only after the store call has fully resolved.
    pub(crate) fn add_returned(&self, returned: u64) -> u64 {
        self.total_results.fetch_add(returned, Ordering::Relaxed) + returned
    }
}

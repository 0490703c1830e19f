// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheHint {
    pub max_age: Duration,
    pub scope: CacheScope,
}

/// Result metadata handed to a list's cache-hint function. `results` is the
/// number of rows returned, or the count value itself when `meta` is set
/// (count queries report metadata, not row payloads).
pub struct CacheHintParams<'a> {
    pub results: u64,
    pub operation_name: Option<&'a str>,
    pub meta: bool,
}

pub type CacheHintFn = Arc<dyn Fn(CacheHintParams) -> CacheHint + Send + Sync>;

/// Sink for cache hints, supplied by the transport layer alongside the
/// operation name.
pub trait CacheControl: Send + Sync {
    fn set_cache_hint(&self, hint: CacheHint);
}

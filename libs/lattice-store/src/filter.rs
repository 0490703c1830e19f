// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use common::value::Val;

/// A store-native filter predicate, produced by the resolution core and
/// consumed by [`crate::ModelStore`] implementations.
///
/// `And`/`Or`/`Not` hold ordered sequences. `Not` negates each member and
/// conjoins the negations, matching the combinator semantics the original
/// filter language exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreFilter {
    /// Matches every row.
    True,
    /// Matches no row.
    False,
    /// A condition on a single column.
    Cond(String, FieldCond),
    And(Vec<StoreFilter>),
    Or(Vec<StoreFilter>),
    Not(Vec<StoreFilter>),
}

impl StoreFilter {
    pub fn equals(column: impl Into<String>, value: impl Into<Val>) -> StoreFilter {
        StoreFilter::Cond(column.into(), FieldCond::Equals(value.into()))
    }
}

impl From<bool> for StoreFilter {
    fn from(b: bool) -> StoreFilter {
        if b { StoreFilter::True } else { StoreFilter::False }
    }
}

/// A per-column comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCond {
    Equals(Val),
    In(Vec<Val>),
    NotIn(Vec<Val>),
    Lt(Val),
    Lte(Val),
    Gt(Val),
    Gte(Val),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Not(Box<FieldCond>),
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One sort key. Stores apply multi-key sorts in sequence order, so the
/// position of a clause within a query's order list is its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub direction: Direction,
}

impl OrderClause {
    pub fn new(column: impl Into<String>, direction: Direction) -> OrderClause {
        OrderClause {
            column: column.into(),
            direction,
        }
    }
}

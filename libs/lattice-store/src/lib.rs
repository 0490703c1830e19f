// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Store-native representation of queries against a backing store, along
//! with the narrow contract ([`ModelStore`]) the resolution core consumes.
//! An in-memory implementation is provided for tests and demos.

mod filter;
mod memory;
mod order;
mod store;

pub use filter::{FieldCond, StoreFilter};
pub use memory::{MemoryStore, MemoryStoreRegistry};
pub use order::{Direction, OrderClause};
pub use store::{ModelStore, StoreError, StoreRegistry};

use common::value::Val;
use indexmap::IndexMap;

/// One stored row: column key to value, in column declaration order.
pub type Item = IndexMap<String, Val>;

/// Every list's identity column.
pub const ID_COLUMN: &str = "id";

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use crate::list::ListDescriptor;

/// All initialised lists of one system, keyed by list key. Built once from
/// static configuration; relationship fields refer to other lists by key
/// through this map.
pub struct Schema {
    lists: IndexMap<String, ListDescriptor>,
}

impl Schema {
    pub fn new(lists: impl IntoIterator<Item = ListDescriptor>) -> Self {
        Self {
            lists: lists
                .into_iter()
                .map(|list| (list.list_key().to_string(), list))
                .collect(),
        }
    }

    pub fn list(&self, list_key: &str) -> Option<&ListDescriptor> {
        self.lists.get(list_key)
    }

    pub fn lists(&self) -> impl Iterator<Item = &ListDescriptor> {
        self.lists.values()
    }
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::access::{AccessControl, PublicAccess};
use crate::cache::CacheHintFn;
use crate::field::FieldDescriptor;

/// Names generated from a list key, used for operation dispatch and for
/// error messages that reference input types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNames {
    pub item_query: String,
    pub list_query: String,
    pub count_query: String,
    pub create_one: String,
    pub update_one: String,
    pub delete_one: String,
    pub where_input: String,
    pub where_unique_input: String,
    pub order_by_input: String,
}

impl OperationNames {
    pub fn generate(list_key: &str) -> Self {
        let singular = lower_first(list_key);
        let plural = lower_first(&pluralizer::pluralize(list_key, 2, false));
        Self {
            item_query: singular,
            count_query: format!("{plural}Count"),
            list_query: plural,
            create_one: format!("create{list_key}"),
            update_one: format!("update{list_key}"),
            delete_one: format!("delete{list_key}"),
            where_input: format!("{list_key}WhereInput"),
            where_unique_input: format!("{list_key}WhereUniqueInput"),
            order_by_input: format!("{list_key}OrderByInput"),
        }
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A fully resolved entity type: its fields (insertion order = declaration
/// order), result ceiling, access hooks, cache-hint function, and generated
/// operation naming.
#[derive(Clone)]
pub struct ListDescriptor {
    list_key: String,
    fields: IndexMap<String, FieldDescriptor>,
    max_results: u64,
    cache_hint: Option<CacheHintFn>,
    access: Arc<dyn AccessControl>,
    names: OperationNames,
}

impl ListDescriptor {
    pub fn new(
        list_key: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, FieldDescriptor)>,
    ) -> Self {
        let list_key = list_key.into();
        let names = OperationNames::generate(&list_key);
        Self {
            list_key,
            fields: fields
                .into_iter()
                .map(|(key, field)| (key.to_string(), field))
                .collect(),
            max_results: u64::MAX,
            cache_hint: None,
            access: Arc::new(PublicAccess),
            names,
        }
    }

    pub fn with_max_results(mut self, max_results: u64) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_access(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    pub fn with_cache_hint(mut self, cache_hint: CacheHintFn) -> Self {
        self.cache_hint = Some(cache_hint);
        self
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDescriptor> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    pub fn max_results(&self) -> u64 {
        self.max_results
    }

    pub fn cache_hint(&self) -> Option<&CacheHintFn> {
        self.cache_hint.as_ref()
    }

    pub fn access(&self) -> &dyn AccessControl {
        self.access.as_ref()
    }

    pub fn names(&self) -> &OperationNames {
        &self.names
    }
}

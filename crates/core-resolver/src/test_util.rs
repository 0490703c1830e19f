// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Shared fixtures: a two-list schema (users with posts) over memory
//! stores, plus small access and cache-control doubles.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::session::Session;
use common::value::Val;
use core_model::access::{AccessControl, AccessError, AccessFilters, OperationKind};
use core_model::cache::{CacheControl, CacheHint};
use core_model::field::{
    FieldDescriptor, FieldInputError, OrderInputResolver, RelationCardinality, ScalarKind,
};
use core_model::list::ListDescriptor;
use core_model::schema::Schema;
use indexmap::IndexMap;
use lattice_store::{ID_COLUMN, Item, MemoryStore, MemoryStoreRegistry};

use crate::request_context::RequestContext;

pub fn val(json: serde_json::Value) -> Val {
    Val::try_from(json).unwrap()
}

pub struct TestSystem {
    pub schema: Schema,
    pub stores: MemoryStoreRegistry,
}

impl TestSystem {
    pub fn ctx(&self) -> RequestContext<'_> {
        self.ctx_with(Session::anonymous(), u64::MAX)
    }

    pub fn ctx_with(&self, session: Session, max_total_results: u64) -> RequestContext<'_> {
        RequestContext::with_max_total_results(session, &self.schema, &self.stores, max_total_results)
    }
}

/// Orders a file-like composite field by its size sub-column.
struct SizeOrder;

#[async_trait]
impl OrderInputResolver for SizeOrder {
    async fn resolve(&self, raw: Val, _session: &Session) -> Result<Val, FieldInputError> {
        Ok(Val::Object(IndexMap::from_iter([(
            "filesize".to_string(),
            raw,
        )])))
    }
}

pub fn user_fields() -> Vec<(&'static str, FieldDescriptor)> {
    vec![
        ("id", FieldDescriptor::scalar(ScalarKind::Int).unique()),
        (
            "email",
            FieldDescriptor::scalar(ScalarKind::String).unique(),
        ),
        ("name", FieldDescriptor::scalar(ScalarKind::String)),
        ("age", FieldDescriptor::scalar(ScalarKind::Int)),
        (
            "rating",
            FieldDescriptor::scalar(ScalarKind::Float).unique(),
        ),
        (
            "notes",
            FieldDescriptor::scalar(ScalarKind::String)
                .not_filterable()
                .not_orderable(),
        ),
        (
            "avatar",
            FieldDescriptor::multi([
                ("filename", ScalarKind::String),
                ("filesize", ScalarKind::Int),
            ])
            .with_order_input(Arc::new(SizeOrder)),
        ),
        (
            "posts",
            FieldDescriptor::relationship("Post", RelationCardinality::Many, "author_id"),
        ),
        ("fullName", FieldDescriptor::computed()),
    ]
}

fn post_fields() -> Vec<(&'static str, FieldDescriptor)> {
    vec![
        ("id", FieldDescriptor::scalar(ScalarKind::Int).unique()),
        ("title", FieldDescriptor::scalar(ScalarKind::String)),
        ("published", FieldDescriptor::scalar(ScalarKind::Boolean)),
        ("author_id", FieldDescriptor::scalar(ScalarKind::Int)),
        (
            "author",
            FieldDescriptor::relationship("User", RelationCardinality::One, "author_id"),
        ),
    ]
}

pub fn user_row(id: i64, email: &str, name: &str, age: i64) -> Item {
    Item::from_iter([
        (ID_COLUMN.to_string(), Val::from(id)),
        ("email".to_string(), Val::from(email)),
        ("name".to_string(), Val::from(name)),
        ("age".to_string(), Val::from(age)),
        ("avatar_filename".to_string(), Val::from(format!("{name}.png"))),
        ("avatar_filesize".to_string(), Val::from(id * 100)),
    ])
}

pub fn post_row(id: i64, title: &str, published: bool, author_id: i64) -> Item {
    Item::from_iter([
        (ID_COLUMN.to_string(), Val::from(id)),
        ("title".to_string(), Val::from(title)),
        ("published".to_string(), Val::from(published)),
        ("author_id".to_string(), Val::from(author_id)),
    ])
}

fn seeded_stores() -> MemoryStoreRegistry {
    let mut stores = MemoryStoreRegistry::new();
    stores.insert(
        "User",
        MemoryStore::seeded([
            user_row(1, "alice@example.com", "alice", 30),
            user_row(2, "bob@example.com", "bob", 25),
            user_row(3, "carol@example.com", "carol", 30),
            user_row(4, "dave@example.com", "dave", 41),
        ]),
    );
    stores.insert(
        "Post",
        MemoryStore::seeded([
            post_row(1, "intro", true, 1),
            post_row(2, "draft thoughts", false, 1),
            post_row(3, "release notes", true, 2),
            post_row(4, "roadmap", true, 3),
        ]),
    );
    stores
}

pub fn system() -> TestSystem {
    TestSystem {
        schema: Schema::new([
            ListDescriptor::new("User", user_fields()),
            ListDescriptor::new("Post", post_fields()),
        ]),
        stores: seeded_stores(),
    }
}

/// Like [`system`], but with the user list re-declared through `customize`.
pub fn system_with_user_list(
    customize: impl FnOnce(ListDescriptor) -> ListDescriptor,
) -> TestSystem {
    TestSystem {
        schema: Schema::new([
            customize(ListDescriptor::new("User", user_fields())),
            ListDescriptor::new("Post", post_fields()),
        ]),
        stores: seeded_stores(),
    }
}

/// Denies the listed operations outright; everything else passes.
pub struct DenyOperations(pub Vec<OperationKind>);

#[async_trait]
impl AccessControl for DenyOperations {
    async fn operation_allowed(
        &self,
        operation: OperationKind,
        _session: &Session,
    ) -> Result<bool, AccessError> {
        Ok(!self.0.contains(&operation))
    }
}

/// Narrows every operation's rows with a fixed filter expression.
pub struct RowFilterAccess(pub Val);

#[async_trait]
impl AccessControl for RowFilterAccess {
    async fn row_filters(
        &self,
        _operation: OperationKind,
        _session: &Session,
    ) -> Result<AccessFilters, AccessError> {
        Ok(AccessFilters::Filter(self.0.clone()))
    }
}

#[derive(Default)]
pub struct CollectingCacheControl {
    hints: Mutex<Vec<CacheHint>>,
}

impl CollectingCacheControl {
    pub fn hints(&self) -> Vec<CacheHint> {
        self.hints.lock().unwrap().clone()
    }
}

impl CacheControl for CollectingCacheControl {
    fn set_cache_hint(&self, hint: CacheHint) {
        self.hints.lock().unwrap().push(hint);
    }
}

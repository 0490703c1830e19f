// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_trait::async_trait;
use common::session::Session;
use common::value::Val;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Boolean,
    DateTime,
    Json,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationCardinality {
    One,
    Many,
}

/// How a field maps onto storage. A closed set: resolution code dispatches
/// by pattern match, so every storage kind is handled exhaustively.
#[derive(Clone)]
pub enum DbField {
    /// One column, named after the field key.
    Scalar { scalar: ScalarKind },
    /// A composite field stored as one column per sub-key, named
    /// `<fieldKey>_<subKey>` (e.g. a file field decomposing into
    /// `filename`/`filesize`/`mode`).
    Multi { columns: IndexMap<String, ScalarKind> },
    /// `One`: `foreign_key` is the column on this list holding the target's
    /// id. `Many`: `foreign_key` is the column on the target list holding
    /// this list's id.
    Relationship {
        list: String,
        cardinality: RelationCardinality,
        foreign_key: String,
    },
    /// Purely computed; no storage. Cannot be filtered or ordered.
    None,
}

impl DbField {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DbField::Scalar { .. } => "scalar",
            DbField::Multi { .. } => "multi",
            DbField::Relationship { .. } => "relationship",
            DbField::None => "none",
        }
    }
}

/// Storage column for a sub-key of a multi field.
pub fn multi_column_key(field_key: &str, sub_key: &str) -> String {
    format!("{field_key}_{sub_key}")
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct FieldInputError(pub String);

/// Turns raw client input for a field into its storable value, failing with
/// a validation message otherwise. Used by create and update resolution.
#[async_trait]
pub trait FieldInputResolver: Send + Sync {
    async fn resolve(&self, raw: Val, session: &Session) -> Result<Val, FieldInputError>;
}

/// Transforms a raw order direction value before it reaches the store. For
/// multi fields the resolved value must be a single-key mapping selecting
/// the sub-column to sort by.
#[async_trait]
pub trait OrderInputResolver: Send + Sync {
    async fn resolve(&self, raw: Val, session: &Session) -> Result<Val, FieldInputError>;
}

/// Value applied at create time when the client omits the field.
#[derive(Clone)]
pub enum DefaultValue {
    Static(Val),
    Dynamic(Arc<dyn DynamicDefault>),
}

/// A dynamic default may decline to apply by returning `Ok(None)`.
#[async_trait]
pub trait DynamicDefault: Send + Sync {
    async fn resolve(&self, session: &Session) -> Result<Option<Val>, FieldInputError>;
}

/// Declarative definition of one attribute on a list.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub db_field: DbField,
    pub filterable: bool,
    pub orderable: bool,
    /// Whether the field may appear in a unique-where input.
    pub unique: bool,
    pub unique_input: Option<Arc<dyn FieldInputResolver>>,
    pub order_input: Option<Arc<dyn OrderInputResolver>>,
    pub create_input: Option<Arc<dyn FieldInputResolver>>,
    pub update_input: Option<Arc<dyn FieldInputResolver>>,
    pub default_value: Option<DefaultValue>,
}

impl FieldDescriptor {
    pub fn scalar(scalar: ScalarKind) -> Self {
        Self {
            db_field: DbField::Scalar { scalar },
            filterable: true,
            orderable: true,
            unique: false,
            unique_input: None,
            order_input: None,
            create_input: None,
            update_input: None,
            default_value: None,
        }
    }

    pub fn multi(columns: impl IntoIterator<Item = (&'static str, ScalarKind)>) -> Self {
        Self {
            db_field: DbField::Multi {
                columns: columns
                    .into_iter()
                    .map(|(key, scalar)| (key.to_string(), scalar))
                    .collect(),
            },
            filterable: false,
            orderable: false,
            unique: false,
            unique_input: None,
            order_input: None,
            create_input: None,
            update_input: None,
            default_value: None,
        }
    }

    pub fn relationship(
        list: impl Into<String>,
        cardinality: RelationCardinality,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            db_field: DbField::Relationship {
                list: list.into(),
                cardinality,
                foreign_key: foreign_key.into(),
            },
            filterable: true,
            orderable: false,
            unique: false,
            unique_input: None,
            order_input: None,
            create_input: None,
            update_input: None,
            default_value: None,
        }
    }

    pub fn computed() -> Self {
        Self {
            db_field: DbField::None,
            filterable: false,
            orderable: false,
            unique: false,
            unique_input: None,
            order_input: None,
            create_input: None,
            update_input: None,
            default_value: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn not_orderable(mut self) -> Self {
        self.orderable = false;
        self
    }

    pub fn with_order_input(mut self, resolver: Arc<dyn OrderInputResolver>) -> Self {
        self.order_input = Some(resolver);
        self.orderable = true;
        self
    }

    pub fn with_unique_input(mut self, resolver: Arc<dyn FieldInputResolver>) -> Self {
        self.unique_input = Some(resolver);
        self
    }

    pub fn with_create_input(mut self, resolver: Arc<dyn FieldInputResolver>) -> Self {
        self.create_input = Some(resolver);
        self
    }

    pub fn with_update_input(mut self, resolver: Arc<dyn FieldInputResolver>) -> Self {
        self.update_input = Some(resolver);
        self
    }

    pub fn with_default(mut self, default_value: DefaultValue) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

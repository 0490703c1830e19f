// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declarative schema layer: field and list descriptors, generated
//! operation naming, access-control hook traits, and cache-hint types.
//! Descriptors are built once at schema initialisation and are immutable
//! for the process lifetime.

pub mod access;
pub mod cache;
pub mod field;
pub mod list;
pub mod schema;

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::value::Val;

/// Actor data extracted by the transport layer before an operation reaches
/// the resolution core (typically the decoded session token). Access-control
/// hooks and field input resolvers consult it; the core itself never
/// interprets its contents.
#[derive(Clone, Debug, Default)]
pub struct Session {
    data: Option<Val>,
}

impl Session {
    pub fn new(data: Val) -> Self {
        Self { data: Some(data) }
    }

    /// A session for an unauthenticated caller.
    pub fn anonymous() -> Self {
        Self { data: None }
    }

    pub fn authenticated(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Val> {
        self.data.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&Val> {
        self.data.as_ref().and_then(|data| data.get(key))
    }
}

// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::cache::CacheControl;

/// What the transport layer knows about the operation being resolved:
/// its name, and where cache hints should go. Both are optional; internal
/// call sites (relationship traversal) resolve anonymously.
#[derive(Clone, Copy, Default)]
pub struct ResolveInfo<'a> {
    pub operation_name: Option<&'a str>,
    pub cache_control: Option<&'a dyn CacheControl>,
}

impl ResolveInfo<'_> {
    pub fn anonymous() -> ResolveInfo<'static> {
        ResolveInfo {
            operation_name: None,
            cache_control: None,
        }
    }
}

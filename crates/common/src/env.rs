// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

/// Context-wide ceiling on the cumulative number of rows a single logical
/// operation may return across all of its queries.
pub const LATTICE_MAX_TOTAL_RESULTS: &str = "LATTICE_MAX_TOTAL_RESULTS";

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }

    fn get_u64(&self, key: &str, default_value: u64) -> Result<u64, EnvError> {
        match self.get(key) {
            Some(value) => value.parse().map_err(|_| EnvError::InvalidNumber {
                key: key.to_string(),
                value,
            }),
            None => Ok(default_value),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("Invalid value for {key}: {value}. Expected a non-negative integer")]
    InvalidNumber { key: String, value: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Default)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
}

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: HashMap::from_iter(
                values
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
        }
    }
}

impl MapEnvironment {
    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

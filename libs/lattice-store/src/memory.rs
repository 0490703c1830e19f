// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{
    RwLock,
    atomic::{AtomicI64, Ordering as AtomicOrdering},
};

use async_trait::async_trait;
use common::value::Val;

use crate::{
    Direction, FieldCond, ID_COLUMN, Item, ModelStore, OrderClause, StoreError, StoreFilter,
    StoreRegistry,
};

/// In-memory [`ModelStore`] backing one list. Reference implementation used
/// by tests and demos; evaluates filters structurally over stored rows.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Item>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(vec![]),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn seeded(rows: impl IntoIterator<Item = Item>) -> Self {
        let rows: Vec<Item> = rows.into_iter().collect();
        let max_id = rows
            .iter()
            .filter_map(|row| match row.get(ID_COLUMN) {
                Some(Val::Number(n)) => n.as_i64(),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            rows: RwLock::new(rows),
            next_id: AtomicI64::new(max_id + 1),
        }
    }

    fn position(rows: &[Item], filter: &StoreFilter) -> Result<Option<usize>, StoreError> {
        for (index, row) in rows.iter().enumerate() {
            if matches(row, filter)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

fn matches(row: &Item, filter: &StoreFilter) -> Result<bool, StoreError> {
    match filter {
        StoreFilter::True => Ok(true),
        StoreFilter::False => Ok(false),
        StoreFilter::Cond(column, cond) => {
            let value = row.get(column).unwrap_or(&Val::Null);
            eval_cond(column, value, cond)
        }
        StoreFilter::And(children) => {
            for child in children {
                if !matches(row, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        // An empty `Or` matches nothing.
        StoreFilter::Or(children) => {
            for child in children {
                if matches(row, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        // Each member negated, negations conjoined.
        StoreFilter::Not(children) => {
            for child in children {
                if matches(row, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn eval_cond(column: &str, value: &Val, cond: &FieldCond) -> Result<bool, StoreError> {
    let compare = |operand: &Val| -> Result<Option<Ordering>, StoreError> {
        if value.is_null() {
            return Ok(None);
        }
        match value.compare(operand) {
            Some(ordering) => Ok(Some(ordering)),
            None => Err(StoreError::Incomparable(column.to_string())),
        }
    };

    let as_string = || -> Result<Option<&str>, StoreError> {
        match value {
            Val::String(s) => Ok(Some(s)),
            Val::Null => Ok(None),
            _ => Err(StoreError::Incomparable(column.to_string())),
        }
    };

    match cond {
        FieldCond::Equals(operand) => Ok(value == operand),
        FieldCond::In(operands) => Ok(operands.contains(value)),
        FieldCond::NotIn(operands) => Ok(!operands.contains(value)),
        FieldCond::Lt(operand) => Ok(compare(operand)? == Some(Ordering::Less)),
        FieldCond::Lte(operand) => Ok(matches!(
            compare(operand)?,
            Some(Ordering::Less | Ordering::Equal)
        )),
        FieldCond::Gt(operand) => Ok(compare(operand)? == Some(Ordering::Greater)),
        FieldCond::Gte(operand) => Ok(matches!(
            compare(operand)?,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        FieldCond::Contains(needle) => Ok(as_string()?.is_some_and(|s| s.contains(needle))),
        FieldCond::StartsWith(prefix) => Ok(as_string()?.is_some_and(|s| s.starts_with(prefix))),
        FieldCond::EndsWith(suffix) => Ok(as_string()?.is_some_and(|s| s.ends_with(suffix))),
        FieldCond::Not(inner) => Ok(!eval_cond(column, value, inner)?),
    }
}

fn compare_rows(left: &Item, right: &Item, order_by: &[OrderClause]) -> Ordering {
    for clause in order_by {
        let lhs = left.get(&clause.column).unwrap_or(&Val::Null);
        let rhs = right.get(&clause.column).unwrap_or(&Val::Null);
        let ordering = lhs.compare(rhs).unwrap_or(Ordering::Equal);
        let ordering = match clause.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn page(mut rows: Vec<Item>, take: Option<i64>, skip: u64) -> Vec<Item> {
    let skip = skip.min(rows.len() as u64) as usize;
    rows.drain(..skip);
    match take {
        None => rows,
        Some(n) if n >= 0 => {
            rows.truncate(n as usize);
            rows
        }
        // Negative take keeps the tail of the result set.
        Some(n) => {
            let keep = n.unsigned_abs().min(rows.len() as u64) as usize;
            rows.split_off(rows.len() - keep)
        }
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn find_first(&self, filter: &StoreFilter) -> Result<Option<Item>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(Self::position(&rows, filter)?.map(|index| rows[index].clone()))
    }

    async fn find_many(
        &self,
        filter: &StoreFilter,
        order_by: &[OrderClause],
        take: Option<i64>,
        skip: u64,
    ) -> Result<Vec<Item>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut selected: Vec<Item> = rows
            .iter()
            .map(|row| matches(row, filter).map(|matched| (row, matched)))
            .filter_map(|entry| match entry {
                Ok((row, true)) => Some(Ok(row.clone())),
                Ok((_, false)) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<_, _>>()?;

        if !order_by.is_empty() {
            selected.sort_by(|left, right| compare_rows(left, right, order_by));
        }

        Ok(page(selected, take, skip))
    }

    async fn count(&self, filter: &StoreFilter) -> Result<u64, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut count = 0;
        for row in rows.iter() {
            if matches(row, filter)? {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn create(&self, mut item: Item) -> Result<Item, StoreError> {
        if !matches!(item.get(ID_COLUMN), Some(Val::Number(_))) {
            let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
            item.insert(ID_COLUMN.to_string(), Val::from(id));
        }
        self.rows.write().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update(&self, filter: &StoreFilter, values: Item) -> Result<Option<Item>, StoreError> {
        let mut rows = self.rows.write().unwrap();
        match Self::position(&rows, filter)? {
            Some(index) => {
                let row = &mut rows[index];
                for (column, value) in values {
                    row.insert(column, value);
                }
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, filter: &StoreFilter) -> Result<Option<Item>, StoreError> {
        let mut rows = self.rows.write().unwrap();
        Ok(Self::position(&rows, filter)?.map(|index| rows.remove(index)))
    }
}

/// [`StoreRegistry`] over a fixed set of [`MemoryStore`]s, one per list.
#[derive(Default)]
pub struct MemoryStoreRegistry {
    stores: HashMap<String, MemoryStore>,
}

impl MemoryStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, list_key: impl Into<String>, store: MemoryStore) {
        self.stores.insert(list_key.into(), store);
    }
}

impl StoreRegistry for MemoryStoreRegistry {
    fn model(&self, list_key: &str) -> Option<&dyn ModelStore> {
        self.stores
            .get(list_key)
            .map(|store| store as &dyn ModelStore)
    }
}

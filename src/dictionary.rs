// Copyright 2024 Belt Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered, append-only dictionary mapping category indices to values,
//! with slot 0 reserved for MISSING (§3).

use hashbrown::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Dictionary<T> {
    // `values[0]` is a placeholder never surfaced to callers; real values
    // start at index 1, matching the on-disk index space.
    values: Vec<Option<T>>,
    index_of: HashMap<T, i32>,
}

impl<T: Clone + Eq + Hash> Default for Dictionary<T> {
    fn default() -> Self {
        Dictionary {
            values: vec![None],
            index_of: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Dictionary<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries including the MISSING slot at index 0.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        // Invariant: a dictionary always has at least the MISSING slot.
        false
    }

    /// Resolves `value` to its index, appending it in insertion order on
    /// first sight. O(1) amortised via the value→index map.
    pub fn intern(&mut self, value: T) -> i32 {
        if let Some(&idx) = self.index_of.get(&value) {
            return idx;
        }
        let idx = self.values.len() as i32;
        self.index_of.insert(value.clone(), idx);
        self.values.push(Some(value));
        idx
    }

    /// Looks up the index of `value` without inserting it.
    pub fn index_of(&self, value: &T) -> Option<i32> {
        self.index_of.get(value).copied()
    }

    /// Decodes a category index back to its value; `None` for index 0 or
    /// any out-of-range index (propagated to callers as the object-null
    /// sentinel).
    pub fn get(&self, index: i32) -> Option<&T> {
        if index <= 0 {
            return None;
        }
        self.values.get(index as usize).and_then(|v| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter().skip(1).filter_map(|v| v.as_ref())
    }
}

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

//! `Any[size]` object arena backing Object columns (§3).

use std::any::Any;
use std::sync::Arc;

use crate::column::view::RowMapping;

/// A type-erased object slot. Callers downcast via `ObjectValue::downcast_ref`.
pub type ObjectValue = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ObjectStore {
    pub values: Arc<Vec<Option<ObjectValue>>>,
}

impl ObjectStore {
    pub fn new(values: Vec<Option<ObjectValue>>) -> Self {
        ObjectStore {
            values: Arc::new(values),
        }
    }

    pub fn physical_size(&self) -> usize {
        self.values.len()
    }

    pub fn logical_size(&self, view: Option<&RowMapping>) -> usize {
        view.map(|m| m.len()).unwrap_or(self.values.len())
    }

    #[inline]
    pub fn read(&self, view: Option<&RowMapping>, logical: usize) -> Option<ObjectValue> {
        let physical = match view {
            None => {
                if logical < self.values.len() {
                    Some(logical)
                } else {
                    None
                }
            }
            Some(m) => m.translate(logical),
        };
        physical.and_then(|p| self.values[p].clone())
    }

    pub fn fill(&self, view: Option<&RowMapping>, dst: &mut [Option<ObjectValue>], start: usize) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.read(view, start + i);
        }
    }

    pub fn fill_strided(
        &self,
        view: Option<&RowMapping>,
        dst: &mut [Option<ObjectValue>],
        start: usize,
        offset: usize,
        stride: usize,
    ) {
        let mut row = start;
        let mut pos = offset;
        while pos < dst.len() {
            dst[pos] = self.read(view, row);
            pos += stride;
            row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_null() {
        let store = ObjectStore::new(vec![
            Some(Arc::new(1i64) as ObjectValue),
            Some(Arc::new(2i64) as ObjectValue),
        ]);
        assert!(store.read(None, 5).is_none());
    }
}

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

//! Object arena buffers: a fixed-length `ObjectBuffer<T>` and the
//! append-style `FreeColumnBuffer<T>` that grows instead of being
//! pre-sized (§3's buffer lifecycle note).

use std::sync::Arc;

use tracing::debug;

use crate::buffer::FreezeGuard;
use crate::column::{Column, ColumnData, ObjectStore, ObjectValue};
use crate::error::{ensure_in_range, BeltResult};
use crate::types::ColumnType;

#[derive(Debug)]
pub struct ObjectBuffer<T: Send + Sync + 'static> {
    values: Vec<Option<Arc<T>>>,
    guard: FreezeGuard,
}

impl<T: Send + Sync + 'static> ObjectBuffer<T> {
    pub fn new(size: usize) -> Self {
        ObjectBuffer {
            values: vec![None; size],
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<Arc<T>>> {
        ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
        Ok(self.values[i].clone())
    }

    pub fn set(&mut self, i: usize, value: Option<T>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
        self.values[i] = value.map(Arc::new);
        Ok(())
    }

    pub fn to_column(&mut self) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(size = self.values.len(), "freezing object buffer");
        let erased: Vec<Option<ObjectValue>> = self
            .values
            .iter()
            .map(|v| v.clone().map(|a| a as ObjectValue))
            .collect();
        Ok(Column::new(
            ColumnData::Object(ObjectStore::new(erased)),
            None,
            ColumnType::Object,
        ))
    }

    pub fn is_frozen(&self) -> bool {
        self.guard.is_frozen()
    }
}

/// Append-only object buffer that grows with each push rather than being
/// pre-sized, used by row writers that don't know the final row count
/// up front.
#[derive(Debug)]
pub struct FreeColumnBuffer<T: Send + Sync + 'static> {
    values: Vec<Option<Arc<T>>>,
    guard: FreezeGuard,
}

impl<T: Send + Sync + 'static> Default for FreeColumnBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> FreeColumnBuffer<T> {
    pub fn new() -> Self {
        FreeColumnBuffer {
            values: Vec::new(),
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn push(&mut self, value: Option<T>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        self.values.push(value.map(Arc::new));
        Ok(())
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<Arc<T>>> {
        ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
        Ok(self.values[i].clone())
    }

    pub fn set(&mut self, i: usize, value: Option<T>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
        self.values[i] = value.map(Arc::new);
        Ok(())
    }

    pub fn to_column(&mut self) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(size = self.values.len(), "freezing free column buffer");
        let erased: Vec<Option<ObjectValue>> = self
            .values
            .iter()
            .map(|v| v.clone().map(|a| a as ObjectValue))
            .collect();
        Ok(Column::new(
            ColumnData::Object(ObjectStore::new(erased)),
            None,
            ColumnType::Object,
        ))
    }

    pub fn is_frozen(&self) -> bool {
        self.guard.is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_buffer_grows_on_push() {
        let mut buf: FreeColumnBuffer<String> = FreeColumnBuffer::new();
        buf.push(Some("a".to_string())).unwrap();
        buf.push(None).unwrap();
        buf.push(Some("c".to_string())).unwrap();
        assert_eq!(buf.size(), 3);
        let column = buf.to_column().unwrap();
        assert_eq!(column.size(), 3);
    }

    #[test]
    fn object_buffer_out_of_range_is_null() {
        let mut buf: ObjectBuffer<i64> = ObjectBuffer::new(2);
        buf.set(0, Some(42)).unwrap();
        let column = buf.to_column().unwrap();
        let mut dst: Vec<Option<ObjectValue>> = vec![None; 5];
        column.fill_obj_any(&mut dst, 0).unwrap();
        assert!(dst[0].as_ref().unwrap().downcast_ref::<i64>().copied() == Some(42));
        assert!(dst[4].is_none());
    }
}

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

//! Nanos-of-day buffer backing Time columns.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::FreezeGuard;
use crate::column::{Column, ColumnData, TimeStore};
use crate::error::{ensure_in_range, BeltResult};
use crate::types::{ColumnType, MISSING_TIME_NANOS};

#[derive(Debug)]
pub struct TimeColumnBuffer {
    nanos_of_day: Vec<i64>,
    guard: FreezeGuard,
}

impl TimeColumnBuffer {
    pub fn new(size: usize) -> Self {
        TimeColumnBuffer {
            nanos_of_day: vec![MISSING_TIME_NANOS; size],
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.nanos_of_day.len()
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<i64>> {
        ensure_in_range(i < self.nanos_of_day.len(), format!("index {i} out of range"))?;
        let v = self.nanos_of_day[i];
        Ok((v != MISSING_TIME_NANOS).then_some(v))
    }

    pub fn set(&mut self, i: usize, nanos_of_day: Option<i64>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.nanos_of_day.len(), format!("index {i} out of range"))?;
        self.nanos_of_day[i] = nanos_of_day.unwrap_or(MISSING_TIME_NANOS);
        Ok(())
    }

    pub fn to_column(&mut self) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(size = self.nanos_of_day.len(), "freezing time buffer");
        Ok(Column::new(
            ColumnData::Time(TimeStore {
                nanos_of_day: Arc::new(self.nanos_of_day.clone()),
            }),
            None,
            ColumnType::Time,
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
    fn missing_roundtrips_as_none() {
        let mut buf = TimeColumnBuffer::new(2);
        buf.set(0, Some(3_600_000_000_000)).unwrap();
        buf.set(1, None).unwrap();
        let column = buf.to_column().unwrap();
        assert_eq!(column.read_time(0).unwrap(), Some(3_600_000_000_000));
        assert_eq!(column.read_time(1).unwrap(), None);
    }
}

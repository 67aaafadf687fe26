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

//! Split epoch-seconds (+ optional nanos) buffers backing DateTime
//! columns. `LowPrecisionDateTimeBuffer` carries seconds only;
//! `HighPrecisionDateTimeBuffer` also carries sub-second nanos.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::FreezeGuard;
use crate::column::{Column, ColumnData, DateTimeStore, DateTimeValue};
use crate::error::{ensure_in_range, BeltResult};
use crate::types::{ColumnType, MISSING_DATETIME_SECONDS};

#[derive(Debug)]
pub struct LowPrecisionDateTimeBuffer {
    seconds: Vec<i64>,
    guard: FreezeGuard,
}

impl LowPrecisionDateTimeBuffer {
    pub fn new(size: usize) -> Self {
        LowPrecisionDateTimeBuffer {
            seconds: vec![MISSING_DATETIME_SECONDS; size],
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.seconds.len()
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<i64>> {
        ensure_in_range(i < self.seconds.len(), format!("index {i} out of range"))?;
        let v = self.seconds[i];
        Ok((v != MISSING_DATETIME_SECONDS).then_some(v))
    }

    pub fn set(&mut self, i: usize, epoch_seconds: Option<i64>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.seconds.len(), format!("index {i} out of range"))?;
        self.seconds[i] = epoch_seconds.unwrap_or(MISSING_DATETIME_SECONDS);
        Ok(())
    }

    pub fn to_column(&mut self) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(size = self.seconds.len(), "freezing low-precision datetime buffer");
        Ok(Column::new(
            ColumnData::DateTime(DateTimeStore {
                seconds: Arc::new(self.seconds.clone()),
                nanos: None,
            }),
            None,
            ColumnType::DateTime,
        ))
    }

    pub fn is_frozen(&self) -> bool {
        self.guard.is_frozen()
    }
}

#[derive(Debug)]
pub struct HighPrecisionDateTimeBuffer {
    seconds: Vec<i64>,
    nanos: Vec<i32>,
    guard: FreezeGuard,
}

impl HighPrecisionDateTimeBuffer {
    pub fn new(size: usize) -> Self {
        HighPrecisionDateTimeBuffer {
            seconds: vec![MISSING_DATETIME_SECONDS; size],
            nanos: vec![0; size],
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.seconds.len()
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<DateTimeValue>> {
        ensure_in_range(i < self.seconds.len(), format!("index {i} out of range"))?;
        let secs = self.seconds[i];
        Ok((secs != MISSING_DATETIME_SECONDS).then_some(DateTimeValue {
            epoch_seconds: secs,
            nanos: self.nanos[i],
        }))
    }

    pub fn set(&mut self, i: usize, value: Option<DateTimeValue>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.seconds.len(), format!("index {i} out of range"))?;
        match value {
            Some(v) => {
                self.seconds[i] = v.epoch_seconds;
                self.nanos[i] = v.nanos;
            }
            None => {
                self.seconds[i] = MISSING_DATETIME_SECONDS;
                self.nanos[i] = 0;
            }
        }
        Ok(())
    }

    pub fn to_column(&mut self) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(size = self.seconds.len(), "freezing high-precision datetime buffer");
        Ok(Column::new(
            ColumnData::DateTime(DateTimeStore {
                seconds: Arc::new(self.seconds.clone()),
                nanos: Some(Arc::new(self.nanos.clone())),
            }),
            None,
            ColumnType::DateTime,
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
    fn high_precision_roundtrip() {
        let mut buf = HighPrecisionDateTimeBuffer::new(2);
        buf.set(
            0,
            Some(DateTimeValue {
                epoch_seconds: 1_700_000_000,
                nanos: 123,
            }),
        )
        .unwrap();
        buf.set(1, None).unwrap();
        let column = buf.to_column().unwrap();
        assert_eq!(
            column.read_datetime(0).unwrap(),
            Some(DateTimeValue {
                epoch_seconds: 1_700_000_000,
                nanos: 123
            })
        );
        assert_eq!(column.read_datetime(1).unwrap(), None);
    }
}

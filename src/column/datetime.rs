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

//! Split epoch-seconds (+ optional nanos) storage backing DateTime
//! columns (§3). DateTime is `ObjectReadable`, not `NumericReadable`:
//! seconds-plus-nanos has no single faithful `f64` representation, so
//! reads surface a [`DateTimeValue`] object rather than a raw number.

use std::sync::Arc;

use crate::column::view::RowMapping;
use crate::types::MISSING_DATETIME_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTimeValue {
    pub epoch_seconds: i64,
    pub nanos: i32,
}

#[derive(Debug, Clone)]
pub struct DateTimeStore {
    pub seconds: Arc<Vec<i64>>,
    pub nanos: Option<Arc<Vec<i32>>>,
}

impl DateTimeStore {
    pub fn physical_size(&self) -> usize {
        self.seconds.len()
    }

    pub fn logical_size(&self, view: Option<&RowMapping>) -> usize {
        view.map(|m| m.len()).unwrap_or(self.seconds.len())
    }

    #[inline]
    fn physical_of(&self, view: Option<&RowMapping>, logical: usize) -> Option<usize> {
        match view {
            None => {
                if logical < self.seconds.len() {
                    Some(logical)
                } else {
                    None
                }
            }
            Some(m) => m.translate(logical),
        }
    }

    pub fn read(&self, view: Option<&RowMapping>, logical: usize) -> Option<DateTimeValue> {
        let physical = self.physical_of(view, logical)?;
        let seconds = self.seconds[physical];
        if seconds == MISSING_DATETIME_SECONDS {
            return None;
        }
        let nanos = self.nanos.as_ref().map(|n| n[physical]).unwrap_or(0);
        Some(DateTimeValue {
            epoch_seconds: seconds,
            nanos,
        })
    }

    pub fn fill_obj(&self, view: Option<&RowMapping>, dst: &mut [Option<DateTimeValue>], start: usize) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.read(view, start + i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sentinel_yields_none() {
        let store = DateTimeStore {
            seconds: Arc::new(vec![100, MISSING_DATETIME_SECONDS]),
            nanos: None,
        };
        assert!(store.read(None, 0).is_some());
        assert!(store.read(None, 1).is_none());
    }
}

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

//! Nanos-of-day storage backing Time columns (§3). Like DateTime, Time is
//! `ObjectReadable` rather than `NumericReadable`.

use std::sync::Arc;

use crate::column::view::RowMapping;
use crate::types::MISSING_TIME_NANOS;

#[derive(Debug, Clone)]
pub struct TimeStore {
    pub nanos_of_day: Arc<Vec<i64>>,
}

impl TimeStore {
    pub fn physical_size(&self) -> usize {
        self.nanos_of_day.len()
    }

    pub fn logical_size(&self, view: Option<&RowMapping>) -> usize {
        view.map(|m| m.len()).unwrap_or(self.nanos_of_day.len())
    }

    #[inline]
    fn physical_of(&self, view: Option<&RowMapping>, logical: usize) -> Option<usize> {
        match view {
            None => {
                if logical < self.nanos_of_day.len() {
                    Some(logical)
                } else {
                    None
                }
            }
            Some(m) => m.translate(logical),
        }
    }

    pub fn read(&self, view: Option<&RowMapping>, logical: usize) -> Option<i64> {
        let physical = self.physical_of(view, logical)?;
        let value = self.nanos_of_day[physical];
        if value == MISSING_TIME_NANOS {
            None
        } else {
            Some(value)
        }
    }

    pub fn fill_obj(&self, view: Option<&RowMapping>, dst: &mut [Option<i64>], start: usize) {
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
        let store = TimeStore {
            nanos_of_day: Arc::new(vec![1234, MISSING_TIME_NANOS]),
        };
        assert_eq!(store.read(None, 0), Some(1234));
        assert_eq!(store.read(None, 1), None);
    }
}

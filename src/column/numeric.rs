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

//! Dense `f64` physical storage backing Real and Integer columns (§3).

use std::sync::Arc;

use crate::column::view::RowMapping;
use crate::types::MISSING_F64;

#[derive(Debug, Clone)]
pub struct NumericStore {
    pub values: Arc<Vec<f64>>,
}

impl NumericStore {
    pub fn new(values: Vec<f64>) -> Self {
        NumericStore {
            values: Arc::new(values),
        }
    }

    pub fn physical_size(&self) -> usize {
        self.values.len()
    }

    /// Reads the value at `logical`, translating through `view` first.
    /// Out-of-range or missing positions yield `NaN`, per §4.1.
    #[inline]
    pub fn read(&self, view: Option<&RowMapping>, logical: usize) -> f64 {
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
        match physical {
            Some(p) => self.values[p],
            None => MISSING_F64,
        }
    }

    pub fn logical_size(&self, view: Option<&RowMapping>) -> usize {
        view.map(|m| m.len()).unwrap_or(self.values.len())
    }

    /// Batched fill for `fill_f64(dst, start)`.
    pub fn fill(&self, view: Option<&RowMapping>, dst: &mut [f64], start: usize) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.read(view, start + i);
        }
    }

    /// Interleaved fill for `fill_f64(dst, start, offset, stride)` used by
    /// row readers (§4.1, §4.7).
    pub fn fill_strided(
        &self,
        view: Option<&RowMapping>,
        dst: &mut [f64],
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
    fn missing_propagation_through_view() {
        let store = NumericStore::new(vec![1.0, f64::NAN, 3.0]);
        let view = RowMapping::new(vec![2, -1, 7, 1]);
        let mut dst = [0.0; 4];
        store.fill(Some(&view), &mut dst, 0);
        assert_eq!(dst[0], 3.0);
        assert!(dst[1].is_nan());
        assert!(dst[2].is_nan());
        assert!(dst[3].is_nan());
    }

    #[test]
    fn strided_fill_respects_stride_and_offset() {
        let store = NumericStore::new(vec![10.0, 20.0, 30.0, 40.0]);
        let mut dst = [0.0; 8];
        store.fill_strided(None, &mut dst, 0, 1, 2);
        assert_eq!(dst, [0.0, 10.0, 0.0, 20.0, 0.0, 30.0, 0.0, 40.0]);
    }
}

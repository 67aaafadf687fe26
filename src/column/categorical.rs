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

//! Packed categorical index storage plus dictionary resolution (§3, §4.3).

use std::sync::Arc;

use crate::column::view::RowMapping;
use crate::column::Label;
use crate::dictionary::Dictionary;
use crate::int_format::{IntFormat, PackedBits};
use crate::types::MISSING_CATEGORY_INDEX;

/// The indices backing a categorical column, one representation per
/// `IntFormat` width.
#[derive(Debug, Clone)]
pub enum CategoricalIndices {
    Packed(Arc<PackedBits>),
    UInt16(Arc<Vec<u16>>),
    Int32(Arc<Vec<i32>>),
}

impl CategoricalIndices {
    pub fn len(&self) -> usize {
        match self {
            CategoricalIndices::Packed(p) => p.len(),
            CategoricalIndices::UInt16(v) => v.len(),
            CategoricalIndices::Int32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> i32 {
        match self {
            CategoricalIndices::Packed(p) => {
                if i < p.len() {
                    p.get(i) as i32
                } else {
                    MISSING_CATEGORY_INDEX
                }
            }
            CategoricalIndices::UInt16(v) => v.get(i).copied().map(|x| x as i32).unwrap_or(MISSING_CATEGORY_INDEX),
            CategoricalIndices::Int32(v) => v.get(i).copied().unwrap_or(MISSING_CATEGORY_INDEX),
        }
    }

    pub fn format(&self) -> IntFormat {
        match self {
            CategoricalIndices::Packed(p) => match p.bits() {
                2 => IntFormat::UInt2,
                4 => IntFormat::UInt4,
                8 => IntFormat::UInt8,
                other => unreachable!("unexpected packed width {other}"),
            },
            CategoricalIndices::UInt16(_) => IntFormat::UInt16,
            CategoricalIndices::Int32(_) => IntFormat::Int32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoricalStore {
    pub indices: CategoricalIndices,
    pub dictionary: Arc<Dictionary<Label>>,
    /// Dictionary index considered "true" for the Boolean capability, if any.
    pub positive_index: Option<i32>,
}

impl CategoricalStore {
    pub fn physical_size(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    fn read_index(&self, view: Option<&RowMapping>, logical: usize) -> i32 {
        let physical = match view {
            None => {
                if logical < self.indices.len() {
                    Some(logical)
                } else {
                    None
                }
            }
            Some(m) => m.translate(logical),
        };
        match physical {
            Some(p) => self.indices.get(p),
            None => MISSING_CATEGORY_INDEX,
        }
    }

    pub fn logical_size(&self, view: Option<&RowMapping>) -> usize {
        view.map(|m| m.len()).unwrap_or(self.indices.len())
    }

    /// `fill_i32(dst, start)`: raw dictionary indices, 0 for MISSING.
    pub fn fill_index(&self, view: Option<&RowMapping>, dst: &mut [i32], start: usize) {
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = self.read_index(view, start + i);
        }
    }

    pub fn fill_index_strided(
        &self,
        view: Option<&RowMapping>,
        dst: &mut [i32],
        start: usize,
        offset: usize,
        stride: usize,
    ) {
        let mut row = start;
        let mut pos = offset;
        while pos < dst.len() {
            dst[pos] = self.read_index(view, row);
            pos += stride;
            row += 1;
        }
    }

    /// `fill_obj(dst, start)`: dictionary-decoded values, `None` for
    /// MISSING/out-of-range.
    pub fn fill_obj(&self, view: Option<&RowMapping>, dst: &mut [Option<Label>], start: usize) {
        for (i, slot) in dst.iter_mut().enumerate() {
            let idx = self.read_index(view, start + i);
            *slot = self.dictionary.get(idx).cloned();
        }
    }

    pub fn read_obj(&self, view: Option<&RowMapping>, logical: usize) -> Option<Label> {
        let idx = self.read_index(view, logical);
        self.dictionary.get(idx).cloned()
    }

    pub fn read_index_at(&self, view: Option<&RowMapping>, logical: usize) -> i32 {
        self.read_index(view, logical)
    }

    /// Resolves this column's Boolean capability against the positive
    /// dictionary index, per §9's equality-based matching note.
    pub fn to_boolean(&self, view: Option<&RowMapping>, logical: usize) -> Option<bool> {
        let positive = self.positive_index?;
        let idx = self.read_index(view, logical);
        if idx == MISSING_CATEGORY_INDEX {
            None
        } else {
            Some(idx == positive)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_format::PackedBits;

    fn sample_store() -> CategoricalStore {
        let mut dict: Dictionary<Label> = Dictionary::new();
        dict.intern(Label::Str(Arc::from("red")));
        dict.intern(Label::Str(Arc::from("green")));
        dict.intern(Label::Str(Arc::from("blue")));
        let mut packed = PackedBits::new(4, 6);
        for (i, v) in [1u8, 2, 3, 1, 0, 2].into_iter().enumerate() {
            packed.set(i, v);
        }
        CategoricalStore {
            indices: CategoricalIndices::Packed(Arc::new(packed)),
            dictionary: Arc::new(dict),
            positive_index: None,
        }
    }

    #[test]
    fn missing_iff_index_zero() {
        let store = sample_store();
        for i in 0..6 {
            let idx = store.read_index_at(None, i);
            let obj = store.read_obj(None, i);
            assert_eq!(obj.is_none(), idx == 0);
        }
    }

    #[test]
    fn format_reflects_actual_packed_width() {
        let packed4 = CategoricalIndices::Packed(Arc::new(PackedBits::new(4, 6)));
        assert_eq!(packed4.format(), IntFormat::UInt4);
        let packed2 = CategoricalIndices::Packed(Arc::new(PackedBits::new(2, 6)));
        assert_eq!(packed2.format(), IntFormat::UInt2);
        let packed8 = CategoricalIndices::Packed(Arc::new(PackedBits::new(8, 6)));
        assert_eq!(packed8.format(), IntFormat::UInt8);
    }

    #[test]
    fn filter_scenario_from_spec() {
        // dictionary [MISSING, red, green, blue], indices [1,2,3,1,0,2]
        let store = sample_store();
        let decoded: Vec<Option<Label>> = (0..6).map(|i| store.read_obj(None, i)).collect();
        let greens: Vec<usize> = decoded
            .iter()
            .enumerate()
            .filter(|(_, v)| matches!(v, Some(Label::Str(s)) if &**s == "green"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(greens, vec![1, 5]);
    }
}

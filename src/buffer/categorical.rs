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

//! Categorical buffer with in-place format promotion (§4.3).

use std::sync::Arc;

use tracing::{debug, info};

use crate::buffer::FreezeGuard;
use crate::column::{CategoricalIndices, CategoricalStore, Column, ColumnData, Label};
use crate::dictionary::Dictionary;
use crate::error::{ensure_in_range, BeltError, BeltResult};
use crate::int_format::{IntFormat, PackedBits};
use crate::types::ColumnType;

/// Mutable indices storage for a categorical buffer, one representation
/// per width currently in use.
#[derive(Debug, Clone)]
enum MutIndices {
    Packed(PackedBits),
    U16(Vec<u16>),
    I32(Vec<i32>),
}

impl MutIndices {
    fn new(format: IntFormat, len: usize) -> Self {
        match format {
            IntFormat::UInt2 => MutIndices::Packed(PackedBits::new(2, len)),
            IntFormat::UInt4 => MutIndices::Packed(PackedBits::new(4, len)),
            IntFormat::UInt8 => MutIndices::Packed(PackedBits::new(8, len)),
            IntFormat::UInt16 => MutIndices::U16(vec![0u16; len]),
            IntFormat::Int32 => MutIndices::I32(vec![0i32; len]),
        }
    }

    fn format(&self) -> IntFormat {
        match self {
            MutIndices::Packed(p) => match p.bits() {
                2 => IntFormat::UInt2,
                4 => IntFormat::UInt4,
                8 => IntFormat::UInt8,
                other => unreachable!("unexpected packed width {other}"),
            },
            MutIndices::U16(_) => IntFormat::UInt16,
            MutIndices::I32(_) => IntFormat::Int32,
        }
    }

    fn len(&self) -> usize {
        match self {
            MutIndices::Packed(p) => p.len(),
            MutIndices::U16(v) => v.len(),
            MutIndices::I32(v) => v.len(),
        }
    }

    fn get(&self, i: usize) -> i32 {
        match self {
            MutIndices::Packed(p) => p.get(i) as i32,
            MutIndices::U16(v) => v[i] as i32,
            MutIndices::I32(v) => v[i],
        }
    }

    fn set(&mut self, i: usize, value: i32) {
        match self {
            MutIndices::Packed(p) => p.set(i, value as u8),
            MutIndices::U16(v) => v[i] = value as u16,
            MutIndices::I32(v) => v[i] = value,
        }
    }

    /// Widens this storage to the next format, rewriting indices
    /// unchanged (§4.3's "promote in place" path).
    fn widen(&mut self) {
        let next = match self {
            MutIndices::Packed(p) if p.bits() < 8 => {
                let mut wider = PackedBits::new(p.bits() * 2, p.len());
                for i in 0..p.len() {
                    wider.set(i, p.get(i));
                }
                MutIndices::Packed(wider)
            }
            MutIndices::Packed(p) => MutIndices::U16(p.widen_to_u16()),
            MutIndices::U16(v) => MutIndices::I32(v.iter().map(|&x| x as i32).collect()),
            MutIndices::I32(_) => return,
        };
        *self = next;
    }

    fn freeze(self) -> CategoricalIndices {
        match self {
            MutIndices::Packed(p) => CategoricalIndices::Packed(Arc::new(p)),
            MutIndices::U16(v) => CategoricalIndices::UInt16(Arc::new(v)),
            MutIndices::I32(v) => CategoricalIndices::Int32(Arc::new(v)),
        }
    }
}

/// Builds a fresh, immutable [`CategoricalIndices`] at the narrowest
/// format that fits `max(raw)`, used by `Column::map` when materializing
/// a gathered categorical column without going through the mutable
/// buffer API.
pub fn pack_indices(raw: &[i32], format: IntFormat) -> CategoricalIndices {
    let mut storage = MutIndices::new(format, raw.len());
    for (i, &v) in raw.iter().enumerate() {
        storage.set(i, v);
    }
    storage.freeze()
}

#[derive(Debug)]
pub struct CategoricalBuffer {
    indices: MutIndices,
    dictionary: Dictionary<Label>,
    fixed_width: bool,
    positive_index: Option<i32>,
    guard: FreezeGuard,
}

impl CategoricalBuffer {
    /// `width` is the caller-chosen starting width (or the narrowest that
    /// fits a declared value cap, computed by the caller via
    /// `IntFormat::min_format_for`). `fixed_width` selects promotion
    /// policy: `true` fails on overflow instead of widening in place.
    pub fn new(size: usize, width: IntFormat, fixed_width: bool) -> Self {
        CategoricalBuffer {
            indices: MutIndices::new(width, size),
            dictionary: Dictionary::new(),
            fixed_width,
            positive_index: None,
            guard: FreezeGuard::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.indices.len()
    }

    pub fn format(&self) -> IntFormat {
        self.indices.format()
    }

    pub fn get(&self, i: usize) -> BeltResult<Option<Label>> {
        ensure_in_range(i < self.indices.len(), format!("index {i} out of range"))?;
        Ok(self.dictionary.get(self.indices.get(i)).cloned())
    }

    /// `set(i, None)` stores the MISSING sentinel (index 0). `set(i,
    /// Some(value))` resolves `value` in the dictionary, appending it on
    /// first sight, and promotes the backing width if needed.
    pub fn set(&mut self, i: usize, value: Option<Label>) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        ensure_in_range(i < self.indices.len(), format!("index {i} out of range"))?;
        match value {
            None => {
                self.indices.set(i, 0);
                Ok(())
            }
            Some(v) => {
                let idx = match self.dictionary.index_of(&v) {
                    Some(existing) => existing,
                    None => {
                        let prospective = self.dictionary.len() as i32;
                        self.ensure_capacity(prospective)?;
                        self.dictionary.intern(v)
                    }
                };
                self.indices.set(i, idx);
                Ok(())
            }
        }
    }

    fn ensure_capacity(&mut self, prospective_index: i32) -> BeltResult<()> {
        while prospective_index > self.indices.format().max_value() as i32 {
            if self.fixed_width {
                return Err(BeltError::out_of_range(format!(
                    "categorical dictionary would exceed fixed width {:?}",
                    self.indices.format()
                )));
            }
            let from = self.indices.format();
            self.indices.widen();
            info!(from = ?from, to = ?self.indices.format(), "promoted categorical buffer format");
        }
        Ok(())
    }

    /// Declares the dictionary value treated as "true" for the Boolean
    /// capability. Fails if the value isn't in the dictionary, or if the
    /// dictionary already has more than two user values (the Boolean
    /// capability caps the dictionary, MISSING slot included, at three
    /// entries).
    pub fn set_positive_category(&mut self, value: &Label) -> BeltResult<()> {
        self.guard.ensure_writable()?;
        if self.dictionary.len() > 3 {
            return Err(BeltError::bad_argument(
                "boolean dictionary exceeds two values",
            ));
        }
        let idx = self
            .dictionary
            .index_of(value)
            .ok_or_else(|| BeltError::bad_argument("positive category value not in dictionary"))?;
        self.positive_index = Some(idx);
        Ok(())
    }

    pub fn to_column(&mut self, column_type: ColumnType) -> BeltResult<Column> {
        self.guard.freeze()?;
        debug!(
            size = self.indices.len(),
            format = ?self.indices.format(),
            dictionary_len = self.dictionary.len(),
            "freezing categorical buffer"
        );
        let store = CategoricalStore {
            indices: self.indices.clone().freeze(),
            dictionary: Arc::new(self.dictionary.clone()),
            positive_index: self.positive_index,
        };
        Ok(Column::new(ColumnData::Categorical(store), None, column_type))
    }

    pub fn is_frozen(&self) -> bool {
        self.guard.is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_preserves_values() {
        let mut buf = CategoricalBuffer::new(5, IntFormat::UInt2, false);
        let labels = ["a", "b", "c", "d", "e"];
        for (i, l) in labels.iter().enumerate() {
            buf.set(i, Some(Label::from(*l))).unwrap();
        }
        // 5 distinct values need an index up to 4, which overflows UInt2
        // (max 3) and promotes once to UInt4 (max 15).
        assert_eq!(buf.format(), IntFormat::UInt4);
        let column = buf.to_column(ColumnType::Categorical).unwrap();
        for (i, l) in labels.iter().enumerate() {
            let obj = column.read_obj_label(i).unwrap();
            assert_eq!(obj, Some(Label::from(*l)));
        }
    }

    #[test]
    fn promotion_past_byte_boundary_preserves_values() {
        let mut buf = CategoricalBuffer::new(300, IntFormat::UInt2, false);
        for i in 0..300 {
            buf.set(i, Some(Label::from(format!("v{i}")))).unwrap();
        }
        assert_eq!(buf.format(), IntFormat::UInt16);
        let column = buf.to_column(ColumnType::Categorical).unwrap();
        for i in 0..300 {
            let obj = column.read_obj_label(i).unwrap();
            assert_eq!(obj, Some(Label::from(format!("v{i}"))));
        }
    }

    #[test]
    fn fixed_width_overflow_fails() {
        let mut buf = CategoricalBuffer::new(5, IntFormat::UInt2, true);
        buf.set(0, Some(Label::from("a"))).unwrap();
        buf.set(1, Some(Label::from("b"))).unwrap();
        buf.set(2, Some(Label::from("c"))).unwrap();
        // index 3 (the 4th distinct value) still fits UInt2's max of 3.
        buf.set(3, Some(Label::from("d"))).unwrap();
        let err = buf.set(4, Some(Label::from("e"))).unwrap_err();
        assert!(matches!(err, BeltError::OutOfRange(_)));
    }

    #[test]
    fn write_after_freeze_is_state_error() {
        let mut buf = CategoricalBuffer::new(2, IntFormat::UInt8, false);
        buf.set(0, Some(Label::from("a"))).unwrap();
        buf.to_column(ColumnType::Categorical).unwrap();
        let err = buf.set(1, Some(Label::from("b"))).unwrap_err();
        assert!(matches!(err, BeltError::State(_)));
    }

    #[test]
    fn set_null_stores_missing_sentinel() {
        let mut buf = CategoricalBuffer::new(2, IntFormat::UInt8, false);
        buf.set(0, None).unwrap();
        buf.set(1, Some(Label::from("x"))).unwrap();
        let column = buf.to_column(ColumnType::Categorical).unwrap();
        assert_eq!(column.read_index(0).unwrap(), 0);
        assert!(column.read_obj_label(0).unwrap().is_none());
    }
}

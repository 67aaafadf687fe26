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

//! Dense `f64` buffers backing Real and Integer columns.

use tracing::debug;

use crate::buffer::FreezeGuard;
use crate::column::{Column, ColumnData, NumericStore};
use crate::error::{ensure_in_range, BeltResult};
use crate::types::ColumnType;

macro_rules! dense_real_buffer {
    ($name:ident, $column_type:expr) => {
        #[derive(Debug)]
        pub struct $name {
            values: Vec<f64>,
            guard: FreezeGuard,
        }

        impl $name {
            pub fn new(size: usize) -> Self {
                $name {
                    values: vec![f64::NAN; size],
                    guard: FreezeGuard::default(),
                }
            }

            pub fn size(&self) -> usize {
                self.values.len()
            }

            pub fn get(&self, i: usize) -> BeltResult<f64> {
                ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
                Ok(self.values[i])
            }

            pub fn set(&mut self, i: usize, value: f64) -> BeltResult<()> {
                self.guard.ensure_writable()?;
                ensure_in_range(i < self.values.len(), format!("index {i} out of range"))?;
                self.values[i] = value;
                Ok(())
            }

            /// Round-trips every value of `column` into this buffer.
            /// Used to test `buffer.fill_from(column).to_column()` equality.
            pub fn fill_from(&mut self, column: &Column) -> BeltResult<()> {
                for i in 0..self.values.len() {
                    self.set(i, column.read_f64(i)?)?;
                }
                Ok(())
            }

            pub fn to_column(&mut self) -> BeltResult<Column> {
                self.guard.freeze()?;
                debug!(size = self.values.len(), kind = stringify!($name), "freezing buffer");
                Ok(Column::new(
                    ColumnData::Numeric(NumericStore::new(self.values.clone())),
                    None,
                    $column_type,
                ))
            }

            pub fn is_frozen(&self) -> bool {
                self.guard.is_frozen()
            }
        }
    };
}

dense_real_buffer!(FixedRealBuffer, ColumnType::Real);
dense_real_buffer!(FixedIntegerBuffer, ColumnType::Integer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BeltError;

    #[test]
    fn double_freeze_fails() {
        let mut buf = FixedRealBuffer::new(2);
        let column = buf.to_column().unwrap();
        assert_eq!(column.size(), 2);
        let err = buf.to_column().unwrap_err();
        assert!(matches!(err, BeltError::State(_)));
    }

    #[test]
    fn write_after_freeze_fails() {
        let mut buf = FixedRealBuffer::new(2);
        buf.set(0, 1.0).unwrap();
        buf.to_column().unwrap();
        assert!(buf.is_frozen());
        let err = buf.set(1, 2.0).unwrap_err();
        assert!(matches!(err, BeltError::State(_)));
    }

    #[test]
    fn fill_from_roundtrips() {
        let mut src = FixedRealBuffer::new(4);
        for (i, v) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            src.set(i, v).unwrap();
        }
        let source_column = src.to_column().unwrap();
        let mut dst = FixedRealBuffer::new(4);
        dst.fill_from(&source_column).unwrap();
        let dst_column = dst.to_column().unwrap();
        assert!(source_column.equals(&dst_column));
    }
}

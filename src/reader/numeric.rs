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

//! Row reader over an all-`NumericReadable` column set (§4.7).

use crate::column::Column;
use crate::config::BeltConfig;
use crate::error::{ensure_arg, BeltResult};
use crate::reader::{batch_rows, BEFORE_FIRST};
use crate::types::Capability;

pub struct NumericRowReader<'a> {
    columns: Vec<&'a Column>,
    size: usize,
    position: i64,
    batch: Vec<f64>,
    batch_row_capacity: usize,
    batch_start: i64,
    batch_len: usize,
}

impl<'a> NumericRowReader<'a> {
    pub fn new(columns: Vec<&'a Column>, config: &BeltConfig) -> BeltResult<Self> {
        ensure_arg(!columns.is_empty(), "row reader requires at least one column")?;
        for c in &columns {
            ensure_arg(
                c.capabilities().contains(Capability::NUMERIC_READABLE),
                "all columns of a numeric row reader must be NumericReadable",
            )?;
        }
        let size = columns[0].size();
        ensure_arg(
            columns.iter().all(|c| c.size() == size),
            "all columns of a row reader must have equal size",
        )?;
        let batch_row_capacity = batch_rows(std::mem::size_of::<f64>(), columns.len(), config);
        Ok(NumericRowReader {
            columns,
            size,
            position: BEFORE_FIRST,
            batch: Vec::new(),
            batch_row_capacity,
            batch_start: BEFORE_FIRST,
            batch_len: 0,
        })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    /// Jumps the cursor without I/O; the batch is invalidated lazily on
    /// the next `move_next`.
    pub fn set_position(&mut self, p: i64) {
        self.position = p;
    }

    fn is_within_current_batch(&self, p: i64) -> bool {
        p >= self.batch_start && (p - self.batch_start) < self.batch_len as i64
    }

    fn refill(&mut self) -> BeltResult<()> {
        let start = self.position as usize;
        let remaining = self.size - start;
        let len = remaining.min(self.batch_row_capacity);
        let width = self.columns.len();
        self.batch.resize(len * width, f64::NAN);
        for (col_idx, column) in self.columns.iter().enumerate() {
            column.fill_f64_strided(&mut self.batch, start, col_idx, width)?;
        }
        self.batch_start = self.position;
        self.batch_len = len;
        Ok(())
    }

    /// Advances to the next row; returns `false` past the last row.
    pub fn move_next(&mut self) -> BeltResult<bool> {
        let next = self.position + 1;
        if next as usize >= self.size {
            self.position = self.size as i64;
            return Ok(false);
        }
        self.position = next;
        if !self.is_within_current_batch(self.position) {
            self.refill()?;
        }
        Ok(true)
    }

    pub fn get(&self, column_index: usize) -> f64 {
        let offset = (self.position - self.batch_start) as usize;
        self.batch[offset * self.columns.len() + column_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnData, NumericStore};
    use crate::types::ColumnType;

    fn real_column(values: Vec<f64>) -> Column {
        Column::new(ColumnData::Numeric(NumericStore::new(values)), None, ColumnType::Real)
    }

    #[test]
    fn iterates_rows_in_order() {
        let a = real_column(vec![1.0, 2.0, 3.0]);
        let b = real_column(vec![10.0, 20.0, 30.0]);
        let config = BeltConfig::default();
        let mut reader = NumericRowReader::new(vec![&a, &b], &config).unwrap();
        let mut seen = vec![];
        while reader.move_next().unwrap() {
            seen.push((reader.get(0), reader.get(1)));
        }
        assert_eq!(seen, vec![(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
        assert!(!reader.move_next().unwrap());
    }

    #[test]
    fn set_position_jumps_without_refill() {
        let a = real_column(vec![1.0, 2.0, 3.0, 4.0]);
        let config = BeltConfig::default();
        let mut reader = NumericRowReader::new(vec![&a], &config).unwrap();
        reader.set_position(1);
        assert!(reader.move_next().unwrap());
        assert_eq!(reader.get(0), 3.0);
    }

    #[test]
    fn mismatched_sizes_is_bad_argument() {
        let a = real_column(vec![1.0, 2.0]);
        let b = real_column(vec![1.0]);
        let config = BeltConfig::default();
        assert!(NumericRowReader::new(vec![&a, &b], &config).is_err());
    }
}

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

//! General row reader over a heterogeneous column set (§4.7): keeps
//! parallel numeric and object batches, one per underlying capability,
//! and dispatches `get` to whichever batch backs a given column.

use crate::column::{Column, ObjectValue};
use crate::config::BeltConfig;
use crate::error::{ensure_arg, BeltResult};
use crate::reader::{batch_rows, BEFORE_FIRST};
use crate::types::Capability;

enum Lane {
    Numeric(usize),
    Object(usize),
}

pub struct MixedRowReader<'a> {
    columns: Vec<&'a Column>,
    lanes: Vec<Lane>,
    size: usize,
    position: i64,
    numeric_batch: Vec<f64>,
    object_batch: Vec<Vec<Option<ObjectValue>>>,
    batch_row_capacity: usize,
    batch_start: i64,
    batch_len: usize,
    num_numeric: usize,
}

impl<'a> MixedRowReader<'a> {
    pub fn new(columns: Vec<&'a Column>, config: &BeltConfig) -> BeltResult<Self> {
        ensure_arg(!columns.is_empty(), "row reader requires at least one column")?;
        let size = columns[0].size();
        ensure_arg(
            columns.iter().all(|c| c.size() == size),
            "all columns of a row reader must have equal size",
        )?;
        let mut lanes = Vec::with_capacity(columns.len());
        let mut num_numeric = 0;
        let mut num_object = 0;
        for c in &columns {
            if c.capabilities().contains(Capability::NUMERIC_READABLE) {
                lanes.push(Lane::Numeric(num_numeric));
                num_numeric += 1;
            } else if c.capabilities().contains(Capability::OBJECT_READABLE) {
                lanes.push(Lane::Object(num_object));
                num_object += 1;
            } else {
                return Err(crate::error::BeltError::unsupported(
                    "mixed row reader requires each column to be NumericReadable or ObjectReadable",
                ));
            }
        }
        let batch_row_capacity = batch_rows(16, columns.len(), config);
        Ok(MixedRowReader {
            columns,
            lanes,
            size,
            position: BEFORE_FIRST,
            numeric_batch: Vec::new(),
            object_batch: vec![Vec::new(); num_object],
            batch_row_capacity,
            batch_start: BEFORE_FIRST,
            batch_len: 0,
            num_numeric,
        })
    }

    pub fn set_position(&mut self, p: i64) {
        self.position = p;
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    fn is_within_current_batch(&self, p: i64) -> bool {
        p >= self.batch_start && (p - self.batch_start) < self.batch_len as i64
    }

    fn refill(&mut self) -> BeltResult<()> {
        let start = self.position as usize;
        let len = (self.size - start).min(self.batch_row_capacity);
        self.numeric_batch.resize(len * self.num_numeric.max(1), f64::NAN);
        let mut object_batch: Vec<Vec<Option<ObjectValue>>> = Vec::with_capacity(self.object_batch.len());

        for (column, lane) in self.columns.iter().zip(&self.lanes) {
            match lane {
                Lane::Numeric(idx) => {
                    column.fill_f64_strided(&mut self.numeric_batch, start, *idx, self.num_numeric)?;
                }
                Lane::Object(_) => {
                    let mut buf = vec![None; len];
                    column.fill_obj_any(&mut buf, start)?;
                    object_batch.push(buf);
                }
            }
        }
        self.object_batch = object_batch;
        self.batch_start = self.position;
        self.batch_len = len;
        Ok(())
    }

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

    pub fn get_f64(&self, column_index: usize) -> f64 {
        match self.lanes[column_index] {
            Lane::Numeric(idx) => {
                let offset = (self.position - self.batch_start) as usize;
                self.numeric_batch[offset * self.num_numeric + idx]
            }
            Lane::Object(_) => panic!("column {column_index} is not numeric"),
        }
    }

    pub fn get_obj(&self, column_index: usize) -> &Option<ObjectValue> {
        match self.lanes[column_index] {
            Lane::Object(idx) => {
                let offset = (self.position - self.batch_start) as usize;
                &self.object_batch[idx][offset]
            }
            Lane::Numeric(_) => panic!("column {column_index} is not object-backed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnData, NumericStore, ObjectStore};
    use crate::types::ColumnType;
    use std::sync::Arc;

    #[test]
    fn walks_numeric_and_object_columns_together() {
        let numeric = Column::new(
            ColumnData::Numeric(NumericStore::new(vec![1.0, 2.0, 3.0])),
            None,
            ColumnType::Real,
        );
        let values: Vec<Option<ObjectValue>> = vec![
            Some(Arc::new("a".to_string()) as ObjectValue),
            Some(Arc::new("b".to_string()) as ObjectValue),
            None,
        ];
        let object = Column::new(ColumnData::Object(ObjectStore::new(values)), None, ColumnType::Object);
        let config = BeltConfig::default();
        let mut reader = MixedRowReader::new(vec![&numeric, &object], &config).unwrap();
        let mut seen = vec![];
        while reader.move_next().unwrap() {
            seen.push((reader.get_f64(0), reader.get_obj(1).is_some()));
        }
        assert_eq!(seen, vec![(1.0, true), (2.0, true), (3.0, false)]);
    }
}

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

//! Categorical and Object row readers (§4.7). Both project `OBJECT_READABLE`
//! columns, decoded one column-major batch at a time (there is no
//! interleaved `fill_obj_*_strided` counterpart to the numeric fill, so
//! each column keeps its own contiguous batch buffer).

use crate::column::{Column, Label, ObjectValue};
use crate::config::BeltConfig;
use crate::error::{ensure_arg, BeltResult};
use crate::reader::{batch_rows, BEFORE_FIRST};
use crate::types::Capability;

pub struct CategoricalRowReader<'a> {
    columns: Vec<&'a Column>,
    size: usize,
    position: i64,
    batches: Vec<Vec<Option<Label>>>,
    batch_row_capacity: usize,
    batch_start: i64,
    batch_len: usize,
}

impl<'a> CategoricalRowReader<'a> {
    pub fn new(columns: Vec<&'a Column>, config: &BeltConfig) -> BeltResult<Self> {
        ensure_arg(!columns.is_empty(), "row reader requires at least one column")?;
        for c in &columns {
            ensure_arg(
                matches!(c.data(), crate::column::ColumnData::Categorical(_)),
                "all columns of a categorical row reader must be Categorical",
            )?;
        }
        let size = columns[0].size();
        ensure_arg(
            columns.iter().all(|c| c.size() == size),
            "all columns of a row reader must have equal size",
        )?;
        let batch_row_capacity = batch_rows(8, columns.len(), config);
        Ok(CategoricalRowReader {
            columns,
            size,
            position: BEFORE_FIRST,
            batches: Vec::new(),
            batch_row_capacity,
            batch_start: BEFORE_FIRST,
            batch_len: 0,
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
        self.batches = self
            .columns
            .iter()
            .map(|column| {
                let mut buf = vec![None; len];
                column.fill_obj_label(&mut buf, start)?;
                Ok(buf)
            })
            .collect::<BeltResult<_>>()?;
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

    pub fn get(&self, column_index: usize) -> &Option<Label> {
        let offset = (self.position - self.batch_start) as usize;
        &self.batches[column_index][offset]
    }
}

pub struct ObjectRowReader<'a> {
    columns: Vec<&'a Column>,
    size: usize,
    position: i64,
    batches: Vec<Vec<Option<ObjectValue>>>,
    batch_row_capacity: usize,
    batch_start: i64,
    batch_len: usize,
}

impl<'a> ObjectRowReader<'a> {
    pub fn new(columns: Vec<&'a Column>, config: &BeltConfig) -> BeltResult<Self> {
        ensure_arg(!columns.is_empty(), "row reader requires at least one column")?;
        for c in &columns {
            ensure_arg(
                c.capabilities().contains(Capability::OBJECT_READABLE),
                "all columns of an object row reader must be ObjectReadable",
            )?;
        }
        let size = columns[0].size();
        ensure_arg(
            columns.iter().all(|c| c.size() == size),
            "all columns of a row reader must have equal size",
        )?;
        let batch_row_capacity = batch_rows(16, columns.len(), config);
        Ok(ObjectRowReader {
            columns,
            size,
            position: BEFORE_FIRST,
            batches: Vec::new(),
            batch_row_capacity,
            batch_start: BEFORE_FIRST,
            batch_len: 0,
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
        self.batches = self
            .columns
            .iter()
            .map(|column| {
                let mut buf = vec![None; len];
                column.fill_obj_any(&mut buf, start)?;
                Ok(buf)
            })
            .collect::<BeltResult<_>>()?;
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

    pub fn get(&self, column_index: usize) -> &Option<ObjectValue> {
        let offset = (self.position - self.batch_start) as usize;
        &self.batches[column_index][offset]
    }
}

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

//! Deferred multi-column handle (§6). `columns`, `rows` and `sort` each
//! wrap the receiver as the upstream of a new task; evaluation only
//! happens on `run(context)`.

use crate::config::BeltConfig;
use crate::error::{ensure_arg, BeltError, BeltResult};
use crate::executor::ExecutionContext;
use crate::sort::SortOrder;
use crate::task::Table;

type Run = dyn Fn(&ExecutionContext) -> BeltResult<Table> + Send + Sync;

pub struct TableTask {
    run: Box<Run>,
}

impl TableTask {
    pub fn source(table: Table) -> Self {
        TableTask {
            run: Box::new(move |_ctx| Ok(table.clone())),
        }
    }

    fn chained(self, step: impl Fn(Table, &ExecutionContext) -> BeltResult<Table> + Send + Sync + 'static) -> Self {
        TableTask {
            run: Box::new(move |ctx| {
                if !ctx.is_active() {
                    return Err(BeltError::aborted("execution context cancelled"));
                }
                let upstream = (self.run)(ctx)?;
                if !ctx.is_active() {
                    return Err(BeltError::aborted("execution context cancelled"));
                }
                step(upstream, ctx)
            }),
        }
    }

    /// Projects the table down to (and reorders to) `names`, in order.
    pub fn columns(self, names: Vec<String>) -> Self {
        self.chained(move |table, _ctx| {
            let selected = names
                .iter()
                .map(|name| {
                    table
                        .column(name)
                        .cloned()
                        .map(|c| (name.clone(), c))
                        .ok_or_else(|| BeltError::bad_argument(format!("no such column: {name}")))
                })
                .collect::<BeltResult<Vec<_>>>()?;
            Table::new(selected)
        })
    }

    /// Maps every column of the table by the same row index vector (§4.2).
    pub fn rows(self, index_vec: Vec<i32>, prefer_view: bool, config: BeltConfig) -> Self {
        self.chained(move |table, _ctx| {
            let mapped: Vec<(String, crate::column::Column)> = table
                .column_names()
                .iter()
                .cloned()
                .zip(table.columns().iter())
                .map(|(name, c)| (name, c.map(&index_vec, prefer_view, &config)))
                .collect();
            Table::new(mapped)
        })
    }

    /// Stable multi-key sort over named columns (§4.6), reordering every
    /// column of the table by the resulting permutation.
    pub fn sort(self, keys: Vec<String>, orders: Vec<SortOrder>) -> Self {
        self.chained(move |table, _ctx| {
            ensure_arg(keys.len() == orders.len(), "sort key count must match order count")?;
            let key_columns = keys
                .iter()
                .map(|name| {
                    table
                        .column(name)
                        .ok_or_else(|| BeltError::bad_argument(format!("no such column: {name}")))
                })
                .collect::<BeltResult<Vec<_>>>()?;
            let indices = crate::sort::multi_key_sort(&key_columns, &orders)?;
            let config = BeltConfig::default();
            let mapped: Vec<(String, crate::column::Column)> = table
                .column_names()
                .iter()
                .cloned()
                .zip(table.columns().iter())
                .map(|(name, c)| (name, c.map(&indices, false, &config)))
                .collect();
            Table::new(mapped)
        })
    }

    pub fn run(&self, context: &ExecutionContext) -> BeltResult<Table> {
        (self.run)(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, ColumnData, NumericStore};
    use crate::types::ColumnType;

    fn real_column(values: Vec<f64>) -> Column {
        Column::new(ColumnData::Numeric(NumericStore::new(values)), None, ColumnType::Real)
    }

    fn sample_table() -> Table {
        Table::new(vec![
            ("a".to_string(), real_column(vec![3.0, 1.0, 2.0])),
            ("b".to_string(), real_column(vec![30.0, 10.0, 20.0])),
        ])
        .unwrap()
    }

    #[test]
    fn columns_projects_and_reorders() {
        let task = TableTask::source(sample_table()).columns(vec!["b".to_string()]);
        let ctx = ExecutionContext::global();
        let result = task.run(&ctx).unwrap();
        assert_eq!(result.num_columns(), 1);
        assert_eq!(result.column_names(), &["b".to_string()]);
    }

    #[test]
    fn sort_reorders_every_column_consistently() {
        let task = TableTask::source(sample_table()).sort(vec!["a".to_string()], vec![SortOrder::Ascending]);
        let ctx = ExecutionContext::global();
        let result = task.run(&ctx).unwrap();
        let a = result.column("a").unwrap();
        let b = result.column("b").unwrap();
        let a_vals: Vec<f64> = (0..3).map(|i| a.read_f64(i).unwrap()).collect();
        let b_vals: Vec<f64> = (0..3).map(|i| b.read_f64(i).unwrap()).collect();
        assert_eq!(a_vals, vec![1.0, 2.0, 3.0]);
        assert_eq!(b_vals, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn columns_rejects_unknown_name() {
        let task = TableTask::source(sample_table()).columns(vec!["nope".to_string()]);
        let ctx = ExecutionContext::global();
        assert!(task.run(&ctx).is_err());
    }
}

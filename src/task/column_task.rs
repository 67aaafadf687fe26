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

//! Deferred single-column handle. `map`/`sort` return a new `ColumnTask`
//! wrapping `self` as the upstream; nothing runs until `run(context)`.

use crate::column::Column;
use crate::config::BeltConfig;
use crate::error::{BeltError, BeltResult};
use crate::executor::ExecutionContext;
use crate::sort::SortOrder;

type Run = dyn Fn(&ExecutionContext) -> BeltResult<Column> + Send + Sync;

pub struct ColumnTask {
    run: Box<Run>,
}

impl ColumnTask {
    /// Wraps an already-materialized column as a no-op task.
    pub fn source(column: Column) -> Self {
        ColumnTask {
            run: Box::new(move |_ctx| Ok(column.clone())),
        }
    }

    fn chained(self, step: impl Fn(Column, &ExecutionContext) -> BeltResult<Column> + Send + Sync + 'static) -> Self {
        ColumnTask {
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

    /// Chains a `map` (§4.2) onto this task.
    pub fn map(self, index_vec: Vec<i32>, prefer_view: bool, config: BeltConfig) -> Self {
        self.chained(move |upstream, _ctx| Ok(upstream.map(&index_vec, prefer_view, &config)))
    }

    /// Chains a `sort` (§4.6): the result of the upstream task is reordered
    /// by its own sort permutation.
    pub fn sort(self, order: SortOrder) -> Self {
        self.chained(move |upstream, _ctx| {
            let indices = upstream.sort(order)?;
            Ok(upstream.map(&indices, false, &BeltConfig::default()))
        })
    }

    /// Evaluates the whole upstream chain, checking cancellation at each
    /// boundary along the way.
    pub fn run(&self, context: &ExecutionContext) -> BeltResult<Column> {
        (self.run)(context)
    }
}

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

//! Belt: an in-memory, immutable, column-oriented table engine core for
//! analytics workloads.
//!
//! A [`column::Column`] is a polymorphic, frozen sequence of values. Views
//! ([`column::view::RowMapping`]) reorder or resize a column without
//! copying; [`buffer`] types are the write-once staging containers that
//! freeze into columns. The [`executor`] and [`calculator`] modules run
//! batched work (`apply`/`reduce`/`filter`) over a shared worker pool, and
//! [`task`] provides deferred `ColumnTask`/`TableTask` handles that chain
//! transformations without evaluating them until `run`.

pub mod buffer;
pub mod calculator;
pub mod column;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod executor;
pub mod int_format;
pub mod mapping;
pub mod reader;
pub mod sort;
pub mod task;
pub mod types;

pub use column::{Column, Label};
pub use config::BeltConfig;
pub use error::{BeltError, BeltResult};
pub use executor::{ExecutionContext, ExecutionState, Workload};
pub use sort::SortOrder;
pub use task::{ColumnTask, Table, TableTask};
pub use types::{Capability, Category, ColumnType};

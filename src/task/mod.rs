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

//! Deferred task handles (§6, §9's "Lazy task chain"): a task is a closure
//! capturing an upstream task plus a transformation; nothing runs until
//! `run(context)` is called, and each chained call wraps the previous task
//! in a new one rather than running eagerly.

mod column_task;
mod table;
mod table_task;

pub use column_task::ColumnTask;
pub use table::Table;
pub use table_task::TableTask;

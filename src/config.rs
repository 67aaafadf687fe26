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

//! Tunable constants called out as heuristics in the design notes
//! (view-vs-materialize threshold, batch sizing, prefetch buffer rows).
//! Exposed as a config struct rather than hard-coded module constants so
//! callers can tune them, per the "expose it for tuning" open question.

use crate::executor::Workload;

/// Fraction of physical size above which `map` prefers a lazy view over
/// materializing, absent an explicit `prefer_view` request.
pub const DEFAULT_VIEW_THRESHOLD: f64 = 0.1;

pub const DEFAULT_MIN_BATCH: usize = 1024;
pub const DEFAULT_MAX_BATCH: usize = 1 << 20;

/// Row reader prefetch batch is clamped to this range regardless of the
/// ≈256 KiB / element-size / column-count target.
pub const DEFAULT_MIN_BUFFER_ROWS: usize = 64;
pub const DEFAULT_MAX_BUFFER_ROWS: usize = 1 << 16;

/// Reader stack-batch sizing target in bytes, per §4.7.
pub const READER_BATCH_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct BeltConfig {
    pub view_threshold: f64,
    pub min_batch: usize,
    pub max_batch: usize,
    pub min_buffer_rows: usize,
    pub max_buffer_rows: usize,
}

impl Default for BeltConfig {
    fn default() -> Self {
        BeltConfig {
            view_threshold: DEFAULT_VIEW_THRESHOLD,
            min_batch: DEFAULT_MIN_BATCH,
            max_batch: DEFAULT_MAX_BATCH,
            min_buffer_rows: DEFAULT_MIN_BUFFER_ROWS,
            max_buffer_rows: DEFAULT_MAX_BUFFER_ROWS,
        }
    }
}

impl BeltConfig {
    /// Per-cell cost target in cells-per-batch for a given workload label,
    /// before min/max clamping. `TrivialPerCell` and `Huge` are handled by
    /// the planner's sequential-threshold check and never reach here.
    pub fn target_batch_cells(&self, workload: Workload) -> usize {
        match workload {
            Workload::TrivialPerCell => self.max_batch,
            Workload::SmallPerCell => 1 << 16,
            Workload::MediumPerCell => 1 << 14,
            Workload::LargePerCell => 1 << 11,
            Workload::Huge => self.min_batch,
        }
    }

    /// Sequential-execution threshold per workload (§4.4 step 1).
    pub fn sequential_threshold(&self, workload: Workload) -> usize {
        match workload {
            Workload::TrivialPerCell => usize::MAX,
            Workload::SmallPerCell => 1 << 14,
            Workload::MediumPerCell => 1 << 12,
            Workload::LargePerCell => 1 << 9,
            Workload::Huge => 1,
        }
    }
}

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

//! Row readers (§4.7): cursor over a fixed set of columns, prefetching a
//! stack-sized batch of rows at a time via the interleaved `fill_*_strided`
//! API rather than reading one cell at a time.

mod mixed;
mod numeric;
mod object;

pub use mixed::MixedRowReader;
pub use numeric::NumericRowReader;
pub use object::{CategoricalRowReader, ObjectRowReader};

use crate::config::BeltConfig;

/// Before-first-row cursor position.
pub const BEFORE_FIRST: i64 = -1;

/// Batch row count per §4.7's ≈256 KiB / element-size / column-count
/// formula, clamped to `[min_buffer_rows, max_buffer_rows]`.
pub(crate) fn batch_rows(element_size: usize, num_columns: usize, config: &BeltConfig) -> usize {
    let denom = (element_size.max(1)) * num_columns.max(1);
    let target = crate::config::READER_BATCH_BYTES / denom;
    target.clamp(config.min_buffer_rows, config.max_buffer_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_rows_respects_clamp() {
        let config = BeltConfig::default();
        let rows = batch_rows(8, 1, &config);
        assert!(rows >= config.min_buffer_rows);
        assert!(rows <= config.max_buffer_rows);
    }

    #[test]
    fn batch_rows_shrinks_with_more_columns() {
        let config = BeltConfig::default();
        let few = batch_rows(8, 2, &config);
        let many = batch_rows(8, 200, &config);
        assert!(many <= few);
    }
}

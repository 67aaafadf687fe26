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

//! The lazy row-mapping view layer (§4.2): a column turns into a view by
//! attaching an index vector over shared physical storage, with no copy.

use std::sync::Arc;

use crate::mapping::{self, MergeCache};

/// An index vector turning a column into a lazy view over its physical
/// storage. `indices[i]` is the physical position backing logical row
/// `i`; negative or out-of-range entries read as MISSING.
#[derive(Debug, Clone)]
pub struct RowMapping {
    pub(crate) indices: Arc<Vec<i32>>,
}

impl RowMapping {
    pub fn new(indices: Vec<i32>) -> Self {
        RowMapping {
            indices: Arc::new(indices),
        }
    }

    pub fn from_arc(indices: Arc<Vec<i32>>) -> Self {
        RowMapping { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.indices
    }

    /// Translates a logical row through this mapping to a physical
    /// position, or `None` if the logical row is out of bounds or the
    /// mapping resolves to MISSING.
    #[inline]
    pub fn translate(&self, logical: usize) -> Option<usize> {
        let physical = *self.indices.get(logical)?;
        if physical >= 0 {
            Some(physical as usize)
        } else {
            None
        }
    }

    /// Composes this mapping (as the existing `row_mapping` M) with a new
    /// `index_vec`, producing `M'[i] = M[index_vec[i]]` per §4.2, without
    /// consulting any cache.
    pub fn compose_uncached(&self, index_vec: &[i32]) -> RowMapping {
        RowMapping::new(mapping::compose(index_vec, &self.indices))
    }

    /// Same composition, but memoized in `cache` keyed by this mapping's
    /// physical identity, so repeated remaps of columns sharing this same
    /// upstream mapping with the same `index_vec` reuse one allocation.
    pub fn compose_cached(&self, index_vec: &[i32], cache: &MergeCache) -> RowMapping {
        let key = MergeCache::key_of(&self.indices) ^ index_vec.as_ptr() as usize;
        let indices = self.indices.clone();
        let composed = cache.get_or_compose(key, move || mapping::compose(index_vec, &indices));
        RowMapping::from_arc(composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_out_of_range_is_none() {
        let m = RowMapping::new(vec![2, -1, 7]);
        assert_eq!(m.translate(0), Some(2));
        assert_eq!(m.translate(1), None);
        assert_eq!(m.translate(2), None);
        assert_eq!(m.translate(99), None);
    }

    #[test]
    fn compose_matches_spec_example() {
        // C = [10,20,30,40,50]; m1 maps logical->physical for C.
        let m1 = RowMapping::new(vec![4, 3, 2, 1, 0]);
        // composing m2 over m1: result[i] = m1[m2[i]]
        let m2 = vec![0, 0, 4];
        let composed = m1.compose_uncached(&m2);
        assert_eq!(composed.as_slice(), &[4, 4, 0]);
    }
}

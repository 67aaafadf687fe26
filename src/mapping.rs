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

//! Index-vector composition and gather helpers shared by the lazy view
//! layer (§4.2) and the materializing buffers.

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Sentinel for "points nowhere" in a composed row mapping.
pub const MISSING_INDEX: i32 = -1;

/// `result[i] = outer[inner[i]]` (or `outer[outer_idx]` indirection as used
/// by `column.map`), propagating out-of-range lookups in either vector as
/// `MISSING_INDEX`. This is also used directly for `M' = compose(index_vec, M)`
/// in §4.2, where `outer` plays the role of the existing `row_mapping` M and
/// `inner` plays the role of the new `index_vec`.
pub fn compose(index_vec: &[i32], outer: &[i32]) -> Vec<i32> {
    index_vec
        .iter()
        .map(|&idx| resolve(outer, idx))
        .collect()
}

/// Looks up `idx` in `mapping`, yielding `MISSING_INDEX` for any
/// out-of-range or negative position.
#[inline]
pub fn resolve(mapping: &[i32], idx: i32) -> i32 {
    if idx < 0 {
        return MISSING_INDEX;
    }
    match mapping.get(idx as usize) {
        Some(&v) => v,
        None => MISSING_INDEX,
    }
}

/// Translates a logical index through an optional row mapping. Returns
/// `None` when the logical index is out of bounds of the mapping itself,
/// or when the mapping resolves to `MISSING_INDEX`.
#[inline]
pub fn translate(row_mapping: Option<&[i32]>, logical: usize, physical_size: usize) -> Option<usize> {
    match row_mapping {
        None => {
            if logical < physical_size {
                Some(logical)
            } else {
                None
            }
        }
        Some(m) => {
            let physical = *m.get(logical)?;
            if physical >= 0 && (physical as usize) < physical_size {
                Some(physical as usize)
            } else {
                None
            }
        }
    }
}

/// Gathers `src[mapping[i]]` into a freshly allocated vector, writing
/// `missing` for indices that resolve out of range. Used by `map` when
/// materializing (gather-copy) rather than composing a view.
pub fn gather<T: Clone>(src: &[T], mapping: &[i32], missing: T) -> Vec<T> {
    mapping
        .iter()
        .map(|&idx| {
            if idx >= 0 {
                src.get(idx as usize).cloned().unwrap_or_else(|| missing.clone())
            } else {
                missing.clone()
            }
        })
        .collect()
}

/// Write-once-per-key cache for composed mappings, keyed by the identity
/// of the physical mapping vector being composed against. Amortises the
/// compose+allocate cost when many columns derived from the same mapped
/// column are re-mapped with the same `index_vec` (e.g. whole-table row
/// reordering). Entries are inserted with `or_insert_with`, so concurrent
/// callers racing on the same key compute at most one winning entry that
/// all of them observe (CAS-insert semantics, via the lock).
#[derive(Default)]
pub struct MergeCache {
    inner: Mutex<HashMap<usize, Arc<Vec<i32>>>>,
}

impl MergeCache {
    pub fn new() -> Self {
        MergeCache::default()
    }

    /// Key identifying a physical mapping by pointer identity.
    pub fn key_of(mapping: &Arc<Vec<i32>>) -> usize {
        Arc::as_ptr(mapping) as usize
    }

    /// Returns the cached composed mapping for `key`, computing it via
    /// `compute` on first access.
    pub fn get_or_compose(&self, key: usize, compute: impl FnOnce() -> Vec<i32>) -> Arc<Vec<i32>> {
        let mut guard = self.inner.lock();
        guard
            .entry(key)
            .or_insert_with(|| Arc::new(compute()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_propagates_missing() {
        let outer = vec![10, 20, 30];
        let inner = vec![0, -1, 7, 1];
        let composed = compose(&inner, &outer);
        assert_eq!(composed, vec![10, -1, -1, 20]);
    }

    #[test]
    fn gather_handles_out_of_range() {
        let src = vec![1.0, 2.0, 3.0];
        let mapping = vec![2, -1, 7, 1];
        let out = gather(&src, &mapping, f64::NAN);
        assert_eq!(out[0], 3.0);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[3], 2.0);
    }

    #[test]
    fn merge_cache_write_once() {
        let cache = MergeCache::new();
        let phys = Arc::new(vec![1, 2, 3]);
        let key = MergeCache::key_of(&phys);
        let mut calls = 0;
        let first = cache.get_or_compose(key, || {
            calls += 1;
            vec![9, 9, 9]
        });
        let second = cache.get_or_compose(key, || {
            calls += 1;
            vec![0, 0, 0]
        });
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }
}

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

//! Predicate `filter` (§4.5): each batch writes its verdicts into a shared
//! bool mask (disjoint slices, same trick as `apply`) and bumps a shared
//! atomic counter of accepted rows. `result` then does one ascending scan
//! over the mask to emit the accepted row indices in original order —
//! the scan is sequential so the output index vector comes out sorted
//! without needing to merge per-batch partial index lists.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::calculator::{Calculator, SyncSlicePtr};
use crate::error::BeltResult;

pub struct FilterCalculator<F> {
    n: usize,
    predicate: F,
    mask: UnsafeCell<Vec<bool>>,
    accepted: AtomicUsize,
}

unsafe impl<F: Sync> Sync for FilterCalculator<F> {}

impl<F> FilterCalculator<F>
where
    F: Fn(usize) -> BeltResult<bool> + Send + Sync,
{
    pub fn new(n: usize, predicate: F) -> Self {
        FilterCalculator {
            n,
            predicate,
            mask: UnsafeCell::new(Vec::new()),
            accepted: AtomicUsize::new(0),
        }
    }
}

impl<F> Calculator for FilterCalculator<F>
where
    F: Fn(usize) -> BeltResult<bool> + Send + Sync,
{
    type Output = Vec<i32>;

    fn init(&self, _num_batches: usize) {
        // SAFETY: single-threaded, runs before any `do_part`.
        unsafe {
            *self.mask.get() = vec![false; self.n];
        }
        self.accepted.store(0, Ordering::Relaxed);
    }

    fn num_operations(&self) -> usize {
        self.n
    }

    fn do_part(&self, from: usize, to: usize, _batch_index: usize) -> BeltResult<()> {
        // SAFETY: disjoint [from, to) ranges across concurrent calls.
        let slice = unsafe {
            let mask = &mut *self.mask.get();
            SyncSlicePtr::new(mask).slice_mut(from, to)
        };
        let mut local_accepted = 0usize;
        for (offset, cell) in slice.iter_mut().enumerate() {
            let keep = (self.predicate)(from + offset)?;
            *cell = keep;
            local_accepted += keep as usize;
        }
        self.accepted.fetch_add(local_accepted, Ordering::Relaxed);
        Ok(())
    }

    fn result(&self) -> Vec<i32> {
        // SAFETY: called after every `do_part` has returned, no writers left.
        let mask = unsafe { &*self.mask.get() };
        let expected = self.accepted.load(Ordering::Relaxed);
        let mut out = Vec::with_capacity(expected);
        for (i, &keep) in mask.iter().enumerate() {
            if keep {
                out.push(i as i32);
            }
        }
        debug_assert_eq!(out.len(), expected);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeltConfig;
    use crate::executor::{run_calculator, ExecutionContext, Workload};

    #[test]
    fn filter_keeps_even_indices_in_order() {
        let calc = FilterCalculator::new(10, |i| Ok(i % 2 == 0));
        let ctx = ExecutionContext::global();
        let mut config = BeltConfig::default();
        config.min_batch = 2;
        let out = run_calculator(&calc, &ctx, Workload::Huge, &config).unwrap();
        assert_eq!(out, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn filter_with_no_matches_is_empty() {
        let calc = FilterCalculator::new(5, |_| Ok(false));
        let ctx = ExecutionContext::global();
        let config = BeltConfig::default();
        let out = run_calculator(&calc, &ctx, Workload::TrivialPerCell, &config).unwrap();
        assert!(out.is_empty());
    }
}

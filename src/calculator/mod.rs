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

//! Calculators (§4.5): the work a batch executes, expressed as a trait so
//! `apply`/`reduce`/`filter` all ride the same planner.

pub mod apply;
pub mod filter;
pub mod reduce;

use crate::error::BeltResult;

/// One unit of batched work. Implementations must be safe to call
/// `do_part` on from multiple threads concurrently with disjoint
/// `[from, to)` ranges; `init` and `result` are each called exactly once,
/// before and after all `do_part` calls respectively.
pub trait Calculator: Send + Sync {
    type Output;

    /// Called once before any `do_part`, with the batch count the planner
    /// decided on (1 for the sequential path).
    fn init(&self, num_batches: usize);

    /// Total number of scalar operations (rows, typically) to perform.
    fn num_operations(&self) -> usize;

    /// Performs the work for `[from, to)`, the `batch_index`-th batch.
    fn do_part(&self, from: usize, to: usize, batch_index: usize) -> BeltResult<()>;

    /// Called once after every `do_part` has returned `Ok`.
    fn result(&self) -> Self::Output;
}

/// A raw-pointer window over a `Vec<T>`'s backing storage, handed to
/// concurrent `do_part` calls so each can write its own disjoint slice
/// without a `Mutex`. Safety rests entirely on callers partitioning
/// `[from, to)` ranges so that no two concurrent `slice_mut` calls ever
/// overlap; the planner's batch ranges guarantee this.
pub(crate) struct SyncSlicePtr<T> {
    ptr: *mut T,
    len: usize,
}

unsafe impl<T: Send> Send for SyncSlicePtr<T> {}
unsafe impl<T: Send> Sync for SyncSlicePtr<T> {}

impl<T> SyncSlicePtr<T> {
    pub(crate) fn new(values: &mut [T]) -> Self {
        SyncSlicePtr {
            ptr: values.as_mut_ptr(),
            len: values.len(),
        }
    }

    /// # Safety
    /// The caller must ensure `from..to` is within bounds and that no
    /// other live `slice_mut` call from any thread overlaps this range.
    pub(crate) unsafe fn slice_mut(&self, from: usize, to: usize) -> &mut [T] {
        debug_assert!(to <= self.len && from <= to);
        std::slice::from_raw_parts_mut(self.ptr.add(from), to - from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_slice_ptr_disjoint_writes_are_visible() {
        let mut data = vec![0i32; 10];
        let ptr = SyncSlicePtr::new(&mut data);
        unsafe {
            ptr.slice_mut(0, 5).fill(1);
            ptr.slice_mut(5, 10).fill(2);
        }
        assert_eq!(data, vec![1, 1, 1, 1, 1, 2, 2, 2, 2, 2]);
    }
}
